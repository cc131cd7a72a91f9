//! Row-by-row synchronisation of CSV secrets into a backend.

use std::fmt;
use std::io::Write;
use tracing::{error, info};

use crate::backends::SecretBackend;
use crate::error::{error_chain, Error, Result};
use crate::loader::CsvRow;

/// Placeholder printed instead of the secret value.
pub const PASSWORD_MASK: &str = "********";

/// Hierarchical key `<mount>/<branch>/<id>/<sub_id>` a row is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPath {
    mount: String,
    branch: String,
    id: String,
    sub_id: String,
}

impl SecretPath {
    pub fn new(
        mount: impl Into<String>,
        branch: impl Into<String>,
        id: impl Into<String>,
        sub_id: impl Into<String>,
    ) -> Self {
        Self {
            mount: mount.into(),
            branch: branch.into(),
            id: id.into(),
            sub_id: sub_id.into(),
        }
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.mount.trim_matches('/'),
            self.branch,
            self.id,
            self.sub_id
        )
    }
}

/// Console line announcing a write. Never contains the secret.
pub fn sync_line(path: &SecretPath) -> String {
    format!("Syncing: /{} password={}", path, PASSWORD_MASK)
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mount: String,
    pub branch: String,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct SyncFailure {
    pub line: u64,
    pub path: Option<String>,
    pub error: Error,
}

/// Outcome of a sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub total: usize,
    pub written: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write every row to `backend` in input order.
///
/// Each row needs at least three fields: id, sub-id and password. A failing
/// row is recorded in the report and the remaining rows are still written.
/// Only errors writing to `out` abort the run.
pub async fn sync_rows<W: Write>(
    backend: &dyn SecretBackend,
    rows: &[CsvRow],
    options: &SyncOptions,
    out: &mut W,
) -> Result<SyncReport> {
    info!(
        "Syncing {} row(s) into {} under {}/{}",
        rows.len(),
        backend.backend_type(),
        options.mount,
        options.branch
    );

    let mut report = SyncReport {
        total: rows.len(),
        ..SyncReport::default()
    };

    for row in rows {
        let (id, sub_id, password) = match (row.get(0), row.get(1), row.get(2)) {
            (Some(id), Some(sub_id), Some(password)) => (id, sub_id, password),
            _ => {
                let err = Error::MalformedRow {
                    line: row.line,
                    fields: row.fields.len(),
                };
                error!("✗ Skipping line {}: {}", row.line, err);
                report.failures.push(SyncFailure {
                    line: row.line,
                    path: None,
                    error: err,
                });
                continue;
            }
        };

        let path = SecretPath::new(&options.mount, &options.branch, id, sub_id);
        writeln!(out, "{}", sync_line(&path)).map_err(Error::Output)?;

        if options.dry_run {
            continue;
        }

        match backend.write_password(&path, password).await {
            Ok(()) => report.written += 1,
            Err(e) => {
                error!("✗ Failed to sync {}: {}", path, error_chain(&e));
                report.failures.push(SyncFailure {
                    line: row.line,
                    path: Some(path.to_string()),
                    error: e,
                });
            }
        }
    }

    Ok(report)
}
