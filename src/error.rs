//! Error types shared by the loader, the Vault client and the sync loop.

use std::path::PathBuf;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Render `err` followed by each of its sources, joined with `: `.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to open CSV file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV file {} has no header row", path.display())]
    MissingHeader { path: PathBuf },

    #[error("failed to load CA certificate from {}: {reason}", path.display())]
    CaCert { path: PathBuf, reason: String },

    #[error("failed to resolve Vault host {host}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("network error communicating with Vault")]
    Network(#[from] reqwest::Error),

    #[error("Vault rejected the token for {path} (status {status})")]
    Unauthorized { path: String, status: u16 },

    #[error("Vault write to {path} failed with status {status}: {message}")]
    Store {
        path: String,
        status: u16,
        message: String,
    },

    #[error("failed to write sync progress")]
    Output(#[source] std::io::Error),

    #[error("row on line {line} has {fields} field(s), expected at least 3")]
    MalformedRow { line: u64, fields: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_includes_sources() {
        let err = Error::Io {
            path: PathBuf::from("rows.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            error_chain(&err),
            "failed to open CSV file rows.csv: no such file"
        );
    }

    #[test]
    fn test_error_chain_without_source() {
        let err = Error::Config("Vault address is not set".to_string());
        assert_eq!(
            error_chain(&err),
            "configuration error: Vault address is not set"
        );
    }
}
