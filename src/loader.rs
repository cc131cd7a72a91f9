//! CSV loading
//!
//! Reads a header row followed by every data row into memory. Rows are not
//! required to have the same number of fields as the header.

use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// A single data row and the line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: u64,
    pub fields: Vec<String>,
}

impl CsvRow {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

/// Contents of a CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvData {
    pub header: Vec<String>,
    pub rows: Vec<CsvRow>,
}

/// Load a CSV file with a mandatory header row.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<CsvData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let csv_error = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let header: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_owned)
        .collect();
    if header.is_empty() {
        return Err(Error::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push(CsvRow {
            line,
            fields: record.iter().map(str::to_owned).collect(),
        });
    }

    debug!(
        "Loaded {} row(s) with {} header column(s) from {}",
        rows.len(),
        header.len(),
        path.display()
    );

    Ok(CsvData { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("input.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "database,user,password\norders,app,s3cret\nbilling,report,\"p,w\"\n",
        );

        let data = load_csv(&path).unwrap();
        assert_eq!(data.header, vec!["database", "user", "password"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0].fields, vec!["orders", "app", "s3cret"]);
        assert_eq!(data.rows[0].line, 2);
        assert_eq!(data.rows[1].get(2), Some("p,w"));
        assert_eq!(data.rows[1].line, 3);
    }

    #[test]
    fn test_ragged_rows_are_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "a,b,c\n1,2\n1,2,3,4,5\n");

        let data = load_csv(&path).unwrap();
        assert_eq!(data.rows[0].fields.len(), 2);
        assert_eq!(data.rows[1].fields.len(), 5);
        assert_eq!(data.rows[0].get(2), None);
    }

    #[test]
    fn test_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "database,user,password\n");

        let data = load_csv(&path).unwrap();
        assert_eq!(data.header.len(), 3);
        assert!(data.rows.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv("/nonexistent/secrets.csv").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "");

        let err = load_csv(&path).unwrap_err();
        assert!(matches!(err, Error::MissingHeader { .. }));
    }

    #[test]
    fn test_invalid_utf8_row_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(&path, b"a,b,c\nx,y,\xff\xfe\n").unwrap();

        let err = load_csv(&path).unwrap_err();
        assert!(matches!(err, Error::Csv { .. }));
    }
}
