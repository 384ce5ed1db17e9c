// CSV encoding for table exports

use crate::models::{COLUMNS, Employee};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// When to wrap a field in double quotes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// Quote every field
    #[default]
    Always,
    /// Quote only fields containing a delimiter, a quote or a line break
    Necessary,
}

impl From<QuoteStyle> for csv::QuoteStyle {
    fn from(style: QuoteStyle) -> Self {
        match style {
            QuoteStyle::Always => csv::QuoteStyle::Always,
            QuoteStyle::Necessary => csv::QuoteStyle::Necessary,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read export: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unexpected header: {found:?}")]
    Header { found: Vec<String> },
}

/// CSV writer for employee rows, `\n` terminated
pub fn writer<W: io::Write>(inner: W, style: QuoteStyle) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(style.into())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

/// Read an employee export back into records
///
/// The first record must be the `id,name,email` header.
pub fn read_export(path: &Path) -> Result<Vec<Employee>, ReadError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers = reader.headers()?;
    if headers.iter().ne(COLUMNS) {
        return Err(ReadError::Header {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let employees = reader.deserialize().collect::<Result<Vec<Employee>, _>>()?;

    debug!(path = ?path, count = employees.len(), "Read employee export");
    Ok(employees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn records_to_string(records: &[[&str; 3]], style: QuoteStyle) -> String {
        let mut w = writer(Vec::new(), style);
        for record in records {
            w.write_record(record).unwrap();
        }
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_writer_always_quotes() {
        assert_eq!(
            records_to_string(&[["1", "Alice", "a@x.com"]], QuoteStyle::Always),
            "\"1\",\"Alice\",\"a@x.com\"\n"
        );
        assert_eq!(
            records_to_string(&[["2", "say \"hi\"", ""]], QuoteStyle::Always),
            "\"2\",\"say \"\"hi\"\"\",\"\"\n"
        );
    }

    #[test]
    fn test_writer_necessary_quotes() {
        assert_eq!(
            records_to_string(&[["2", "Smith, Jane", "j@x.com"]], QuoteStyle::Necessary),
            "2,\"Smith, Jane\",j@x.com\n"
        );
        assert_eq!(
            records_to_string(&[["3", "line\nbreak", "a\"b"]], QuoteStyle::Necessary),
            "3,\"line\nbreak\",\"a\"\"b\"\n"
        );
    }

    #[test]
    fn test_read_export() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.csv");
        fs::write(
            &path,
            "\"id\",\"name\",\"email\"\n\"1\",\"Doe, John\",\"j@x.com\"\n\"2\",\"Ann \"\"A\"\"\",\"a@x.com\"\n",
        )
        .unwrap();

        let employees = read_export(&path).unwrap();
        assert_eq!(
            employees,
            vec![
                Employee::new(1, "Doe, John", "j@x.com"),
                Employee::new(2, "Ann \"A\"", "a@x.com"),
            ]
        );
    }

    #[test]
    fn test_read_export_rejects_bad_input() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.csv");

        fs::write(&path, "_id,name,email\n").unwrap();
        assert!(matches!(read_export(&path), Err(ReadError::Header { .. })));

        fs::write(&path, "id,name,email\n1,Alice\n").unwrap();
        assert!(matches!(read_export(&path), Err(ReadError::Csv(_))));

        fs::write(&path, "id,name,email\nx,Alice,a@x.com\n").unwrap();
        assert!(matches!(read_export(&path), Err(ReadError::Csv(_))));

        let missing = temp.path().join("missing.csv");
        assert!(matches!(read_export(&missing), Err(ReadError::Csv(_))));
    }
}
