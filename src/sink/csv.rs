//! CSV file sink (RFC 4180, via the csv crate)

use super::RowSink;
use crate::error::{ExportError, Result};
use crate::export::flatten::{Column, Row};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes rows to `<target>.partial` and moves it over `target` on `finish`.
///
/// An interrupted export never truncates the previous CSV.
pub struct CsvSink {
    writer: csv::Writer<File>,
    partial: PathBuf,
    target: PathBuf,
    initialized: bool,
}

impl CsvSink {
    /// Creates the partial file, and the output directory if needed
    pub fn create(target: &Path) -> Result<Self> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let partial = partial_path(target);
        let writer = csv::Writer::from_path(&partial)?;
        Ok(Self {
            writer,
            partial,
            target: target.to_path_buf(),
            initialized: false,
        })
    }

    /// Flushes and atomically replaces the target file
    pub fn finish(self) -> Result<PathBuf> {
        let CsvSink {
            mut writer,
            partial,
            target,
            initialized,
        } = self;
        if !initialized {
            return Err(ExportError::SinkError(format!(
                "{} finished without a header",
                target.display()
            )));
        }
        writer.flush()?;
        drop(writer);
        std::fs::rename(&partial, &target)?;
        info!("CSV report saved to {}", target.display());
        Ok(target)
    }

    pub fn partial_path(&self) -> &Path {
        &self.partial
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

impl RowSink for CsvSink {
    fn initialize(&mut self, columns: &[Column]) -> Result<()> {
        if self.initialized {
            return Err(ExportError::SinkError("header already written".to_string()));
        }
        self.writer.write_record(columns.iter().map(|c| c.title))?;
        self.writer.flush()?;
        self.initialized = true;
        Ok(())
    }

    fn append_rows(&mut self, rows: &[Row]) -> Result<()> {
        if !self.initialized {
            return Err(ExportError::SinkError(
                "rows appended before header".to_string(),
            ));
        }
        for row in rows {
            self.writer.write_record(row.values())?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::flatten::{flatten, FieldKind};
    use serde_json::json;

    const COLUMNS: [Column; 3] = [
        Column::new("key", "Key", FieldKind::Text),
        Column::new("message", "Message", FieldKind::Text),
        Column::new("textRange", "Text Range", FieldKind::Json),
    ];

    fn row(value: serde_json::Value) -> Row {
        flatten(&value.as_object().cloned().unwrap_or_default(), &COLUMNS)
    }

    #[test]
    fn test_writes_header_and_rows_then_renames() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("sonarqube_issues.csv");

        let mut sink = CsvSink::create(&target).unwrap();
        let partial = sink.partial_path().to_path_buf();
        sink.initialize(&COLUMNS).unwrap();
        sink.append_rows(&[row(json!({"key": "a", "message": "one, two\nthree"}))])
            .unwrap();
        sink.append_rows(&[row(json!({"key": "b", "textRange": {"startLine": 1}}))])
            .unwrap();
        assert!(partial.exists());
        assert!(!target.exists());

        let written = sink.finish().unwrap();
        assert_eq!(written, target);
        assert!(!partial.exists());

        let content = std::fs::read_to_string(&target).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Key,Message,Text Range");
        assert_eq!(lines[1], r#"a,"one, two\nthree","#);
        assert_eq!(lines[2], r#"b,,"{""startLine"":1}""#);
    }

    #[test]
    fn test_unfinished_export_leaves_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("sonarqube_rules.csv");
        std::fs::write(&target, "previous\n").unwrap();

        let mut sink = CsvSink::create(&target).unwrap();
        sink.initialize(&COLUMNS).unwrap();
        sink.append_rows(&[row(json!({"key": "new"}))]).unwrap();
        drop(sink);

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous\n");
    }

    #[test]
    fn test_rows_before_header_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::create(&dir.path().join("x.csv")).unwrap();
        let err = sink.append_rows(&[row(json!({}))]).unwrap_err();
        assert!(matches!(err, ExportError::SinkError(_)));
    }
}
