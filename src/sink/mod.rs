//! Row sinks: where flattened rows end up

pub mod csv;

use crate::error::{ExportError, Result};
use crate::export::flatten::{Column, Row};

pub use self::csv::CsvSink;

/// Append-only tabular output
pub trait RowSink: Send {
    /// Declares the header. Must be called once, before any rows.
    fn initialize(&mut self, columns: &[Column]) -> Result<()>;

    /// Appends rows in order and makes them durable before returning
    fn append_rows(&mut self, rows: &[Row]) -> Result<()>;
}

/// Keeps rows in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
    /// Number of `append_rows` calls, one per written batch
    pub batches: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSink for MemorySink {
    fn initialize(&mut self, columns: &[Column]) -> Result<()> {
        self.header = columns.iter().map(|c| c.title.to_string()).collect();
        Ok(())
    }

    fn append_rows(&mut self, rows: &[Row]) -> Result<()> {
        if self.header.is_empty() {
            return Err(ExportError::SinkError(
                "rows appended before header".to_string(),
            ));
        }
        self.rows.extend_from_slice(rows);
        self.batches += 1;
        Ok(())
    }
}
