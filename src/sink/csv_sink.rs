use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::app::{HarvestError, Result};
use crate::domain::Record;
use crate::sink::RecordSink;

/// Headerless CSV file, reopened in append mode for every row.
///
/// Rows are serialized in memory first and written with a single
/// `write_all` while holding the sink's lock, so two appends from this
/// process never interleave. No handle outlives an `append` call.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvSink {
    /// The file itself is not created until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    fn encode(record: &Record) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(record.as_row())?;
        writer
            .into_inner()
            .map_err(|e| HarvestError::Io(e.into_error()))
    }
}

impl RecordSink for CsvSink {
    fn append(&self, record: &Record) -> Result<()> {
        let row = Self::encode(record)?;

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&row)?;
        file.flush()?;

        debug!("Appended {} to {}", record.url(), self.path.display());
        Ok(())
    }
}
