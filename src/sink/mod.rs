pub mod csv_sink;

use crate::app::Result;
use crate::domain::Record;

pub use csv_sink::CsvSink;

/// Durable, append-only destination for harvested records.
///
/// Implementations must accept calls from many workers at once and keep
/// every row whole.
pub trait RecordSink: Send + Sync {
    fn append(&self, record: &Record) -> Result<()>;
}
