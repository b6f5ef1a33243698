//! Appender trait for log output destinations

use super::{error::Result, structured_entry::StructuredLog};

/// A sink receiving every dispatched record
///
/// `json` is the record's canonical encoding, produced once per event and
/// shared by all sinks.
pub trait Appender: Send + Sync {
    fn append(&self, record: &StructuredLog, json: &str) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
