//! Append-only record output.
//!
//! The import file is tab-separated with a fixed header. Records only carry
//! the fields they set; everything else is written empty.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{EmitError, EmitResult};
use crate::models::Record;

/// Destination of emitted records, in emission order.
pub trait RecordSink {
    fn write(&mut self, record: &Record) -> EmitResult<()>;

    fn flush(&mut self) -> EmitResult<()> {
        Ok(())
    }
}

/// Collects records in memory.
impl RecordSink for Vec<Record> {
    fn write(&mut self, record: &Record) -> EmitResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Tab-separated writer with a fixed column list.
pub struct TsvSink<W: Write> {
    writer: csv::Writer<W>,
    fields: Vec<String>,
}

impl<W: Write> TsvSink<W> {
    /// Wrap a writer and write the header line.
    pub fn new(inner: W, fields: Vec<String>) -> EmitResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);
        writer.write_record(&fields)?;
        Ok(Self { writer, fields })
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> EmitResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| EmitError::Flush(e.into_error()))
    }
}

impl TsvSink<NamedTempFile> {
    /// Stage an import file next to `target`.
    ///
    /// `target` is untouched until [`TsvSink::commit`]. A staged file dropped
    /// without commit is deleted.
    pub fn staged(target: &Path, fields: Vec<String>) -> EmitResult<Self> {
        let dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let file = NamedTempFile::new_in(dir).map_err(|source| EmitError::Output {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::new(file, fields)
    }

    /// Flush and move the staged file over `target`.
    pub fn commit(self, target: &Path) -> EmitResult<()> {
        self.into_inner()?
            .persist(target)
            .map_err(|e| EmitError::Output {
                path: target.to_path_buf(),
                source: e.error,
            })?;
        Ok(())
    }
}

impl<W: Write> RecordSink for TsvSink<W> {
    fn write(&mut self, record: &Record) -> EmitResult<()> {
        let line: Vec<&str> = self.fields.iter().map(|f| record.value(f)).collect();
        self.writer.write_record(&line)?;
        Ok(())
    }

    fn flush(&mut self) -> EmitResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
