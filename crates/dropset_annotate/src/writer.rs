//! Streaming annotation output.
//!
//! Each record is encoded into memory first and committed with a single
//! `write_all` + `flush`, so the stream never holds half a record.  The
//! closing bracket of the legacy format is written by [`AnnotationWriter::finish`]
//! or, if the run bails out early, when the writer is dropped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};

use crate::error::AnnotateError;
use crate::format::RecordFormat;
use crate::record::FrameRecord;

pub struct AnnotationWriter<W: Write> {
    out: Option<W>,
    format: RecordFormat,
    written: usize,
}

impl AnnotationWriter<BufWriter<File>> {
    /// Create (truncate) the annotation file at `path`.
    pub fn create(path: &Path, format: RecordFormat) -> Result<Self, AnnotateError> {
        let file = File::create(path)?;
        debug!("writing {:?} annotations to {}", format, path.display());
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> AnnotationWriter<W> {
    pub fn new(out: W, format: RecordFormat) -> Self {
        Self {
            out: Some(out),
            format,
            written: 0,
        }
    }

    /// Number of records committed so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Commit one complete record.
    pub fn append(&mut self, record: &FrameRecord) -> Result<(), AnnotateError> {
        let out = self.out.as_mut().ok_or(AnnotateError::Finished)?;
        let mut buf = String::new();
        if self.written > 0 {
            buf.push_str(self.format.separator());
        }
        buf.push_str(&self.format.encode(record)?);
        out.write_all(buf.as_bytes())?;
        out.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Close the stream and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, AnnotateError> {
        let mut out = self.out.take().ok_or(AnnotateError::Finished)?;
        Self::terminate(&mut out, self.format, self.written)?;
        Ok(out)
    }

    fn terminate(out: &mut W, format: RecordFormat, written: usize) -> std::io::Result<()> {
        if written > 0 {
            out.write_all(format.terminator().as_bytes())?;
        }
        out.flush()
    }
}

impl<W: Write> Drop for AnnotationWriter<W> {
    fn drop(&mut self) {
        if let Some(mut out) = self.out.take() {
            if let Err(e) = Self::terminate(&mut out, self.format, self.written) {
                warn!("could not close annotation stream: {}", e);
            }
        }
    }
}
