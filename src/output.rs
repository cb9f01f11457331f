use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{BinarizeError, Result};

/// Exclusively owned destination for the bit text
///
/// Created (or truncated) on open and finalized once with [`OutputFile::finish`].
/// If a run aborts first, dropping the handle flushes whatever was buffered and
/// closes the file, leaving a truncated prefix behind.
pub struct OutputFile {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl OutputFile {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| BinarizeError::resource(&path, e))?;
        log::debug!("Opened output {:?}", path);

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Flush, sync to disk and close; returns total bytes written
    pub fn finish(mut self) -> Result<u64> {
        self.writer
            .flush()
            .map_err(|e| BinarizeError::resource(&self.path, e))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| BinarizeError::resource(&self.path, e))?;

        log::debug!("Finalized output {:?} ({} bytes)", self.path, self.written);
        Ok(self.written)
    }

    /// Wrap an io error from this file as a write-stage failure
    pub fn error(&self, source: io::Error) -> BinarizeError {
        BinarizeError::resource(&self.path, source)
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        // No-op after finish; on an abort this keeps the prefix written so far
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush {:?} while closing: {}", self.path, e);
        }
    }
}
