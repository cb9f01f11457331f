use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;

use crate::binarizer::{Binarizer, DEFAULT_CHUNK_SIZE};
use crate::error::{BinarizeError, Result};
use crate::loaders::{load_frames, DEFAULT_ENTRY};
use crate::output::OutputFile;
use crate::report::RunReport;

/// Settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub entry: String,
    pub chunk_size: usize,
}

impl Config {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            entry: DEFAULT_ENTRY.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BinarizeError::InvalidConfig("chunk size must be greater than zero".to_string()));
        }
        if self.entry.is_empty() {
            return Err(BinarizeError::InvalidConfig("entry name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load the frames, then binarize them into the output file
///
/// Input is loaded before the output is touched, so a load failure never
/// creates or truncates the destination.
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;

    let started_at = Utc::now();
    let start = Instant::now();

    let frames = load_frames(&config.input_path, &config.entry)?;

    let mut output = OutputFile::create(&config.output_path)?;
    let binarizer = Binarizer::new().with_chunk_size(config.chunk_size);
    let stats = frames
        .binarize_into(&binarizer, &mut output)
        .map_err(|e| output.error(e))?;
    let bytes_written = output.finish()?;

    let shape = frames.shape();
    let report = RunReport {
        input: config.input_path.clone(),
        output: config.output_path.clone(),
        entry: config.entry.clone(),
        dtype: frames.dtype(),
        frames: stats.frames,
        rows: shape.rows,
        cols: shape.cols,
        pixels: stats.pixels,
        lit: stats.lit,
        bytes_written,
        started_at,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };

    log::info!(
        "Wrote {} bytes for {} frames to {:?}",
        report.bytes_written,
        report.frames,
        report.output
    );
    Ok(report)
}
