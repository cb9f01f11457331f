use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BinarizeError, Result};
use crate::loaders::DType;

/// Summary of one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub entry: String,
    pub dtype: DType,
    pub frames: usize,
    pub rows: usize,
    pub cols: usize,
    pub pixels: usize,
    pub lit: usize,
    pub bytes_written: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Fraction of pixels that were above zero
    pub fn lit_ratio(&self) -> f64 {
        if self.pixels == 0 {
            0.0
        } else {
            self.lit as f64 / self.pixels as f64
        }
    }

    /// Pixels per second, 0 when the run was too short to time
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.pixels as f64 / secs
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Frame Binarizer ===");
        println!("Input:   {:?} [{}]", self.input, self.entry);
        println!("Output:  {:?}", self.output);
        println!("Frames:  {} of {}x{} ({})", self.frames, self.rows, self.cols, self.dtype);
        println!("Bytes:   {}", self.bytes_written);
        println!("Lit:     {} ({:.2}%)", self.lit, self.lit_ratio() * 100.0);
        println!("Elapsed: {:?} ({:.2} Mpx/s)", self.elapsed(), self.throughput() / 1_000_000.0);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self
            .to_json()
            .map_err(|e| BinarizeError::resource(path, e.into()))?;
        std::fs::write(path, json).map_err(|e| BinarizeError::resource(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunReport {
        RunReport {
            input: PathBuf::from("bad_apple_480p.npz"),
            output: PathBuf::from("bad_apple.txt"),
            entry: "frames".to_string(),
            dtype: DType::U8,
            frames: 2,
            rows: 2,
            cols: 2,
            pixels: 8,
            lit: 2,
            bytes_written: 8,
            started_at: Utc::now(),
            elapsed_ms: 0,
        }
    }

    #[test]
    fn lit_ratio() {
        assert_eq!(sample().lit_ratio(), 0.25);
    }

    #[test]
    fn throughput_of_untimed_run_is_zero() {
        assert_eq!(sample().throughput(), 0.0);

        let timed = RunReport {
            elapsed_ms: 2000,
            ..sample()
        };
        assert_eq!(timed.throughput(), 4.0);
    }

    #[test]
    fn json_contains_counts() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();

        assert_eq!(json["frames"], 2);
        assert_eq!(json["bytes_written"], 8);
        assert_eq!(json["dtype"], "u8");
    }
}
