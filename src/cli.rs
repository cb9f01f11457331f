// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::binarizer::DEFAULT_CHUNK_SIZE;
use crate::loaders::DEFAULT_ENTRY;
use crate::run::Config;

#[derive(Parser, Debug, Clone)]
#[command(name = "frame-binarizer")]
#[command(about = "Convert a stack of video frames into a flat text file of 0/1 pixels", long_about = None)]
pub struct Cli {
    /// Source archive (.npz or .npy)
    #[arg(short, long, default_value = "bad_apple_480p.npz")]
    pub input: PathBuf,

    /// Destination text file, overwritten if present
    #[arg(short, long, default_value = "bad_apple.txt")]
    pub output: PathBuf,

    /// Array name inside the .npz archive
    #[arg(short, long, default_value = DEFAULT_ENTRY)]
    pub entry: String,

    /// Bytes buffered before each write
    #[arg(long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Disable the summary printed on success
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            entry: self.entry.clone(),
            chunk_size: self.chunk_size,
        }
    }
}
