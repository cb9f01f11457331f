pub mod binarizer;
pub mod cli;
pub mod error;
pub mod frame;
pub mod loaders;
pub mod output;
pub mod report;
pub mod run;

pub use binarizer::{binarize_to_string, BinarizeStats, Binarizer};
pub use error::{BinarizeError, Result};
pub use frame::{Frame, FrameShape, FrameStack, Pixel, F16};
pub use loaders::{load_frames, DType, LoadedFrames};
pub use output::OutputFile;
pub use report::RunReport;
pub use run::{run, Config};
