pub mod npy;
pub mod npz;

use std::io::Write;
use std::path::Path;

use crate::binarizer::{BinarizeStats, Binarizer};
use crate::error::{BinarizeError, Result};
use crate::frame::{FrameShape, FrameStack, F16};

pub use npy::{decode_npy, DType};
pub use npz::{load_npz_entry, ZIP_MAGIC};

/// Default array name inside an `.npz` archive
pub const DEFAULT_ENTRY: &str = "frames";

/// Frame stack tagged with the element type it was stored as
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedFrames {
    Bool(FrameStack<bool>),
    U8(FrameStack<u8>),
    U16(FrameStack<u16>),
    U32(FrameStack<u32>),
    U64(FrameStack<u64>),
    I8(FrameStack<i8>),
    I16(FrameStack<i16>),
    I32(FrameStack<i32>),
    I64(FrameStack<i64>),
    F16(FrameStack<F16>),
    F32(FrameStack<f32>),
    F64(FrameStack<f64>),
}

macro_rules! with_stack {
    ($frames:expr, $stack:ident => $body:expr) => {
        match $frames {
            LoadedFrames::Bool($stack) => $body,
            LoadedFrames::U8($stack) => $body,
            LoadedFrames::U16($stack) => $body,
            LoadedFrames::U32($stack) => $body,
            LoadedFrames::U64($stack) => $body,
            LoadedFrames::I8($stack) => $body,
            LoadedFrames::I16($stack) => $body,
            LoadedFrames::I32($stack) => $body,
            LoadedFrames::I64($stack) => $body,
            LoadedFrames::F16($stack) => $body,
            LoadedFrames::F32($stack) => $body,
            LoadedFrames::F64($stack) => $body,
        }
    };
}

impl LoadedFrames {
    pub fn dtype(&self) -> DType {
        match self {
            LoadedFrames::Bool(_) => DType::Bool,
            LoadedFrames::U8(_) => DType::U8,
            LoadedFrames::U16(_) => DType::U16,
            LoadedFrames::U32(_) => DType::U32,
            LoadedFrames::U64(_) => DType::U64,
            LoadedFrames::I8(_) => DType::I8,
            LoadedFrames::I16(_) => DType::I16,
            LoadedFrames::I32(_) => DType::I32,
            LoadedFrames::I64(_) => DType::I64,
            LoadedFrames::F16(_) => DType::F16,
            LoadedFrames::F32(_) => DType::F32,
            LoadedFrames::F64(_) => DType::F64,
        }
    }

    pub fn frame_count(&self) -> usize {
        with_stack!(self, s => s.frame_count())
    }

    pub fn shape(&self) -> FrameShape {
        with_stack!(self, s => s.shape())
    }

    /// Binarize whatever element type was loaded
    pub fn binarize_into<W: Write>(&self, binarizer: &Binarizer, out: &mut W) -> std::io::Result<BinarizeStats> {
        with_stack!(self, s => binarizer.write_stack(s, out))
    }
}

/// Load the frame collection at `path`
///
/// Zip archives are read as `.npz` and the array `entry` is decoded; bare
/// `.npy` files are decoded directly and `entry` is ignored.
pub fn load_frames(path: impl AsRef<Path>, entry: &str) -> Result<LoadedFrames> {
    let path = path.as_ref();
    log::info!("Loading frames from {:?}", path);

    let bytes = std::fs::read(path).map_err(|e| BinarizeError::input(path, e.to_string()))?;

    let frames = if bytes.starts_with(ZIP_MAGIC) {
        load_npz_entry(&bytes, entry)
    } else if bytes.starts_with(npy::NPY_MAGIC) {
        decode_npy(&bytes)
    } else {
        Err("not an npz archive or npy array".to_string())
    }
    .map_err(|reason| BinarizeError::input(path, reason))?;

    log::info!(
        "Loaded {} frames of {} ({})",
        frames.frame_count(),
        frames.shape(),
        frames.dtype()
    );
    Ok(frames)
}
