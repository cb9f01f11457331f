use std::io;
use std::path::PathBuf;

use crate::frame::FrameShape;

/// Errors produced while loading frames or writing the bit text
#[derive(Debug, thiserror::Error)]
pub enum BinarizeError {
    /// Source archive missing, unreadable or lacking the frame entry
    #[error("cannot load frames from {path:?}: {reason}")]
    InputUnavailable { path: PathBuf, reason: String },

    /// Destination could not be created, written or finalized
    #[error("cannot write output {path:?}: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A frame (or a row inside one) disagrees with the first frame's shape
    #[error("frame {frame} has shape {found}, expected {expected}")]
    ShapeMismatch {
        frame: usize,
        expected: FrameShape,
        found: FrameShape,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BinarizeError {
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InputUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn resource(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ResourceUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Which stage of the run failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InputUnavailable { .. } | Self::ShapeMismatch { .. } => "load",
            Self::ResourceUnavailable { .. } => "write",
            Self::InvalidConfig(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, BinarizeError>;
