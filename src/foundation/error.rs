use std::path::PathBuf;

use crate::foundation::core::Dimensions;

/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Problems with the frames handed to an encode.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("no input files found")]
    NoFiles,

    #[error("need at least 2 images to create a video, got {found}")]
    TooFewFrames { found: usize },

    #[error("unreadable image at index {index} ('{}'): {reason}", path.display())]
    UnreadableImage {
        index: usize,
        path: PathBuf,
        reason: String,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("dimension mismatch at index {index}: expected {expected}, got {actual}")]
    DimensionMismatch {
        index: usize,
        expected: Dimensions,
        actual: Dimensions,
    },

    #[error("codec unsupported: {0}")]
    CodecUnsupported(String),

    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("an encoding job is already running")]
    Busy,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn codec_unsupported(msg: impl Into<String>) -> Self {
        Self::CodecUnsupported(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unreadable(index: usize, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Input(InputError::UnreadableImage {
            index,
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Frame index this error points at, when there is one.
    pub fn frame_index(&self) -> Option<usize> {
        match self {
            Self::Input(InputError::UnreadableImage { index, .. }) => Some(*index),
            Self::DimensionMismatch { index, .. } => Some(*index),
            _ => None,
        }
    }
}
