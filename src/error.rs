//! Error types for oggplay
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the oggplay library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a recognizable container or carries no Vorbis track
    #[error("Unsupported stream: {0}")]
    UnsupportedStream(String),

    /// Header parsing errors (missing or unusable codec parameters)
    #[error("Header error: {0}")]
    Header(String),

    /// Audio output device or stream errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),
}

/// Convenience Result type using the oggplay Error
pub type Result<T> = std::result::Result<T, Error>;
