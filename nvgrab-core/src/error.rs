//! Error types for nvgrab

use thiserror::Error;

/// Result type alias using NvgrabError
pub type Result<T> = std::result::Result<T, NvgrabError>;

/// Main error type for nvgrab operations
#[derive(Debug, Error)]
pub enum NvgrabError {
    /// No candidate hardware encoder is available on this system
    #[error("no supported hardware encoder (tried: {0:?})")]
    NoSupportedEncoder(Vec<String>),

    /// The capture input exposes no video stream
    #[error("capture input has no video stream")]
    NoVideoStream,

    /// The requested capture backend is not compiled into FFmpeg
    #[error("capture backend not found: {0}")]
    BackendNotFound(String),

    /// Capture input error
    #[error("capture error: {0}")]
    Capture(String),

    /// Encoder error (open, submit, or drain failure)
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Color converter error
    #[error("converter error: {0}")]
    Converter(String),

    /// Container/muxer error
    #[error("output error: {0}")]
    Output(String),

    /// A second submission was issued while one was still in flight
    #[error("encoder submission already in flight")]
    PipelineOverlap,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NvgrabError {
    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Create an encoder error
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Create an output error
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<ffmpeg_next::Error> for NvgrabError {
    fn from(err: ffmpeg_next::Error) -> Self {
        Self::Encoder(err.to_string())
    }
}
