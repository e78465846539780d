//! Error types
//!
//! The muxer itself never returns errors: anomalous input degrades to a
//! skipped unit (see [`crate::muxer::TagMuxer`]). These types are the public
//! error surface of the [`crate::media`] parsers, which the muxer uses
//! internally to decide whether a format config is worth a sequence tag.

/// Error type for codec configuration parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaError {
    /// AudioSpecificConfig is truncated or malformed
    InvalidAudioConfig,
    /// AVCDecoderConfigurationRecord is truncated or malformed
    InvalidVideoConfig,
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::InvalidAudioConfig => write!(f, "Invalid AudioSpecificConfig"),
            MediaError::InvalidVideoConfig => {
                write!(f, "Invalid AVCDecoderConfigurationRecord")
            }
        }
    }
}

impl std::error::Error for MediaError {}

/// Result alias for media parsing operations
pub type Result<T> = std::result::Result<T, MediaError>;
