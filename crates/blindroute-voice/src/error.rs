//! Error types for the voice coordination layer

use thiserror::Error;

/// Result type alias for voice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Errors reported by speech engines and the haptic driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Speech output error: {0}")]
    SpeechOutput(String),

    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Vibration error: {0}")]
    Haptics(String),

    #[error("Speech interrupted")]
    Interrupted,

    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}
