//! Error types for vadcut.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VadcutError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio format errors
    #[error("Unsupported sample rate: {rate} Hz (supported: 8000, 16000, 32000, 48000)")]
    UnsupportedSampleRate { rate: u32 },

    #[error("Audio format mismatch: expected {expected}, got {actual}")]
    AudioFormatMismatch { expected: String, actual: String },

    #[error("Failed to read WAV: {message}")]
    WavRead { message: String },

    #[error("Failed to write WAV: {message}")]
    WavWrite { message: String },

    // Classifier errors
    #[error("Classifier failed: {message}")]
    Classifier { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VadcutError>;
