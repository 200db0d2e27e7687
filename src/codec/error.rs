//! Codec error types.

use thiserror::Error;

/// Errors that can occur while persisting state data
#[derive(Debug, Error)]
pub enum CodecError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// The data handed to the codec is not of the type it was declared for
    #[error("Codec for {expected} cannot encode data of another type")]
    TypeMismatch { expected: &'static str },
}
