//! Error types for stripecode
//!
//! Provides a unified error type for all erasure coding operations.

use thiserror::Error;

/// Result type alias for stripecode operations
pub type Result<T> = std::result::Result<T, ErasureError>;

/// Unified error type for erasure coding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErasureError {
    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ===== Split/Join Errors =====
    #[error("Cannot encode an empty buffer")]
    EmptyInput,

    #[error("Length mismatch: requested {requested} bytes, shards hold {available}")]
    LengthMismatch { requested: usize, available: usize },

    // ===== Field/Matrix Errors =====
    #[error("Division by zero in GF(256)")]
    DivisionByZero,

    #[error("Matrix is singular and cannot be inverted")]
    SingularMatrix,

    // ===== Decode Errors =====
    #[error("Too many shards missing: {missing} missing, can tolerate {max}")]
    TooManyShardsMissing { missing: usize, max: usize },

    #[error("Failed to decode data from shards")]
    FailedDecode,

    #[error("Shard count mismatch: expected {expected}, got {actual}")]
    ShardCountMismatch { expected: usize, actual: usize },

    #[error("Shard size mismatch: expected {expected}, got {actual}")]
    ShardSizeMismatch { expected: usize, actual: usize },
}
