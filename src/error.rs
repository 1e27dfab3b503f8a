//! Error types shared by every erasure coding operation.

/// Errors that can occur while building, encoding or decoding.
///
/// Every error is local to the call that produced it. The engine holds no
/// state between calls, so a failed call leaves nothing to roll back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid `k`, `m`, `w`, packet size, or `k + m > 2^w`.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Buffer or matrix dimensions disagree with `k`, `m`, `w` and the packet size.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// More erasures than coding devices, or a duplicate / out of range index.
    #[error("unrecoverable erasure: {0}")]
    UnrecoverableErasure(String),

    /// A decoding matrix was singular even though the erasure set was valid.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// A single field operation received an operand it cannot handle.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for erasure coding operations
pub type Result<T> = std::result::Result<T, Error>;
