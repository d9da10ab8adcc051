// Engine error taxonomy
//
// Three buckets, matching how callers are expected to map failures:
// - Validation: bad input shape or an illegal state transition (HTTP 400)
// - NotFound: a referenced entity does not exist (HTTP 404)
// - Invariant: the engine detected corrupted state mid-operation; the
//   enclosing transaction is rolled back (HTTP 500)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad input or an operation not legal in the current state.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced tournament, entry, course or golfer does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal consistency violation; the enclosing mutation was rolled back.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        EngineError::NotFound(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        EngineError::Invariant(msg.into())
    }
}
