use thiserror::Error;

/// Failures reported by pool and history collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store could not be reached or rejected the operation.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    /// A lock guarding in-process state was poisoned by a panicking writer.
    #[error("repository lock poisoned: {0}")]
    Poisoned(&'static str),
}

impl RepositoryError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        RepositoryError::Unavailable(msg.into())
    }
}
