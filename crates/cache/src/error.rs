use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("invalid cache config: {0}")]
    InvalidConfig(String),
    /// A thread panicked while holding the shared cache lock.
    #[error("match cache lock poisoned")]
    Poisoned,
}
