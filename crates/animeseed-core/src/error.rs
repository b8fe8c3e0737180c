use thiserror::Error;

/// Core error type shared across animeseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The seed catalog violates internal invariants.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Convenience alias for results returned by animeseed crates.
pub type Result<T> = std::result::Result<T, Error>;
