use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an extraction run.
///
/// Row-level problems never surface here; they are counted in the
/// [`ExtractionReport`](crate::model::ExtractionReport) instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing required columns {missing:?} in {}", path.display())]
    MissingColumns { path: PathBuf, missing: Vec<String> },
    #[error("requested {requested} ids from {pool}, but only {available} are available")]
    InsufficientPool {
        pool: String,
        requested: usize,
        available: u64,
    },
    #[error("sampled {sampled} distinct ids out of {requested} from {pool}: pool contains duplicates")]
    DuplicatePoolIds {
        pool: String,
        requested: usize,
        sampled: usize,
    },
    #[error("invalid lookup id '{value}' in {}", path.display())]
    InvalidLookupId { path: PathBuf, value: String },
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("referential integrity violated: {0}")]
    IntegrityViolation(String),
    #[error("invalid row for table '{table}': {message}")]
    InvalidRow { table: String, message: String },
    #[error("catalog error: {0}")]
    Catalog(#[from] animeseed_core::Error),
    #[error("io error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExtractError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::File {
            path: path.into(),
            source,
        }
    }
}
