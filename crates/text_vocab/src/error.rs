use std::path::PathBuf;
use thiserror::Error;

pub type VocabResult<T> = Result<T, VocabError>;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("vocabulary json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reserved token {expected} missing at index {index} (found {found:?})")]
    MissingReserved {
        index: usize,
        expected: &'static str,
        found: Option<String>,
    },
    #[error("duplicate token {0:?} in vocabulary file")]
    DuplicateToken(String),
}
