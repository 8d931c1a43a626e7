use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The job batch could not be parsed; the whole batch is rejected.
    #[error("invalid job batch: {0}")]
    InvalidInput(#[source] serde_json::Error),

    /// A record file handed to the loader is not a valid job record.
    #[error("invalid job record in {path:?}: {source}")]
    InvalidRecordFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configured lexicon could not be read, so no annotator is available.
    #[error("lexicon unavailable at {path:?}: {source}")]
    Lexicon {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon at {path:?} is malformed: {source}")]
    LexiconFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write job batch: {0}")]
    Output(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}
