use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document identifier that cannot be ordered numerically.
    #[error("invalid doc id {0:?}: expected an integer")]
    InvalidDocId(String),

    #[error("doc id {0:?} appears more than once")]
    DuplicateDocId(String),

    #[error("failed to read corpus file {}: {source}", .path.display())]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed proximity query: {0}")]
    MalformedProximityQuery(String),

    /// No index exists at the path and no corpus was configured to build one.
    #[error("no index at {} and no corpus directory configured", .0.display())]
    MissingIndex(PathBuf),

    #[error("inconsistent index: {0}")]
    InconsistentIndex(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
