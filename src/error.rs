use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Process {process} out of range (process count: {process_count})")]
    ProcessOutOfRange {
        process: usize,
        process_count: usize,
    },

    #[error("Invalid resource state: {0}")]
    InvalidState(String),

    #[error("Process {process} cannot release {requested} units of resource {resource}: holds {held}")]
    ReleaseExceedsAllocation {
        process: usize,
        resource: usize,
        requested: u64,
        held: u64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl Error {
    pub(crate) fn dimension(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
