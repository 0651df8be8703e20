use thiserror::Error;

/// Failures of the durable key-value slot behind the history ledger.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Storage quota exceeded for key {key}")]
    QuotaExceeded { key: String },
}

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("history could not be persisted: {0}")]
    Persistence(#[from] StoreError),

    #[error("stored history is malformed: {0}")]
    MalformedHistory(#[from] serde_json::Error),

    #[error("no history to export")]
    EmptyExport,

    #[error("history ids exhausted after {last_id}")]
    IdsExhausted { last_id: u64 },

    #[error("{value} is not one of the current options")]
    InvalidSelection { value: i64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl QuizError {
    /// Storage-side failures: the store could not be read, written or parsed.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            QuizError::Persistence(_) | QuizError::MalformedHistory(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
