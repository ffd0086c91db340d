//! Error types for the decision ledger

use thiserror::Error;

/// Reasons a `store_decision` call is rejected before anything is appended.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field was empty
    #[error("field `{field}` must not be empty")]
    EmptyField { field: &'static str },

    /// The submitter token was empty
    #[error("submitter identity must not be empty")]
    EmptySubmitter,

    /// Participant id is negative or does not fit in 64 bits
    #[error("participant id {value} is outside the accepted range 0..={max}", max = u64::MAX)]
    ParticipantOutOfRange { value: i128 },

    /// Participant id could not be parsed as an integer
    #[error("participant id `{raw}` is not an integer")]
    ParticipantNotInteger { raw: String },
}

/// Errors that can occur in the ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Input rejected by `store_decision`
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// `get_record` addressed a position past the end of the submitter's sequence
    #[error("record index {index} out of range for submitter {submitter} (count: {count})")]
    OutOfRange {
        submitter: String,
        index: u64,
        count: u64,
    },

    /// Database connection error
    #[error("database connection failed: {0}")]
    Connection(String),

    /// Storage backend error
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl LedgerError {
    /// True for the two error kinds defined by the ledger itself
    /// (as opposed to infrastructure failures).
    pub fn is_ledger_rejection(&self) -> bool {
        matches!(self, LedgerError::Validation(_) | LedgerError::OutOfRange { .. })
    }
}

impl From<surrealdb::Error> for LedgerError {
    fn from(err: surrealdb::Error) -> Self {
        LedgerError::Backend(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for LedgerError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        LedgerError::Backend("ledger lock poisoned".to_string())
    }
}
