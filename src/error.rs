//! Domain error types.
//!
//! `QuizError` covers data-absent conditions and engine invariant violations.
//! `StorageError` covers failures of the file store; callers treat those as
//! "no data available" rather than aborting the session.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// The word set in play has no entries.
    #[error("no words are available for the selected days")]
    EmptySet,

    /// The loaded dataset is empty.
    #[error("no vocabulary data is loaded")]
    NoData,

    /// The incorrect-answer queue is empty.
    #[error("there are no incorrect words to review")]
    EmptyReviewQueue,

    /// The marked checklist is empty.
    #[error("there are no marked words")]
    NoMarkedWords,

    /// No answers have been recorded in this session.
    #[error("there are no study records to save")]
    NoRecords,

    /// A stored list was used before being loaded from the file store.
    #[error("the {0} list has not been loaded")]
    ListNotLoaded(String),

    /// An answer or mark was submitted before a question was shown.
    #[error("no question is currently shown")]
    NoActiveQuestion,

    /// The request belongs to a screen that is not being shown.
    #[error("{expected} mode is not active (current mode: {actual})")]
    WrongMode { expected: String, actual: String },

    /// The requested screen is not offered from the current one.
    #[error("cannot go to {to} from {from}")]
    InvalidTransition { from: String, to: String },

    /// Cursor points past the end of the word set.
    #[error("cursor {cursor} is out of range for {len} words")]
    CursorOutOfRange { cursor: usize, len: usize },
}

impl QuizError {
    /// Returns `true` for conditions that only mean "nothing to show yet".
    pub fn is_data_absent(&self) -> bool {
        matches!(
            self,
            QuizError::EmptySet
                | QuizError::NoData
                | QuizError::EmptyReviewQueue
                | QuizError::NoMarkedWords
                | QuizError::NoRecords
        )
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    /// The store rejected our credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The store returned an unexpected status.
    #[error("storage error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored table could not be parsed or written.
    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid file name: {0}")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_absent_classification() {
        assert!(QuizError::EmptySet.is_data_absent());
        assert!(QuizError::EmptyReviewQueue.is_data_absent());
        assert!(QuizError::NoRecords.is_data_absent());
        assert!(!QuizError::NoActiveQuestion.is_data_absent());
        assert!(!QuizError::ListNotLoaded("marked".to_string()).is_data_absent());
        assert!(!QuizError::CursorOutOfRange { cursor: 5, len: 2 }.is_data_absent());
    }

    #[test]
    fn test_error_messages() {
        let err = QuizError::CursorOutOfRange { cursor: 5, len: 2 };
        assert_eq!(err.to_string(), "cursor 5 is out of range for 2 words");

        let err = StorageError::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(err.to_string().contains("HTTP 500"));
    }
}
