//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::ReportDataError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the text generation collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("text generation is not configured")]
    Disabled,
    #[error("text generation returned an empty response")]
    EmptyResponse,
    #[error("text generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `QuestionSupplier`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SupplyError {
    #[error("no topics to draw questions from")]
    NoTopics,
    #[error("retry budget exhausted after {attempts} attempts with {collected} valid questions")]
    BudgetExhausted { collected: usize, attempts: u32 },
}

/// A rejected answer submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidAnswer {
    #[error("{0:?} is not one of A, B, C or D")]
    UnknownLabel(String),
    #[error("question {index} was already answered")]
    AlreadyAnswered { index: usize },
}

/// Errors emitted by the quiz session state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already started")]
    AlreadyStarted,
    #[error("session is not in progress")]
    NotInProgress,
    #[error("question {index} has not been answered yet")]
    NotAnswered { index: usize },
    #[error(transparent)]
    InvalidAnswer(#[from] InvalidAnswer),
}

/// Errors emitted by `ReportBuilder`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error("session is not finished")]
    NotFinished,
    #[error(transparent)]
    Data(#[from] ReportDataError),
}

/// Failures of a persistence or export sink.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    #[error("report metadata rejected: {0}")]
    Metadata(#[from] ReportDataError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Errors emitted by `TutorService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TutorError {
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Errors emitted by `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Supply(#[from] SupplyError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
