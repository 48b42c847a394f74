#![forbid(unsafe_code)]

pub mod app_services;
pub mod completion;
pub mod error;
pub mod export;
pub mod generator;
pub mod prompts;
pub mod sessions;
pub mod shuffle;
pub mod supplier;
pub mod tutor_service;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use completion::{ChatCompletionsClient, CompletionClient, CompletionConfig};
pub use error::{
    AppServicesError, GeneratorError, InvalidAnswer, QuizServiceError, ReportError, SessionError,
    SinkError, SupplyError, TutorError,
};
pub use export::{ExportArtifact, ExportFormat, ExportSink, FileExporter};
pub use generator::{PromptedGenerator, QuestionGenerator};
pub use shuffle::{shuffle, shuffle_with};
pub use supplier::{QuestionSupplier, SupplyRequest};
pub use tutor_service::TutorService;

pub use sessions::{
    AnswerFeedback, FinishedQuiz, LearnerProfile, QuizLoopService, QuizSession, ReportBuilder,
    ReportHistoryService, SessionProgress, SessionState,
};
