mod history;
mod progress;
mod report;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{InvalidAnswer, ReportError, SessionError};
pub use history::ReportHistoryService;
pub use progress::SessionProgress;
pub use report::ReportBuilder;
pub use service::{QuizSession, SessionState};
pub use workflow::{AnswerFeedback, FinishedQuiz, LearnerProfile, QuizLoopService};
