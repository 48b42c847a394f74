mod answer;
mod difficulty;
mod ids;
mod label;
mod question;
mod report;
pub mod settings;

pub use answer::AnswerRecord;
pub use difficulty::{Difficulty, DifficultyError};
pub use ids::{ParseIdError, ReportId, SessionId};
pub use label::{Label, LabelError};
pub use question::{AnswerOption, Question, QuestionError};
pub use report::{Report, ReportDataError, ReportItem, ReportMetadata};
pub use settings::{AiSettings, AiSettingsDraft, QuizSettings, QuizSettingsDraft, SettingsError};
