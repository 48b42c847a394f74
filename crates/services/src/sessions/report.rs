use quiz_core::model::{Report, ReportItem};

use super::service::QuizSession;
use crate::error::ReportError;

/// Reduces a finished session into an immutable [`Report`].
pub struct ReportBuilder;

impl ReportBuilder {
    /// # Errors
    ///
    /// Returns `ReportError::NotFinished` unless the session is finished.
    pub fn build(session: &QuizSession) -> Result<Report, ReportError> {
        if !session.is_finished() {
            return Err(ReportError::NotFinished);
        }
        let (Some(started_at), Some(completed_at)) = (session.started_at(), session.completed_at())
        else {
            return Err(ReportError::NotFinished);
        };

        let items = session
            .questions()
            .iter()
            .zip(session.answers())
            .map(|(question, answer)| ReportItem::from_answer(question, answer))
            .collect();

        Ok(Report::new(session.id(), started_at, completed_at, items)?)
    }
}
