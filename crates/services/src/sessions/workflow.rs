use std::sync::Arc;

use quiz_core::model::{Label, QuizSettings, Report, ReportId, ReportMetadata};
use storage::repository::ReportRepository;
use tracing::{info, warn};

use super::report::ReportBuilder;
use super::service::{QuizSession, SessionState};
use crate::Clock;
use crate::error::{QuizServiceError, SessionError, SinkError};
use crate::export::{ExportArtifact, ExportSink};
use crate::supplier::{QuestionSupplier, SupplyRequest};

/// Who took the quiz, attached to the persisted report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerProfile {
    pub name: String,
    pub email: Option<String>,
}

/// What the learner sees right after answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub index: usize,
    pub chosen: Label,
    pub correct: Label,
    pub is_correct: bool,
    pub correct_text: String,
    pub explanation: String,
}

/// Outcome of finishing a quiz.
///
/// The report is always present; sink failures are collected in `warnings`.
/// `metadata` is `None` when the learner details were rejected, in which case no sink ran.
#[derive(Debug)]
pub struct FinishedQuiz {
    pub report: Report,
    pub metadata: Option<ReportMetadata>,
    pub persisted_id: Option<ReportId>,
    pub artifacts: Vec<ExportArtifact>,
    pub warnings: Vec<SinkError>,
}

/// Orchestrates question supply, the session loop, and report delivery.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    supplier: Arc<QuestionSupplier>,
    reports: Arc<dyn ReportRepository>,
    exporters: Vec<Arc<dyn ExportSink>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        supplier: Arc<QuestionSupplier>,
        reports: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            clock,
            supplier,
            reports,
            exporters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_exporter(mut self, exporter: Arc<dyn ExportSink>) -> Self {
        self.exporters.push(exporter);
        self
    }

    /// Supply questions for `settings` and start a fresh session with them.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Supply` if not enough valid questions could be generated.
    pub async fn start_quiz(&self, settings: &QuizSettings) -> Result<QuizSession, QuizServiceError> {
        let request = SupplyRequest::from_settings(settings);
        let questions = self.supplier.supply(&request).await?;

        let mut session = QuizSession::new();
        session.start(questions, self.clock.now())?;
        info!(
            session_id = %session.id(),
            questions = session.questions().len(),
            difficulty = %settings.difficulty(),
            "quiz started"
        );
        Ok(session)
    }

    /// Record an answer for the current question and describe the outcome.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the answer is rejected.
    pub fn answer_current(
        &self,
        session: &mut QuizSession,
        choice: &str,
    ) -> Result<AnswerFeedback, QuizServiceError> {
        let record = *session.submit_answer(choice)?;
        let question = session
            .current_question()
            .ok_or(SessionError::NotInProgress)?;

        Ok(AnswerFeedback {
            index: record.question_index,
            chosen: record.chosen,
            correct: record.correct,
            is_correct: record.is_correct,
            correct_text: question.correct_text().to_string(),
            explanation: question.explanation().to_string(),
        })
    }

    /// Advance past the current answered question.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the question has not been answered.
    pub fn advance(&self, session: &mut QuizSession) -> Result<SessionState, QuizServiceError> {
        Ok(session.advance(self.clock.now())?)
    }

    /// Build the report of a finished session, then persist and export it.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Report` if the session is unfinished. Invalid learner
    /// details and sink failures never fail the call.
    pub async fn finish(
        &self,
        session: &QuizSession,
        learner: &LearnerProfile,
        settings: &QuizSettings,
    ) -> Result<FinishedQuiz, QuizServiceError> {
        let report = ReportBuilder::build(session)?;
        let mut warnings = Vec::new();
        let mut persisted_id = None;
        let mut artifacts = Vec::new();

        let metadata = match ReportMetadata::new(
            learner.name.clone(),
            learner.email.clone(),
            settings.topic_label(),
            settings.difficulty(),
            report.completed_at(),
        ) {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                warn!(session_id = %report.session_id(), error = %err, "skipping report delivery");
                warnings.push(SinkError::from(err));
                None
            }
        };

        if let Some(metadata) = &metadata {
            match self.reports.append_report(metadata, &report).await {
                Ok(id) => persisted_id = Some(id),
                Err(err) => {
                    warn!(session_id = %report.session_id(), error = %err, "failed to persist report");
                    warnings.push(SinkError::from(err));
                }
            }

            for exporter in &self.exporters {
                match exporter.export(metadata, &report) {
                    Ok(artifact) => artifacts.push(artifact),
                    Err(err) => {
                        warn!(session_id = %report.session_id(), error = %err, "failed to export report");
                        warnings.push(err);
                    }
                }
            }
        }

        info!(
            session_id = %report.session_id(),
            score = report.score(),
            total = report.total(),
            "quiz finished"
        );

        Ok(FinishedQuiz {
            report,
            metadata,
            persisted_id,
            artifacts,
            warnings,
        })
    }
}
