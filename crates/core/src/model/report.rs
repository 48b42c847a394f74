use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{AnswerOption, AnswerRecord, Difficulty, Label, Question, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportDataError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) does not match correct answers ({correct})")]
    ScoreMismatch { score: u32, correct: u32 },

    #[error("total ({total}) does not match item count ({items})")]
    TotalMismatch { total: u32, items: usize },

    #[error("too many items for a single report: {len}")]
    TooManyItems { len: usize },

    #[error("learner name is empty")]
    MissingLearnerName,

    #[error("topic is empty")]
    MissingTopic,
}

/// Per-question detail shown after a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportItem {
    pub question_index: usize,
    pub question: String,
    pub options: [AnswerOption; 4],
    pub chosen: Label,
    pub chosen_text: String,
    pub correct: Label,
    pub correct_text: String,
    pub explanation: String,
    pub is_correct: bool,
}

impl ReportItem {
    /// Pair an answer with the question it was given for.
    #[must_use]
    pub fn from_answer(question: &Question, answer: &AnswerRecord) -> Self {
        let chosen_text = question
            .option(answer.chosen)
            .map(AnswerOption::text)
            .unwrap_or_default()
            .to_string();
        Self {
            question_index: answer.question_index,
            question: question.text().to_string(),
            options: question.options().clone(),
            chosen: answer.chosen,
            chosen_text,
            correct: answer.correct,
            correct_text: question.correct_text().to_string(),
            explanation: question.explanation().to_string(),
            is_correct: answer.is_correct,
        }
    }
}

/// Read-only outcome of a finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    score: u32,
    total: u32,
    items: Vec<ReportItem>,
}

impl Report {
    /// Build a report, deriving score and total from the items.
    ///
    /// # Errors
    ///
    /// Returns `ReportDataError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `ReportDataError::TooManyItems` if the item count cannot fit in `u32`.
    pub fn new(
        session_id: SessionId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        items: Vec<ReportItem>,
    ) -> Result<Self, ReportDataError> {
        let total = u32::try_from(items.len())
            .map_err(|_| ReportDataError::TooManyItems { len: items.len() })?;
        let score = count_correct(&items);
        Self::from_persisted(session_id, started_at, completed_at, score, total, items)
    }

    /// Rehydrate a report from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ReportDataError` if the stored totals disagree with the items.
    pub fn from_persisted(
        session_id: SessionId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: u32,
        total: u32,
        items: Vec<ReportItem>,
    ) -> Result<Self, ReportDataError> {
        if completed_at < started_at {
            return Err(ReportDataError::InvalidTimeRange);
        }
        if usize::try_from(total).ok() != Some(items.len()) {
            return Err(ReportDataError::TotalMismatch {
                total,
                items: items.len(),
            });
        }
        let correct = count_correct(&items);
        if correct != score {
            return Err(ReportDataError::ScoreMismatch { score, correct });
        }

        Ok(Self {
            session_id,
            started_at,
            completed_at,
            score,
            total,
            items,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    /// Score as a percentage in `0.0..=100.0`.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.score) * 100.0 / f64::from(self.total)
    }
}

fn count_correct(items: &[ReportItem]) -> u32 {
    items
        .iter()
        .filter(|item| item.is_correct)
        .fold(0_u32, |acc, _| acc.saturating_add(1))
}

/// Identifying details stored alongside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    learner_name: String,
    learner_email: Option<String>,
    topic: String,
    difficulty: Difficulty,
    completed_at: DateTime<Utc>,
}

impl ReportMetadata {
    /// # Errors
    ///
    /// Returns `ReportDataError` if the learner name or topic is blank.
    pub fn new(
        learner_name: impl Into<String>,
        learner_email: Option<String>,
        topic: impl Into<String>,
        difficulty: Difficulty,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ReportDataError> {
        let learner_name = learner_name.into().trim().to_string();
        if learner_name.is_empty() {
            return Err(ReportDataError::MissingLearnerName);
        }
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(ReportDataError::MissingTopic);
        }
        let learner_email = learner_email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        Ok(Self {
            learner_name,
            learner_email,
            topic,
            difficulty,
            completed_at,
        })
    }

    #[must_use]
    pub fn learner_name(&self) -> &str {
        &self.learner_name
    }

    #[must_use]
    pub fn learner_email(&self) -> Option<&str> {
        self.learner_email.as_deref()
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
