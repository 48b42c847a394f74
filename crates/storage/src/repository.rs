use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{Difficulty, Report, ReportId, ReportMetadata, SessionId};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted report together with its identifying metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    pub id: ReportId,
    pub metadata: ReportMetadata,
    pub report: Report,
}

/// Lightweight row for history listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportListItem {
    pub id: ReportId,
    pub session_id: SessionId,
    pub learner_name: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub score: u32,
    pub total: u32,
    pub completed_at: DateTime<Utc>,
}

impl ReportListItem {
    #[must_use]
    pub fn from_stored(stored: &StoredReport) -> Self {
        Self {
            id: stored.id,
            session_id: stored.report.session_id(),
            learner_name: stored.metadata.learner_name().to_owned(),
            topic: stored.metadata.topic().to_owned(),
            difficulty: stored.metadata.difficulty(),
            score: stored.report.score(),
            total: stored.report.total(),
            completed_at: stored.metadata.completed_at(),
        }
    }
}

/// Durable sink for finished quiz reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persist a finished report.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a report for the same session already exists,
    /// or other storage errors.
    async fn append_report(
        &self,
        metadata: &ReportMetadata,
        report: &Report,
    ) -> Result<ReportId, StorageError>;

    /// Fetch a report by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_report(&self, id: ReportId) -> Result<StoredReport, StorageError>;

    /// List the most recently completed reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn list_reports(&self, limit: u32) -> Result<Vec<ReportListItem>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    reports: Arc<Mutex<Vec<StoredReport>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for InMemoryRepository {
    async fn append_report(
        &self,
        metadata: &ReportMetadata,
        report: &Report,
    ) -> Result<ReportId, StorageError> {
        let mut guard = self
            .reports
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard
            .iter()
            .any(|stored| stored.report.session_id() == report.session_id())
        {
            return Err(StorageError::Conflict);
        }
        let next = u64::try_from(guard.len())
            .map_err(|e| StorageError::Serialization(e.to_string()))?
            + 1;
        let id = ReportId::new(next);
        guard.push(StoredReport {
            id,
            metadata: metadata.clone(),
            report: report.clone(),
        });
        Ok(id)
    }

    async fn get_report(&self, id: ReportId) -> Result<StoredReport, StorageError> {
        let guard = self
            .reports
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|stored| stored.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_reports(&self, limit: u32) -> Result<Vec<ReportListItem>, StorageError> {
        let guard = self
            .reports
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut items: Vec<ReportListItem> = guard.iter().map(ReportListItem::from_stored).collect();
        items.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(items)
    }
}

/// Report persistence behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub reports: Arc<dyn ReportRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let reports: Arc<dyn ReportRepository> = Arc::new(InMemoryRepository::new());
        Self { reports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{AnswerOption, AnswerRecord, Label, Question, ReportItem};
    use quiz_core::time::fixed_now;

    fn build_report(correct: bool, completed_at: DateTime<Utc>) -> Report {
        let question = Question::new(
            "Which layer routes packets?",
            [
                AnswerOption::new(Label::A, "Physical"),
                AnswerOption::new(Label::B, "Network"),
                AnswerOption::new(Label::C, "Session"),
                AnswerOption::new(Label::D, "Application"),
            ],
            Label::B,
            "Routing is a Network-layer function.",
        )
        .unwrap();
        let chosen = if correct { Label::B } else { Label::A };
        let item = ReportItem::from_answer(&question, &AnswerRecord::new(0, chosen, Label::B));
        Report::new(SessionId::generate(), fixed_now(), completed_at, vec![item]).unwrap()
    }

    fn metadata(completed_at: DateTime<Utc>) -> ReportMetadata {
        ReportMetadata::new("Ana", None, "OSI model", Difficulty::Basic, completed_at).unwrap()
    }

    #[tokio::test]
    async fn appends_and_fetches_report() {
        let repo = InMemoryRepository::new();
        let report = build_report(true, fixed_now());
        let id = repo
            .append_report(&metadata(fixed_now()), &report)
            .await
            .unwrap();

        let stored = repo.get_report(id).await.unwrap();
        assert_eq!(stored.report, report);
        assert_eq!(stored.metadata.learner_name(), "Ana");
        assert!(matches!(
            repo.get_report(ReportId::new(99)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn rejects_duplicate_session() {
        let repo = InMemoryRepository::new();
        let report = build_report(true, fixed_now());
        repo.append_report(&metadata(fixed_now()), &report)
            .await
            .unwrap();
        let err = repo
            .append_report(&metadata(fixed_now()), &report)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let repo = InMemoryRepository::new();
        let earlier = fixed_now();
        let later = fixed_now() + Duration::hours(1);
        repo.append_report(&metadata(earlier), &build_report(false, earlier))
            .await
            .unwrap();
        let newest = repo
            .append_report(&metadata(later), &build_report(true, later))
            .await
            .unwrap();

        let items = repo.list_reports(10).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, newest);
        assert_eq!(items[0].score, 1);
        assert_eq!(items[1].score, 0);

        assert_eq!(repo.list_reports(1).await.unwrap().len(), 1);
    }
}
