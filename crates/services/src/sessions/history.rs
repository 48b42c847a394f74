use std::sync::Arc;

use quiz_core::model::ReportId;
use storage::repository::{ReportListItem, ReportRepository, StorageError, StoredReport};

/// Read access to previously finished quizzes.
#[derive(Clone)]
pub struct ReportHistoryService {
    reports: Arc<dyn ReportRepository>,
}

impl ReportHistoryService {
    #[must_use]
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    /// Most recent reports first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository query fails.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<ReportListItem>, StorageError> {
        self.reports.list_reports(limit).await
    }

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the report does not exist.
    pub async fn get(&self, id: ReportId) -> Result<StoredReport, StorageError> {
        self.reports.get_report(id).await
    }
}
