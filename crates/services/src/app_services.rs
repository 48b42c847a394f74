use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::completion::{ChatCompletionsClient, CompletionClient, CompletionConfig};
use crate::error::AppServicesError;
use crate::export::{ExportFormat, FileExporter};
use crate::generator::PromptedGenerator;
use crate::sessions::{QuizLoopService, ReportHistoryService};
use crate::supplier::QuestionSupplier;
use crate::tutor_service::TutorService;

/// Assembles the app-facing services over one storage backend and one completion client.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    tutor: Arc<TutorService>,
    history: Arc<ReportHistoryService>,
    ai_enabled: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Reports are additionally exported as Markdown and HTML when `export_dir` is set.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        completion: Option<CompletionConfig>,
        export_dir: Option<PathBuf>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let client = ChatCompletionsClient::new(completion);
        let ai_enabled = client.enabled();
        Ok(Self::assemble(
            &storage,
            clock,
            Arc::new(client),
            ai_enabled,
            export_dir,
        ))
    }

    /// Build services over caller-provided collaborators.
    #[must_use]
    pub fn assemble(
        storage: &Storage,
        clock: Clock,
        client: Arc<dyn CompletionClient>,
        ai_enabled: bool,
        export_dir: Option<PathBuf>,
    ) -> Self {
        let generator = Arc::new(PromptedGenerator::new(Arc::clone(&client)));
        let supplier = Arc::new(QuestionSupplier::new(generator));

        let mut quiz_loop = QuizLoopService::new(clock, supplier, Arc::clone(&storage.reports));
        if let Some(dir) = export_dir {
            for format in [ExportFormat::Markdown, ExportFormat::Html] {
                quiz_loop = quiz_loop.with_exporter(Arc::new(FileExporter::new(dir.clone(), format)));
            }
        }

        Self {
            quiz_loop: Arc::new(quiz_loop),
            tutor: Arc::new(TutorService::new(client)),
            history: Arc::new(ReportHistoryService::new(Arc::clone(&storage.reports))),
            ai_enabled,
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn tutor(&self) -> Arc<TutorService> {
        Arc::clone(&self.tutor)
    }

    #[must_use]
    pub fn history(&self) -> Arc<ReportHistoryService> {
        Arc::clone(&self.history)
    }

    /// Whether a completion API key was configured.
    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }
}
