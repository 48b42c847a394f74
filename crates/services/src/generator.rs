use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::Difficulty;

use crate::completion::CompletionClient;
use crate::error::GeneratorError;
use crate::prompts;

/// Produces one raw question block per call.
///
/// The returned text is untrusted; callers run it through `quiz_core::parse`.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns `GeneratorError` if the collaborator cannot produce text.
    async fn generate(&self, topic: &str, difficulty: Difficulty)
    -> Result<String, GeneratorError>;
}

/// Generator that prompts a completion model for the line-marker question format.
#[derive(Clone)]
pub struct PromptedGenerator {
    client: Arc<dyn CompletionClient>,
}

impl PromptedGenerator {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuestionGenerator for PromptedGenerator {
    async fn generate(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<String, GeneratorError> {
        let prompt = prompts::question_prompt(topic, difficulty);
        self.client.complete(&prompt).await
    }
}
