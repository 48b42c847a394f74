use std::sync::Arc;

use quiz_core::model::Difficulty;

use crate::completion::CompletionClient;
use crate::error::TutorError;
use crate::prompts;

/// Open-ended tutoring requests answered directly by the completion model.
#[derive(Clone)]
pub struct TutorService {
    client: Arc<dyn CompletionClient>,
}

impl TutorService {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Explain a networking concept step by step.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::EmptyInput` for a blank topic, or the completion error.
    pub async fn explain_concept(&self, topic: &str) -> Result<String, TutorError> {
        let topic = non_empty("topic", topic)?;
        Ok(self.client.complete(&prompts::explain_prompt(topic)).await?)
    }

    /// Propose a new exercise without its solution.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::EmptyInput` for a blank topic, or the completion error.
    pub async fn propose_exercise(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<String, TutorError> {
        let topic = non_empty("topic", topic)?;
        Ok(self
            .client
            .complete(&prompts::exercise_prompt(topic, difficulty))
            .await?)
    }

    /// Ask the model to grade a free-text answer to an exercise.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::EmptyInput` if either text is blank, or the completion error.
    pub async fn review_answer(&self, exercise: &str, answer: &str) -> Result<String, TutorError> {
        let exercise = non_empty("exercise", exercise)?;
        let answer = non_empty("answer", answer)?;
        Ok(self
            .client
            .complete(&prompts::review_prompt(exercise, answer))
            .await?)
    }
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, TutorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TutorError::EmptyInput(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoClient {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(format!("reply #{}", self.prompts.lock().unwrap().len()))
        }
    }

    struct DisabledClient;

    #[async_trait]
    impl CompletionClient for DisabledClient {
        async fn complete(&self, _prompt: &str) -> Result<String, GeneratorError> {
            Err(GeneratorError::Disabled)
        }
    }

    #[tokio::test]
    async fn requests_use_trimmed_inputs() {
        let client = Arc::new(EchoClient::default());
        let tutor = TutorService::new(client.clone());

        assert_eq!(tutor.explain_concept("  VLANs ").await.unwrap(), "reply #1");
        tutor
            .propose_exercise("Subnetting", Difficulty::Advanced)
            .await
            .unwrap();
        tutor
            .review_answer("Split 10.0.0.0/24 in four", "/26")
            .await
            .unwrap();

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("concept of VLANs clearly"));
        assert!(prompts[1].contains("advanced level"));
        assert!(prompts[2].contains("/26"));
    }

    #[tokio::test]
    async fn blank_inputs_never_reach_the_model() {
        let client = Arc::new(EchoClient::default());
        let tutor = TutorService::new(client.clone());

        assert!(matches!(
            tutor.explain_concept(" ").await,
            Err(TutorError::EmptyInput("topic"))
        ));
        assert!(matches!(
            tutor.review_answer("exercise", "").await,
            Err(TutorError::EmptyInput("answer"))
        ));
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generator_errors_propagate() {
        let tutor = TutorService::new(Arc::new(DisabledClient));
        assert!(matches!(
            tutor.explain_concept("OSI").await,
            Err(TutorError::Generator(GeneratorError::Disabled))
        ));
    }
}
