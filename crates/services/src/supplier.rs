use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::model::{Difficulty, Question, QuizSettings};
use quiz_core::parse;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::SupplyError;
use crate::generator::QuestionGenerator;
use crate::shuffle::shuffle_with;

/// Parameters for one batch of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyRequest {
    pub count: usize,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    /// Total generation attempts allowed, successful or not.
    pub retry_budget: u32,
}

impl SupplyRequest {
    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self {
            count: usize::try_from(settings.question_count()).unwrap_or(usize::MAX),
            topics: settings.topics().to_vec(),
            difficulty: settings.difficulty(),
            retry_budget: settings.retry_budget(),
        }
    }
}

//
// ─── TOPIC POOL ────────────────────────────────────────────────────────────────
//

/// Draws topics without repetition until every topic has been used once.
struct TopicPool<'a> {
    topics: Vec<&'a str>,
    used: Vec<bool>,
}

impl<'a> TopicPool<'a> {
    fn new(topics: &'a [String]) -> Option<Self> {
        let topics: Vec<&str> = topics
            .iter()
            .map(|topic| topic.trim())
            .filter(|topic| !topic.is_empty())
            .collect();
        if topics.is_empty() {
            return None;
        }
        let used = vec![false; topics.len()];
        Some(Self { topics, used })
    }

    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &'a str {
        if self.used.iter().all(|used| *used) {
            self.used.fill(false);
        }
        let fresh: Vec<usize> = (0..self.topics.len())
            .filter(|&idx| !self.used[idx])
            .collect();
        let idx = fresh.choose(rng).copied().unwrap_or_default();
        self.used[idx] = true;
        self.topics[idx]
    }
}

//
// ─── SUPPLIER ──────────────────────────────────────────────────────────────────
//

/// Fills a quiz with validated, shuffled questions from a generator.
///
/// Malformed generations and collaborator errors are logged and retried with a freshly
/// drawn topic until the request's retry budget is spent.
pub struct QuestionSupplier {
    generator: Arc<dyn QuestionGenerator>,
    rng: Mutex<StdRng>,
}

impl QuestionSupplier {
    #[must_use]
    pub fn new(generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            generator,
            rng: Mutex::new(StdRng::from_rng(&mut rand::rng())),
        }
    }

    /// Use a fixed seed for topic draws and option shuffles.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Request questions one at a time until `request.count` are valid.
    ///
    /// Every attempt consumes one unit of `request.retry_budget`, whatever its outcome.
    ///
    /// # Errors
    ///
    /// Returns `SupplyError::NoTopics` if the topic list has no usable entry.
    /// Returns `SupplyError::BudgetExhausted` if the budget runs out first.
    pub async fn supply(&self, request: &SupplyRequest) -> Result<Vec<Question>, SupplyError> {
        if request.count == 0 {
            return Ok(Vec::new());
        }
        let mut pool = TopicPool::new(&request.topics).ok_or(SupplyError::NoTopics)?;

        let mut questions = Vec::with_capacity(request.count);
        let mut attempts: u32 = 0;

        while questions.len() < request.count {
            if attempts >= request.retry_budget {
                warn!(
                    collected = questions.len(),
                    requested = request.count,
                    attempts,
                    "question retry budget exhausted"
                );
                return Err(SupplyError::BudgetExhausted {
                    collected: questions.len(),
                    attempts,
                });
            }
            attempts += 1;

            let topic = pool.draw(&mut *self.lock_rng());
            debug!(attempt = attempts, topic, "requesting question");

            let raw = match self.generator.generate(topic, request.difficulty).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(attempt = attempts, topic, error = %err, "question generation failed");
                    continue;
                }
            };

            match parse(&raw) {
                Ok(question) => {
                    if question.has_duplicate_texts() {
                        warn!(attempt = attempts, topic, "question has duplicate option texts");
                    }
                    let question = shuffle_with(question, &mut *self.lock_rng());
                    questions.push(question);
                }
                Err(err) => {
                    warn!(attempt = attempts, topic, error = %err, "discarding malformed question");
                }
            }
        }

        info!(count = questions.len(), attempts, "question supply complete");
        Ok(questions)
    }

    fn lock_rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
