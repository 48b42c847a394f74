use thiserror::Error;
use url::Url;

use crate::model::Difficulty;

/// Inclusive bounds on the number of questions per quiz.
pub const MIN_QUESTIONS: u32 = 3;
pub const MAX_QUESTIONS: u32 = 10;
pub const DEFAULT_QUESTIONS: u32 = 5;

/// Attempts allowed per requested question when no explicit budget is given.
pub const DEFAULT_ATTEMPTS_PER_QUESTION: u32 = 3;

/// Syllabus used when the learner does not name topics.
pub const DEFAULT_TOPICS: [&str; 9] = [
    "OSI model",
    "TCP/IP",
    "Network devices",
    "IP addressing",
    "Switching and routing",
    "Communication protocols",
    "LAN and WAN",
    "Wireless networks",
    "Network security",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid base URL")]
    InvalidBaseUrl,

    #[error("question count must be between 3 and 10, got {0}")]
    QuestionCount(u32),

    #[error("retry budget ({budget}) is smaller than the question count ({count})")]
    RetryBudget { budget: u32, count: u32 },
}

//
// ─── AI SETTINGS ──────────────────────────────────────────────────────────────
//

/// Connection details for the text generation service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AiSettings {
    api_key: Option<String>,
    api_model: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AiSettingsDraft {
    pub api_key: Option<String>,
    pub api_model: Option<String>,
    pub api_base_url: Option<String>,
}

impl AiSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidBaseUrl` if the base URL is present but invalid.
    pub fn validate(self) -> Result<AiSettings, SettingsError> {
        let api_key = normalize_optional(self.api_key);
        let api_model = normalize_optional(self.api_model);
        let api_base_url = normalize_optional(self.api_base_url);

        if let Some(url) = api_base_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(SettingsError::InvalidBaseUrl);
            }
        }

        Ok(AiSettings {
            api_key,
            api_model,
            api_base_url,
        })
    }
}

impl AiSettings {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn api_model(&self) -> Option<&str> {
        self.api_model.as_deref()
    }

    #[must_use]
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }
}

//
// ─── QUIZ SETTINGS ────────────────────────────────────────────────────────────
//

/// Validated parameters for one quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    question_count: u32,
    retry_budget: u32,
    difficulty: Difficulty,
    topics: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub question_count: Option<u32>,
    pub retry_budget: Option<u32>,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
}

impl QuizSettingsDraft {
    /// Validate the draft, filling defaults for missing values.
    ///
    /// Blank and repeated topics are dropped; an empty list falls back to [`DEFAULT_TOPICS`].
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the count is out of range or the budget cannot cover it.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        let question_count = self.question_count.unwrap_or(DEFAULT_QUESTIONS);
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&question_count) {
            return Err(SettingsError::QuestionCount(question_count));
        }

        let retry_budget = self
            .retry_budget
            .unwrap_or_else(|| question_count.saturating_mul(DEFAULT_ATTEMPTS_PER_QUESTION));
        if retry_budget < question_count {
            return Err(SettingsError::RetryBudget {
                budget: retry_budget,
                count: question_count,
            });
        }

        let mut topics: Vec<String> = Vec::with_capacity(self.topics.len());
        for topic in self.topics {
            let topic = topic.trim().to_string();
            if !topic.is_empty() && !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        if topics.is_empty() {
            topics = DEFAULT_TOPICS.iter().map(|t| (*t).to_string()).collect();
        }

        Ok(QuizSettings {
            question_count,
            retry_budget,
            difficulty: self.difficulty,
            topics,
        })
    }
}

impl QuizSettings {
    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Short label for the topic pool, used in reports.
    #[must_use]
    pub fn topic_label(&self) -> String {
        self.topics.join(", ")
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
