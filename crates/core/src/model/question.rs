use serde::Serialize;
use thiserror::Error;

use crate::model::label::Label;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Validation failures when assembling a `Question`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("option {0} has no text")]
    EmptyOption(Label),

    #[error("label {0} appears more than once")]
    DuplicateLabel(Label),

    #[error("explanation is empty")]
    EmptyExplanation,
}

//
// ─── ANSWER OPTION ────────────────────────────────────────────────────────────
//

/// A labelled answer choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    label: Label,
    text: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question with exactly four options.
///
/// Only constructible through [`Question::new`], so every instance has non-empty text,
/// four uniquely labelled options and an explanation. Because labels are drawn from the
/// four-valued [`Label`], uniqueness also guarantees the correct label is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    text: String,
    options: [AnswerOption; 4],
    correct: Label,
    explanation: String,
}

impl Question {
    /// Validate and build a question. Text fields are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if any text is empty or two options share a label.
    pub fn new(
        text: impl Into<String>,
        options: [AnswerOption; 4],
        correct: Label,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let mut seen = [false; 4];
        for option in &options {
            let slot = &mut seen[option.label.index()];
            if *slot {
                return Err(QuestionError::DuplicateLabel(option.label));
            }
            *slot = true;

            if option.text.trim().is_empty() {
                return Err(QuestionError::EmptyOption(option.label));
            }
        }

        let explanation = explanation.into().trim().to_string();
        if explanation.is_empty() {
            return Err(QuestionError::EmptyExplanation);
        }

        let options = options.map(|option| AnswerOption::new(option.label, option.text.trim()));

        Ok(Self {
            text,
            options,
            correct,
            explanation,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption; 4] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> Label {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn option(&self, label: Label) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.label == label)
    }

    /// Text of the option marked correct.
    #[must_use]
    pub fn correct_text(&self) -> &str {
        self.option(self.correct).map_or("", AnswerOption::text)
    }

    /// Whether two options carry the same text. Such questions stay valid.
    #[must_use]
    pub fn has_duplicate_texts(&self) -> bool {
        self.options
            .iter()
            .enumerate()
            .any(|(i, a)| self.options[i + 1..].iter().any(|b| a.text == b.text))
    }

    /// Reorder the options by a rank derived from each option's current position, then
    /// reassign labels A–D in the new order.
    ///
    /// The correct label follows the option that was correct before, by position.
    #[must_use]
    pub fn reordered_by<K: Ord>(self, mut rank: impl FnMut(usize) -> K) -> Self {
        let Self {
            text,
            options,
            correct,
            explanation,
        } = self;

        let mut order = [0_usize, 1, 2, 3];
        order.sort_by_cached_key(|&pos| rank(pos));

        let mut new_correct = correct;
        let options = std::array::from_fn(|slot| {
            let label = Label::ALL[slot];
            let previous = &options[order[slot]];
            if previous.label == correct {
                new_correct = label;
            }
            AnswerOption::new(label, previous.text.clone())
        });

        Self {
            text,
            options,
            correct: new_correct,
            explanation,
        }
    }
}
