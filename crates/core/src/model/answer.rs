use serde::{Deserialize, Serialize};

use crate::model::label::Label;

/// One learner answer, recorded once and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub chosen: Label,
    pub correct: Label,
    pub is_correct: bool,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(question_index: usize, chosen: Label, correct: Label) -> Self {
        Self {
            question_index,
            chosen,
            correct,
            is_correct: chosen == correct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correctness_follows_labels() {
        assert!(AnswerRecord::new(0, Label::B, Label::B).is_correct);
        assert!(!AnswerRecord::new(1, Label::A, Label::C).is_correct);
    }
}
