use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{AnswerRecord, Label, Question, SessionId};

use super::progress::SessionProgress;
use crate::error::{InvalidAnswer, SessionError};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where a quiz session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    /// `index` is the question on screen; `answered` is set once it has a recorded answer.
    InProgress { index: usize, answered: bool },
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Linear multiple-choice quiz: each question is answered once, then the learner advances.
///
/// All transitions take `&mut self`; a failed transition leaves the session untouched.
pub struct QuizSession {
    id: SessionId,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    answers: Vec<AnswerRecord>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            questions: Vec::new(),
            current: 0,
            score: 0,
            answers: Vec::new(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Load the questions and show the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` unless the session is `NotStarted`.
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn start(
        &mut self,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<SessionState, SessionError> {
        if self.state() != SessionState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        self.questions = questions;
        self.current = 0;
        self.score = 0;
        self.answers.clear();
        self.started_at = Some(started_at);
        self.completed_at = None;
        Ok(self.state())
    }

    /// Record the learner's choice for the current question.
    ///
    /// `choice` is read as a label (`"b"`, `"B"` and `"B)"` all mean `B`).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress`.
    /// Returns `InvalidAnswer::AlreadyAnswered` if the question already has an answer.
    /// Returns `InvalidAnswer::UnknownLabel` if `choice` does not name A–D.
    pub fn submit_answer(&mut self, choice: &str) -> Result<&AnswerRecord, SessionError> {
        let SessionState::InProgress { index, answered } = self.state() else {
            return Err(SessionError::NotInProgress);
        };
        if answered {
            return Err(InvalidAnswer::AlreadyAnswered { index }.into());
        }
        let chosen: Label = choice
            .parse()
            .map_err(|_| InvalidAnswer::UnknownLabel(choice.trim().to_string()))?;
        let correct = self
            .questions
            .get(index)
            .map(Question::correct)
            .ok_or(SessionError::NotInProgress)?;

        let record = AnswerRecord::new(index, chosen, correct);
        if record.is_correct {
            self.score += 1;
        }
        self.answers.push(record);

        self.answers.last().ok_or(SessionError::NotInProgress)
    }

    /// Move past an answered question, finishing after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress`.
    /// Returns `SessionError::NotAnswered` if the current question has no answer yet.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<SessionState, SessionError> {
        let SessionState::InProgress { index, answered } = self.state() else {
            return Err(SessionError::NotInProgress);
        };
        if !answered {
            return Err(SessionError::NotAnswered { index });
        }

        self.current += 1;
        if self.current >= self.questions.len() {
            self.completed_at = Some(at);
        }
        Ok(self.state())
    }

    /// Discard everything and return to `NotStarted` under a fresh id.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.questions.is_empty() {
            SessionState::NotStarted
        } else if self.current >= self.questions.len() {
            SessionState::Finished
        } else {
            SessionState::InProgress {
                index: self.current,
                answered: self.answers.len() > self.current,
            }
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state() == SessionState::Finished
    }

    /// The question on screen, if the session is in progress.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state() {
            SessionState::InProgress { index, .. } => self.questions.get(index),
            SessionState::NotStarted | SessionState::Finished => None,
        }
    }

    /// The answer recorded for the current question, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        match self.state() {
            SessionState::InProgress { index, .. } => self.answers.get(index),
            SessionState::NotStarted | SessionState::Finished => None,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        SessionProgress {
            total,
            position: (self.current + 1).min(total),
            answered: self.answers.len(),
            remaining: total.saturating_sub(self.answers.len()),
            score: self.score,
            is_complete: self.is_finished(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("answers_len", &self.answers.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::AnswerOption;
    use quiz_core::time::fixed_now;

    fn build_question(correct: Label) -> Question {
        Question::new(
            "What layer handles routing?",
            [
                AnswerOption::new(Label::A, "Physical"),
                AnswerOption::new(Label::B, "Network"),
                AnswerOption::new(Label::C, "Session"),
                AnswerOption::new(Label::D, "Application"),
            ],
            correct,
            "Routing is a Network-layer function.",
        )
        .unwrap()
    }

    fn started(correct: &[Label]) -> QuizSession {
        let mut session = QuizSession::new();
        let questions = correct.iter().copied().map(build_question).collect();
        session.start(questions, fixed_now()).unwrap();
        session
    }

    #[test]
    fn start_moves_to_first_question() {
        let session = started(&[Label::B, Label::C]);
        assert_eq!(
            session.state(),
            SessionState::InProgress {
                index: 0,
                answered: false
            }
        );
        assert_eq!(session.current_question().unwrap().correct(), Label::B);
        assert_eq!(session.started_at(), Some(fixed_now()));
    }

    #[test]
    fn start_rejects_empty_and_repeated_start() {
        let mut session = QuizSession::new();
        assert_eq!(
            session.start(Vec::new(), fixed_now()).unwrap_err(),
            SessionError::Empty
        );
        assert_eq!(session.state(), SessionState::NotStarted);

        let mut session = started(&[Label::A]);
        let err = session
            .start(vec![build_question(Label::D)], fixed_now())
            .unwrap_err();
        assert_eq!(err, SessionError::AlreadyStarted);
        assert_eq!(session.questions().len(), 1);
    }

    #[test]
    fn full_run_scores_matches() {
        let mut session = started(&[Label::B, Label::C, Label::A]);
        let choices = ["b", "A", "a)"];
        for choice in choices {
            session.submit_answer(choice).unwrap();
            session.advance(fixed_now() + Duration::minutes(3)).unwrap();
        }

        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.score(), 2);
        assert_eq!(session.answers().len(), 3);
        assert!(session.answers()[0].is_correct);
        assert!(!session.answers()[1].is_correct);
        assert_eq!(session.completed_at(), Some(fixed_now() + Duration::minutes(3)));
        assert!(session.current_question().is_none());
        assert!(session.progress().is_complete);
    }

    #[test]
    fn advance_without_answer_is_rejected() {
        let mut session = started(&[Label::A, Label::B, Label::C, Label::D]);
        for _ in 0..2 {
            session.submit_answer("A").unwrap();
            session.advance(fixed_now()).unwrap();
        }
        let before = session.state();
        assert_eq!(
            before,
            SessionState::InProgress {
                index: 2,
                answered: false
            }
        );

        let err = session.advance(fixed_now()).unwrap_err();
        assert_eq!(err, SessionError::NotAnswered { index: 2 });
        assert_eq!(session.state(), before);
        assert_eq!(session.answers().len(), 2);
    }

    #[test]
    fn second_answer_and_bad_labels_leave_state_unchanged() {
        let mut session = started(&[Label::B, Label::C]);

        let err = session.submit_answer("E").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidAnswer(InvalidAnswer::UnknownLabel("E".into()))
        );
        assert!(session.answers().is_empty());

        let record = *session.submit_answer("B").unwrap();
        assert!(record.is_correct);
        assert_eq!(session.current_answer(), Some(&record));

        let err = session.submit_answer("C").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidAnswer(InvalidAnswer::AlreadyAnswered { index: 0 })
        );
        assert_eq!(session.score(), 1);
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn transitions_outside_progress_fail() {
        let mut session = QuizSession::new();
        assert_eq!(
            session.submit_answer("A").unwrap_err(),
            SessionError::NotInProgress
        );
        assert_eq!(
            session.advance(fixed_now()).unwrap_err(),
            SessionError::NotInProgress
        );

        let mut session = started(&[Label::A]);
        session.submit_answer("A").unwrap();
        session.advance(fixed_now()).unwrap();
        assert_eq!(
            session.submit_answer("A").unwrap_err(),
            SessionError::NotInProgress
        );
        assert_eq!(
            session.advance(fixed_now()).unwrap_err(),
            SessionError::NotInProgress
        );
    }

    #[test]
    fn reset_from_any_state_starts_over() {
        let mut fresh = QuizSession::new();
        let mut mid = started(&[Label::A, Label::B]);
        mid.submit_answer("A").unwrap();
        let mut done = started(&[Label::C]);
        done.submit_answer("C").unwrap();
        done.advance(fixed_now()).unwrap();

        for session in [&mut fresh, &mut mid, &mut done] {
            let old_id = session.id();
            session.reset();
            assert_eq!(session.state(), SessionState::NotStarted);
            assert_eq!(session.score(), 0);
            assert!(session.answers().is_empty());
            assert!(session.started_at().is_none());
            assert_ne!(session.id(), old_id);

            session.reset();
            assert_eq!(session.state(), SessionState::NotStarted);
        }

        mid.start(vec![build_question(Label::D)], fixed_now())
            .unwrap();
        assert_eq!(mid.questions().len(), 1);
    }

    #[test]
    fn progress_tracks_position() {
        let mut session = started(&[Label::A, Label::B, Label::C]);
        let progress = session.progress();
        assert_eq!((progress.position, progress.total), (1, 3));
        assert_eq!(progress.remaining, 3);

        session.submit_answer("A").unwrap();
        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.score, 1);

        session.advance(fixed_now()).unwrap();
        assert_eq!(session.progress().position, 2);
    }
}
