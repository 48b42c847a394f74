//! Parser for generated question text.
//!
//! A generated block is read line by line. Each line is classified by its leading marker
//! and fed to a small automaton:
//!
//! ```text
//! SeekingQuestion --question--> SeekingOptions --option--> SeekingCorrectLabel
//!     --correct answer--> SeekingExplanation
//! ```
//!
//! Recognised markers (case-insensitive, surrounding markdown emphasis ignored):
//!
//! ```text
//! Question: ...            (also "Pregunta", optionally numbered: "**Pregunta 1:**")
//! A) ...  B. ...  c: ...   (one letter A-D plus a delimiter)
//! Correct answer: B        (also "Answer", "Respuesta correcta")
//! Explanation: ...         (also "Explicación", "Justification", "Justificación")
//! ```
//!
//! Unmarked lines continue the open field: question and explanation text are joined with
//! a single space, an unmarked line among the options extends the last option.

use std::fmt;

use thiserror::Error;

use crate::model::{AnswerOption, Label, Question, QuestionError};

const QUESTION_MARKERS: [&str; 2] = ["question", "pregunta"];
const CORRECT_MARKERS: [&str; 4] = ["correct answer", "respuesta correcta", "answer", "respuesta"];
const EXPLANATION_MARKERS: [&str; 6] = [
    "explanation",
    "explicación",
    "explicacion",
    "justification",
    "justificación",
    "justificacion",
];

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Why a generated block was rejected. Never accompanied by a partial question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseFailure {
    #[error("no question marker found")]
    MissingQuestion,

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("expected 4 options, found {found}")]
    OptionCount { found: usize },

    #[error("option {0} appears more than once")]
    DuplicateLabel(Label),

    #[error("option {0} has no text")]
    EmptyOption(Label),

    #[error("no correct answer given")]
    MissingCorrectLabel,

    #[error("correct answer {0:?} does not name one of the options")]
    UnknownCorrectLabel(String),

    #[error("explanation is empty")]
    MissingExplanation,

    #[error("line {line}: unexpected {found} marker while {state}")]
    UnexpectedMarker {
        line: usize,
        found: MarkerKind,
        state: ScanState,
    },
}

impl From<QuestionError> for ParseFailure {
    fn from(err: QuestionError) -> Self {
        match err {
            QuestionError::EmptyText => Self::EmptyQuestion,
            QuestionError::EmptyOption(label) => Self::EmptyOption(label),
            QuestionError::DuplicateLabel(label) => Self::DuplicateLabel(label),
            QuestionError::EmptyExplanation => Self::MissingExplanation,
        }
    }
}

//
// ─── LINE CLASSIFICATION ──────────────────────────────────────────────────────
//

/// Kind of marker that opened a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Question,
    Option,
    CorrectAnswer,
    Explanation,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarkerKind::Question => "question",
            MarkerKind::Option => "option",
            MarkerKind::CorrectAnswer => "correct-answer",
            MarkerKind::Explanation => "explanation",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Plain(&'a str),
    Question(&'a str),
    Option(Label, &'a str),
    CorrectAnswer(&'a str),
    Explanation(&'a str),
}

impl Line<'_> {
    fn marker(&self) -> Option<MarkerKind> {
        match self {
            Line::Blank | Line::Plain(_) => None,
            Line::Question(_) => Some(MarkerKind::Question),
            Line::Option(..) => Some(MarkerKind::Option),
            Line::CorrectAnswer(_) => Some(MarkerKind::CorrectAnswer),
            Line::Explanation(_) => Some(MarkerKind::Explanation),
        }
    }
}

fn is_decoration(c: char) -> bool {
    matches!(c, '*' | '_' | '#' | '>' | '-') || c.is_whitespace()
}

fn strip_decoration(s: &str) -> &str {
    s.trim_start_matches(is_decoration)
}

fn clean_value(s: &str) -> &str {
    s.trim_start_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
        .trim_end_matches('*')
        .trim()
}

/// Strips `keyword` (ASCII case-insensitive) and the `:` that must follow it.
fn strip_keyword<'a>(body: &'a str, keyword: &str, numbered: bool) -> Option<&'a str> {
    let head = body.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let mut rest = body[keyword.len()..].trim_start_matches(|c: char| c == '*' || c == '_');
    if numbered {
        rest = rest.trim_start().trim_start_matches(|c: char| c.is_ascii_digit());
    }
    let rest = rest
        .trim_start_matches(|c: char| c == '*' || c == '_')
        .trim_start();
    rest.strip_prefix(':').map(clean_value)
}

fn strip_any<'a>(body: &'a str, keywords: &[&str], numbered: bool) -> Option<&'a str> {
    keywords
        .iter()
        .find_map(|keyword| strip_keyword(body, keyword, numbered))
}

fn strip_option(body: &str) -> Option<(Label, &str)> {
    let mut chars = body.chars();
    let label = chars.next().and_then(Label::from_char)?;
    let rest = chars.as_str();
    let rest = rest
        .strip_prefix(')')
        .or_else(|| rest.strip_prefix('.'))
        .or_else(|| rest.strip_prefix(':'))?;
    Some((label, clean_value(rest)))
}

fn classify(raw: &str) -> Line<'_> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    let body = strip_decoration(trimmed);

    if let Some(text) = strip_any(body, &QUESTION_MARKERS, true) {
        return Line::Question(text);
    }
    if let Some(text) = strip_any(body, &CORRECT_MARKERS, false) {
        return Line::CorrectAnswer(text);
    }
    if let Some(text) = strip_any(body, &EXPLANATION_MARKERS, false) {
        return Line::Explanation(text);
    }
    if let Some((label, text)) = strip_option(body) {
        return Line::Option(label, text);
    }
    Line::Plain(trimmed)
}

/// Reads the label named after a correct-answer marker: `B`, `b)`, `**B**`, `B) Network`.
fn read_correct_label(value: &str) -> Result<Label, String> {
    let body = value.trim_start_matches(|c: char| is_decoration(c) || c == '(');
    let mut chars = body.chars();
    let label = chars.next().and_then(Label::from_char);
    let next = chars.next();
    match label {
        Some(label) if next.is_none_or(|c| !c.is_alphanumeric()) => Ok(label),
        _ => Err(value.to_string()),
    }
}

//
// ─── AUTOMATON ────────────────────────────────────────────────────────────────
//

/// Scanner state; each names the field the scanner is waiting to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    SeekingQuestion,
    SeekingOptions,
    SeekingCorrectLabel,
    SeekingExplanation,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScanState::SeekingQuestion => "seeking the question",
            ScanState::SeekingOptions => "seeking options",
            ScanState::SeekingCorrectLabel => "seeking the correct answer",
            ScanState::SeekingExplanation => "seeking the explanation",
        })
    }
}

struct Scanner {
    state: ScanState,
    question: String,
    options: Vec<(Label, String)>,
    correct: Option<Result<Label, String>>,
    explanation: Option<String>,
}

fn join(field: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !field.is_empty() {
        field.push(' ');
    }
    field.push_str(text);
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: ScanState::SeekingQuestion,
            question: String::new(),
            options: Vec::new(),
            correct: None,
            explanation: None,
        }
    }

    fn feed(&mut self, line_no: usize, line: Line<'_>) -> Result<(), ParseFailure> {
        let unexpected = |state: ScanState, line: &Line<'_>| ParseFailure::UnexpectedMarker {
            line: line_no,
            found: line.marker().unwrap_or(MarkerKind::Question),
            state,
        };

        match (self.state, line) {
            (_, Line::Blank) => {}

            (ScanState::SeekingQuestion, Line::Plain(_)) => {}
            (ScanState::SeekingQuestion, Line::Question(text)) => {
                join(&mut self.question, text);
                self.state = ScanState::SeekingOptions;
            }

            (ScanState::SeekingOptions, Line::Plain(text)) => join(&mut self.question, text),
            (ScanState::SeekingOptions | ScanState::SeekingCorrectLabel, Line::Option(label, text)) => {
                self.options.push((label, text.to_string()));
                self.state = ScanState::SeekingCorrectLabel;
            }

            (ScanState::SeekingCorrectLabel, Line::Plain(text)) => {
                if let Some((_, last)) = self.options.last_mut() {
                    join(last, text);
                }
            }
            (ScanState::SeekingCorrectLabel, Line::CorrectAnswer(value)) => {
                self.correct = Some(read_correct_label(value));
                self.state = ScanState::SeekingExplanation;
            }

            (ScanState::SeekingExplanation, Line::Plain(text)) => {
                if let Some(explanation) = self.explanation.as_mut() {
                    join(explanation, text);
                }
            }
            (ScanState::SeekingExplanation, Line::Explanation(text)) if self.explanation.is_none() => {
                self.explanation = Some(text.to_string());
            }

            (state, other) => return Err(unexpected(state, &other)),
        }
        Ok(())
    }

    fn finish(self) -> Result<Question, ParseFailure> {
        if self.state == ScanState::SeekingQuestion {
            return Err(ParseFailure::MissingQuestion);
        }
        if self.question.trim().is_empty() {
            return Err(ParseFailure::EmptyQuestion);
        }
        if self.options.len() != 4 {
            return Err(ParseFailure::OptionCount {
                found: self.options.len(),
            });
        }
        let correct = match self.correct {
            None => return Err(ParseFailure::MissingCorrectLabel),
            Some(Err(raw)) => return Err(ParseFailure::UnknownCorrectLabel(raw)),
            Some(Ok(label)) => label,
        };
        if !self.options.iter().any(|(label, _)| *label == correct) {
            return Err(ParseFailure::UnknownCorrectLabel(correct.to_string()));
        }

        let options: Vec<AnswerOption> = self
            .options
            .into_iter()
            .map(|(label, text)| AnswerOption::new(label, text))
            .collect();
        let options: [AnswerOption; 4] = options
            .try_into()
            .map_err(|rest: Vec<AnswerOption>| ParseFailure::OptionCount { found: rest.len() })?;

        let explanation = self.explanation.unwrap_or_default();
        Ok(Question::new(self.question, options, correct, explanation)?)
    }
}

//
// ─── ENTRY POINTS ─────────────────────────────────────────────────────────────
//

/// Parse one generated block into a validated question.
///
/// # Errors
///
/// Returns `ParseFailure` if any required field is missing or malformed, or if markers
/// appear out of order.
pub fn parse(raw: &str) -> Result<Question, ParseFailure> {
    let mut scanner = Scanner::new();
    for (index, line) in raw.lines().enumerate() {
        scanner.feed(index + 1, classify(line))?;
    }
    scanner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTING: &str = "\
Question: What layer handles routing?
A) Physical
B) Network
C) Session
D) Application
Correct answer: B
Explanation: Routing is a Network-layer function.";

    #[test]
    fn parses_well_formed_block() {
        let q = parse(ROUTING).unwrap();
        assert_eq!(q.text(), "What layer handles routing?");
        let texts: Vec<_> = q.options().iter().map(AnswerOption::text).collect();
        assert_eq!(texts, ["Physical", "Network", "Session", "Application"]);
        assert_eq!(q.correct(), Label::B);
        assert_eq!(q.explanation(), "Routing is a Network-layer function.");
    }

    #[test]
    fn accepts_markdown_and_spanish_markers() {
        let raw = "\
Aquí tienes la pregunta:

**Pregunta 1:** ¿Qué capa se encarga del enrutamiento?
a) Física
b) Red
c) Sesión
d) Aplicación
**Respuesta Correcta:** b
**Explicación:** El enrutamiento ocurre en la capa de red.";
        let q = parse(raw).unwrap();
        assert_eq!(q.text(), "¿Qué capa se encarga del enrutamiento?");
        assert_eq!(q.correct(), Label::B);
        assert_eq!(q.options()[3].label(), Label::D);
        assert_eq!(q.correct_text(), "Red");
    }

    #[test]
    fn explanation_continues_across_lines() {
        let raw = format!("{ROUTING}\nRouters forward packets\n\n  using IP addresses.");
        let q = parse(&raw).unwrap();
        assert_eq!(
            q.explanation(),
            "Routing is a Network-layer function. Routers forward packets using IP addresses."
        );
    }

    #[test]
    fn question_and_option_continuations() {
        let raw = "\
Question:
Which device
forwards frames?
A) Hub
B) Switch
   (layer 2)
C) Repeater
D) Modem
Answer: B) Switch
Justification: Switches forward frames by MAC address.";
        let q = parse(raw).unwrap();
        assert_eq!(q.text(), "Which device forwards frames?");
        assert_eq!(q.options()[1].text(), "Switch (layer 2)");
        assert_eq!(q.correct(), Label::B);
    }

    #[test]
    fn correct_label_variants() {
        assert_eq!(read_correct_label("b"), Ok(Label::B));
        assert_eq!(read_correct_label("**C**"), Ok(Label::C));
        assert_eq!(read_correct_label("(D)"), Ok(Label::D));
        assert_eq!(read_correct_label("A. Physical"), Ok(Label::A));
        assert!(read_correct_label("Option B").is_err());
        assert!(read_correct_label("E").is_err());
    }

    #[test]
    fn rejects_missing_question() {
        assert_eq!(parse(""), Err(ParseFailure::MissingQuestion));
        assert_eq!(
            parse("just some prose\nwith no markers"),
            Err(ParseFailure::MissingQuestion)
        );
        let raw = ROUTING.replace("What layer handles routing?", "");
        assert_eq!(parse(&raw), Err(ParseFailure::EmptyQuestion));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let three = ROUTING.replace("D) Application\n", "");
        assert_eq!(parse(&three), Err(ParseFailure::OptionCount { found: 3 }));

        let five = ROUTING.replace("D) Application", "D) Application\nA) Transport");
        assert_eq!(parse(&five), Err(ParseFailure::OptionCount { found: 5 }));
    }

    #[test]
    fn rejects_duplicate_label() {
        let raw = ROUTING.replace("C) Session", "B) Session");
        assert_eq!(parse(&raw), Err(ParseFailure::DuplicateLabel(Label::B)));
    }

    #[test]
    fn rejects_empty_option_text() {
        let raw = ROUTING.replace("C) Session", "C)");
        assert_eq!(parse(&raw), Err(ParseFailure::EmptyOption(Label::C)));
    }

    #[test]
    fn rejects_bad_correct_label() {
        let raw = ROUTING.replace("Correct answer: B", "Correct answer: E");
        assert!(matches!(parse(&raw), Err(ParseFailure::UnknownCorrectLabel(_))));

        let missing = ROUTING.replace("Correct answer: B\n", "");
        assert!(matches!(
            parse(&missing),
            Err(ParseFailure::UnexpectedMarker {
                found: MarkerKind::Explanation,
                state: ScanState::SeekingCorrectLabel,
                ..
            })
        ));

        let truncated = ROUTING.split("Correct answer").next().unwrap_or_default();
        assert_eq!(parse(truncated), Err(ParseFailure::MissingCorrectLabel));
    }

    #[test]
    fn rejects_correct_label_absent_from_options() {
        let raw = "\
Question: Q?
A) one
B) two
C) three
C) four
Correct answer: D
Explanation: E";
        assert_eq!(parse(raw), Err(ParseFailure::UnknownCorrectLabel("D".into())));
    }

    #[test]
    fn rejects_missing_explanation() {
        let raw = ROUTING.replace("Explanation: Routing is a Network-layer function.", "");
        assert_eq!(parse(&raw), Err(ParseFailure::MissingExplanation));

        let blank = ROUTING.replace("Routing is a Network-layer function.", "");
        assert_eq!(parse(&blank), Err(ParseFailure::MissingExplanation));
    }

    #[test]
    fn rejects_out_of_order_markers() {
        let raw = "Correct answer: B\nQuestion: Q?";
        assert_eq!(
            parse(raw),
            Err(ParseFailure::UnexpectedMarker {
                line: 1,
                found: MarkerKind::CorrectAnswer,
                state: ScanState::SeekingQuestion,
            })
        );

        let two = format!("{ROUTING}\n{ROUTING}");
        assert!(matches!(
            parse(&two),
            Err(ParseFailure::UnexpectedMarker {
                line: 8,
                found: MarkerKind::Question,
                ..
            })
        ));
    }
}
