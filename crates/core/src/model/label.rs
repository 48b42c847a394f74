use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when reading a label from user or generated input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("invalid option label: {0:?}")]
    Invalid(String),
}

/// One of the four letters identifying an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    A,
    B,
    C,
    D,
}

impl Label {
    /// Canonical order used when labels are reassigned.
    pub const ALL: [Label; 4] = [Label::A, Label::B, Label::C, Label::D];

    /// Accepts `a`–`d` in either case.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Label::A => 'A',
            Label::B => 'B',
            Label::C => 'C',
            Label::D => 'D',
        }
    }

    /// Zero-based position of this label in canonical order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Label::A => 0,
            Label::B => 1,
            Label::C => 2,
            Label::D => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Label {
    type Err = LabelError;

    /// Parses a bare letter, optionally followed by an option delimiter (`b`, `B)`, ` c. `).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let label = chars.next().and_then(Label::from_char);
        let rest = chars.as_str().trim();
        match label {
            Some(label) if rest.is_empty() || matches!(rest, ")" | "." | ":") => Ok(label),
            _ => Err(LabelError::Invalid(trimmed.to_string())),
        }
    }
}
