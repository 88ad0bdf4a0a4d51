//! Error types for the extraction core.
//!
//! Malformed exam text never produces one of these: the pipeline drops what it
//! cannot parse and reports it as a warning. These errors cover bad
//! configuration, invalid records, and invalid answer overrides.

use thiserror::Error;

use crate::model::OptionLetter;

/// Errors raised while building an [`Extractor`](crate::pipeline::Extractor)
/// from its configuration.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A configured regular expression failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A question boundary pattern has no group capturing the question number.
    #[error("boundary pattern `{0}` must have exactly one capture group for the question number")]
    MissingCaptureGroup(String),

    /// No question boundary patterns were configured.
    #[error("at least one question boundary pattern is required")]
    NoBoundaryPatterns,

    /// A marker or label that must be non-empty was empty.
    #[error("{0} must not be empty")]
    EmptyMarker(&'static str),
}

/// Violations of the [`QuestionRecord`](crate::model::QuestionRecord) invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("question number must be positive")]
    ZeroNumber,

    #[error("question {0}: prompt is empty")]
    EmptyPrompt(u32),

    #[error("question {0}: no options")]
    NoOptions(u32),

    #[error("question {number}: option {letter} has empty text")]
    EmptyOption { number: u32, letter: OptionLetter },

    #[error("question {number}: answer {letter} is not among the options")]
    AnswerNotInOptions { number: u32, letter: OptionLetter },

    #[error("an answer set must contain at least one letter")]
    EmptyAnswerSet,

    #[error("invalid option letter: {0:?}")]
    InvalidLetter(String),
}

/// Errors in a caller-supplied answer override file.
#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("override key `{0}` is not a question number")]
    InvalidNumber(String),

    #[error("override for question {number}: {source}")]
    InvalidAnswer {
        number: u32,
        #[source]
        source: RecordError,
    },

    #[error("question {0} is both overridden and forced unknown")]
    Conflict(u32),
}
