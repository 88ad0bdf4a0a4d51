//! examkit-core: exam text to structured question bank.
//!
//! Turns the plain text of a multiple-choice exam dump (questions followed by
//! an `Answers` section) into validated [`QuestionRecord`]s.

pub mod answer_key;
pub mod bank;
pub mod config;
pub mod error;
pub mod model;
pub mod overrides;
pub mod pipeline;
pub mod question;
pub mod segment;
pub mod statistics;
pub mod validate;

pub use answer_key::{AnswerKey, AnswerKeyParser, ParsedAnswerKey};
pub use bank::{load_bank, read_text_lossy, save_bank};
pub use config::{load_config, load_config_from, DuplicatePolicy, ExtractConfig};
pub use error::{ExtractError, OverrideError, RecordError};
pub use model::{AnswerSet, OptionLetter, QuestionRecord};
pub use overrides::{AnswerOverrides, PatchMode, PatchOutcome};
pub use pipeline::{extract_questions, Extraction, ExtractionReport, ExtractionWarning, Extractor};
pub use question::QuestionParser;
pub use segment::{Block, QuestionSegmenter, Segmentation};
pub use statistics::BankStats;
pub use validate::{validate_bank, ValidationWarning};
