//! Caller-supplied answer corrections.
//!
//! Answer keys scraped from PDFs come with OCR-garbled lines and answers the
//! community disputes. An overrides file patches the derived key:
//!
//! ```toml
//! unknown = [353]
//!
//! [answers]
//! 278 = "def"
//! 364 = "BDF"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::answer_key::AnswerKey;
use crate::error::{OverrideError, RecordError};
use crate::model::{AnswerSet, QuestionRecord};

#[derive(Debug, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    answers: BTreeMap<String, String>,
    #[serde(default)]
    unknown: Vec<u32>,
}

/// Per-question answer replacements. `None` forces the answer to unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerOverrides {
    entries: BTreeMap<u32, Option<AnswerSet>>,
}

/// How overrides treat records that already have an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatchMode {
    /// Every overridden question takes the override.
    #[default]
    Replace,
    /// Only questions whose answer is unknown are filled.
    FillMissing,
}

/// Result of [`AnswerOverrides::apply_to_records`].
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub records: Vec<QuestionRecord>,
    /// Questions whose answer changed.
    pub changed: Vec<u32>,
    /// Overridden numbers with no record in the bank.
    pub not_found: Vec<u32>,
    /// Overrides that do not fit the record's options.
    pub rejected: Vec<(u32, RecordError)>,
}

impl AnswerOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, number: u32, answers: Option<AnswerSet>) {
        self.entries.insert(number, answers);
    }

    pub fn get(&self, number: u32) -> Option<&Option<AnswerSet>> {
        self.entries.get(&number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<&AnswerSet>)> {
        self.entries.iter().map(|(n, a)| (*n, a.as_ref()))
    }

    /// Load overrides from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read overrides file: {}", path.display()))?;
        Self::parse_str(&content)
            .with_context(|| format!("invalid overrides file: {}", path.display()))
    }

    /// Parse overrides from a TOML string.
    pub fn parse_str(content: &str) -> Result<Self> {
        let file: OverrideFile = toml::from_str(content).context("failed to parse overrides TOML")?;
        Ok(Self::from_file(file)?)
    }

    fn from_file(file: OverrideFile) -> Result<Self, OverrideError> {
        let mut overrides = Self::new();
        for (key, run) in file.answers {
            let number = key
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| OverrideError::InvalidNumber(key.clone()))?;
            let answers = AnswerSet::parse_run(&run)
                .map_err(|source| OverrideError::InvalidAnswer { number, source })?;
            overrides.set(number, Some(answers));
        }
        for number in file.unknown {
            if overrides.get(number).is_some() {
                return Err(OverrideError::Conflict(number));
            }
            overrides.set(number, None);
        }
        Ok(overrides)
    }

    /// Patch a parsed answer key in place. Returns how many entries changed.
    pub fn apply_to_key(&self, key: &mut AnswerKey) -> usize {
        let mut changed = 0;
        for (number, answers) in &self.entries {
            let before = key.get(*number).cloned();
            match answers {
                Some(answers) => {
                    key.insert(*number, answers.clone());
                }
                None => {
                    key.remove(*number);
                }
            }
            if before.as_ref() != key.get(*number) {
                tracing::debug!("override changed answer for q{number}");
                changed += 1;
            }
        }
        changed
    }

    /// Patch an existing bank, producing new records.
    pub fn apply_to_records(&self, records: &[QuestionRecord], mode: PatchMode) -> PatchOutcome {
        let mut changed = Vec::new();
        let mut rejected = Vec::new();
        let mut seen = BTreeSet::new();

        let records: Vec<QuestionRecord> = records
            .iter()
            .map(|record| {
                let Some(answers) = self.entries.get(&record.number()) else {
                    return record.clone();
                };
                seen.insert(record.number());

                let applies = match mode {
                    PatchMode::Replace => record.correct() != answers.as_ref(),
                    PatchMode::FillMissing => record.correct().is_none() && answers.is_some(),
                };
                if !applies {
                    return record.clone();
                }

                match record.with_correct(answers.clone()) {
                    Ok(patched) => {
                        changed.push(record.number());
                        patched
                    }
                    Err(e) => {
                        tracing::warn!("override for q{} rejected: {e}", record.number());
                        rejected.push((record.number(), e));
                        record.clone()
                    }
                }
            })
            .collect();

        let not_found = self
            .entries
            .keys()
            .filter(|n| !seen.contains(*n))
            .copied()
            .collect();

        PatchOutcome {
            records,
            changed,
            not_found,
            rejected,
        }
    }
}
