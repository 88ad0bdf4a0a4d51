//! Answer-key section parser.
//!
//! The answer key sits after a line reading exactly `Answers` and lists one
//! entry per line, e.g. `q32 abd - https://...`. Anything after the letter run
//! is ignored.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::model::AnswerSet;

/// Mapping from question number to its correct letters.
///
/// Numbers without an entry are "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerKey {
    entries: BTreeMap<u32, AnswerSet>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, number: u32) -> Option<&AnswerSet> {
        self.entries.get(&number)
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn insert(&mut self, number: u32, answers: AnswerSet) -> Option<AnswerSet> {
        self.entries.insert(number, answers)
    }

    /// Forget an entry, making that question unknown.
    pub fn remove(&mut self, number: u32) -> Option<AnswerSet> {
        self.entries.remove(&number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AnswerSet)> {
        self.entries.iter().map(|(n, a)| (*n, a))
    }
}

impl FromIterator<(u32, AnswerSet)> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = (u32, AnswerSet)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Result of scanning a text for its answer key.
#[derive(Debug, Clone, Default)]
pub struct ParsedAnswerKey {
    pub key: AnswerKey,
    /// Whether the section marker was present at all.
    pub found_marker: bool,
    /// Non-blank lines after the marker that did not look like an entry.
    pub skipped_lines: usize,
    /// Numbers listed more than once; the last listing was kept.
    pub duplicate_numbers: Vec<u32>,
}

/// Parses the answer-key section of an exam dump.
#[derive(Debug, Clone)]
pub struct AnswerKeyParser {
    marker: String,
    entry: Regex,
}

impl AnswerKeyParser {
    /// `marker` is the exact line that opens the section; `prefix` is the token
    /// glued to the question number on each entry line.
    pub fn new(marker: &str, prefix: &str) -> Result<Self, ExtractError> {
        if marker.trim().is_empty() {
            return Err(ExtractError::EmptyMarker("answer marker"));
        }
        let pattern = format!(r"(?i)^{}(\d+)\s+([a-f]+)", regex::escape(prefix));
        let entry = Regex::new(&pattern).map_err(|source| ExtractError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Self {
            marker: marker.trim().to_string(),
            entry,
        })
    }

    pub fn from_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        Self::new(&config.answer_marker, &config.answer_prefix)
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Scan `text` for the answer key. A missing section yields an empty key
    /// with `found_marker == false`.
    pub fn parse(&self, text: &str) -> ParsedAnswerKey {
        let mut lines = text.lines().map(str::trim);

        if !lines.any(|line| line == self.marker) {
            tracing::warn!("no `{}` section found; all answers will be unknown", self.marker);
            return ParsedAnswerKey::default();
        }

        let mut parsed = ParsedAnswerKey {
            found_marker: true,
            ..Default::default()
        };

        for line in lines.filter(|l| !l.is_empty()) {
            match self.parse_line(line) {
                Some((number, answers)) => {
                    if parsed.key.insert(number, answers).is_some() {
                        tracing::debug!("answer key lists q{number} more than once; keeping the last");
                        parsed.duplicate_numbers.push(number);
                    }
                }
                None => parsed.skipped_lines += 1,
            }
        }

        tracing::debug!(
            "answer key: {} entries, {} skipped lines",
            parsed.key.len(),
            parsed.skipped_lines
        );
        parsed
    }

    fn parse_line(&self, line: &str) -> Option<(u32, AnswerSet)> {
        let caps = self.entry.captures(line)?;
        let number = caps[1].parse::<u32>().ok().filter(|n| *n > 0)?;
        let answers = AnswerSet::parse_run(&caps[2]).ok()?;
        Some((number, answers))
    }
}
