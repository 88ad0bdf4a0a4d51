//! Data-quality checks over a question bank.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::model::{OptionLetter, QuestionRecord};

/// A validation warning (not a fatal error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    /// The question number (if applicable).
    pub number: Option<u32>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(number: u32, message: impl Into<String>) -> Self {
        Self {
            number: Some(number),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "q{n}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Validate a bank for common issues.
pub fn validate_bank(records: &[QuestionRecord]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate numbers
    let mut seen = BTreeSet::new();
    for record in records {
        if !seen.insert(record.number()) {
            warnings.push(ValidationWarning::question(
                record.number(),
                format!("duplicate question number: {}", record.number()),
            ));
        }
    }

    for record in records {
        let number = record.number();

        match record.correct() {
            None => warnings.push(ValidationWarning::question(number, "answer is unknown")),
            Some(answers) if answers.len() == record.choice_count() && record.choice_count() > 1 => {
                warnings.push(ValidationWarning::question(
                    number,
                    format!("every option is marked correct ({answers})"),
                ));
            }
            Some(_) => {}
        }

        // Options should be a contiguous run starting at A.
        let missing: Vec<String> = record
            .options()
            .keys()
            .next_back()
            .map(|last| {
                OptionLetter::ALL[..=last.index()]
                    .iter()
                    .filter(|l| record.option(**l).is_none())
                    .map(|l| l.to_string())
                    .collect()
            })
            .unwrap_or_default();
        if !missing.is_empty() {
            warnings.push(ValidationWarning::question(
                number,
                format!("option letters skip {}", missing.join(", ")),
            ));
        }
    }

    // Gaps in the number sequence
    if let (Some(&first), Some(&last)) = (seen.first(), seen.last()) {
        let gaps = number_gaps(&seen);
        if !gaps.is_empty() {
            warnings.push(ValidationWarning {
                number: None,
                message: format!(
                    "{} question number(s) missing between {first} and {last}: {}",
                    gap_count(&gaps),
                    format_ranges(&gaps)
                ),
            });
        }
    }

    warnings
}

/// Inclusive runs of numbers absent between consecutive members of `numbers`.
///
/// The result has at most one entry per member, however wide the gaps are.
pub fn number_gaps(numbers: &BTreeSet<u32>) -> Vec<(u32, u32)> {
    numbers
        .iter()
        .zip(numbers.iter().skip(1))
        .filter(|(lo, hi)| **hi - **lo > 1)
        .map(|(lo, hi)| (lo + 1, hi - 1))
        .collect()
}

/// Total count of numbers covered by `ranges`.
pub fn gap_count(ranges: &[(u32, u32)]) -> u64 {
    ranges
        .iter()
        .map(|(start, end)| u64::from(end - start) + 1)
        .sum()
}

/// Compact listing such as `3, 7-9, 12`.
pub fn format_numbers(numbers: &[u32]) -> String {
    let mut ranges: Vec<(u32, u32)> = Vec::new();
    let mut iter = numbers.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while let Some(next) = end.checked_add(1) {
            if iter.peek() != Some(&next) {
                break;
            }
            end = next;
            iter.next();
        }
        ranges.push((start, end));
    }
    format_ranges(&ranges)
}

/// Render inclusive ranges as `3, 7-9, 12`.
pub fn format_ranges(ranges: &[(u32, u32)]) -> String {
    ranges
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
