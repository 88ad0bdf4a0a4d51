//! Aggregate statistics over a question bank.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::QuestionRecord;
use crate::validate::{gap_count, number_gaps};

/// Most missing numbers listed individually in [`BankStats::missing_numbers`].
pub const MISSING_LISTED: usize = 1000;

/// Summary counts for a bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BankStats {
    pub total: usize,
    pub with_answers: usize,
    pub single_answer: usize,
    pub multi_answer: usize,
    /// Questions whose answer is unknown, ascending.
    pub unknown: Vec<u32>,
    /// Lowest and highest question number.
    pub number_range: Option<(u32, u32)>,
    /// Numbers inside `number_range` with no question, ascending. Capped at
    /// [`MISSING_LISTED`]; `missing_count` has the full count.
    pub missing_numbers: Vec<u32>,
    pub missing_count: u64,
    /// Choice count → number of questions with that many choices.
    pub choice_histogram: BTreeMap<usize, usize>,
}

impl BankStats {
    pub fn compute(records: &[QuestionRecord]) -> Self {
        let mut stats = BankStats {
            total: records.len(),
            ..Default::default()
        };
        let mut numbers = BTreeSet::new();

        for record in records {
            numbers.insert(record.number());
            *stats.choice_histogram.entry(record.choice_count()).or_insert(0) += 1;
            match record.correct() {
                Some(answers) if answers.len() > 1 => {
                    stats.with_answers += 1;
                    stats.multi_answer += 1;
                }
                Some(_) => {
                    stats.with_answers += 1;
                    stats.single_answer += 1;
                }
                None => stats.unknown.push(record.number()),
            }
        }
        stats.unknown.sort_unstable();
        stats.unknown.dedup();

        if let (Some(&first), Some(&last)) = (numbers.first(), numbers.last()) {
            stats.number_range = Some((first, last));
            let gaps = number_gaps(&numbers);
            stats.missing_count = gap_count(&gaps);
            stats.missing_numbers = gaps
                .iter()
                .flat_map(|&(start, end)| start..=end)
                .take(MISSING_LISTED)
                .collect();
        }

        stats
    }

    /// Share of questions with a known answer, in `[0, 1]`.
    pub fn answered_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.with_answers as f64 / self.total as f64
    }
}
