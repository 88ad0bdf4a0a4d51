//! The extraction pipeline.
//!
//! raw text → answer key (+ overrides) → blocks → records, deduplicated and
//! sorted by question number. Nothing here fails on malformed text: blocks
//! that cannot be parsed are dropped and counted, and data-quality problems
//! are collected as [`ExtractionWarning`]s.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::answer_key::AnswerKeyParser;
use crate::config::{DuplicatePolicy, ExtractConfig};
use crate::error::ExtractError;
use crate::model::QuestionRecord;
use crate::overrides::AnswerOverrides;
use crate::question::QuestionParser;
use crate::segment::QuestionSegmenter;

/// A non-fatal data-quality finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// The text has no answer-key section.
    NoAnswerKey,
    /// More than one block carried this number.
    DuplicateQuestion { number: u32, policy: DuplicatePolicy },
    /// The answer key listed this number more than once.
    DuplicateAnswerEntry { number: u32 },
    /// The answer names a letter the parsed question does not have.
    AnswerLetterNotInOptions { number: u32, answer: String },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::NoAnswerKey => {
                write!(f, "no answer key found; all answers are unknown")
            }
            ExtractionWarning::DuplicateQuestion { number, policy } => {
                write!(f, "question {number} appears more than once ({policy})")
            }
            ExtractionWarning::DuplicateAnswerEntry { number } => {
                write!(f, "answer key lists q{number} more than once; the last entry wins")
            }
            ExtractionWarning::AnswerLetterNotInOptions { number, answer } => write!(
                f,
                "answer {answer} for question {number} names a missing option; left unknown"
            ),
        }
    }
}

/// Counts and findings from one extraction run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    /// The boundary pattern used to segment the text.
    pub pattern: Option<String>,
    /// Blocks produced by segmentation.
    pub blocks_seen: usize,
    /// Numbers of blocks that did not parse into a record.
    pub dropped_blocks: Vec<u32>,
    pub answer_key_found: bool,
    pub answer_entries: usize,
    pub answer_lines_skipped: usize,
    /// Answer-key entries changed by caller overrides.
    pub overrides_applied: usize,
    pub warnings: Vec<ExtractionWarning>,
}

/// Records plus the report describing how they were produced.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Sorted ascending by number; numbers are unique.
    pub records: Vec<QuestionRecord>,
    pub report: ExtractionReport,
}

/// Compiled extraction pipeline.
#[derive(Debug, Clone)]
pub struct Extractor {
    answers: AnswerKeyParser,
    segmenter: QuestionSegmenter,
    parser: QuestionParser,
    duplicate_policy: DuplicatePolicy,
}

impl Extractor {
    pub fn from_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            answers: AnswerKeyParser::from_config(config)?,
            segmenter: QuestionSegmenter::from_config(config)?,
            parser: QuestionParser::from_config(config)?,
            duplicate_policy: config.duplicate_policy,
        })
    }

    /// Run the whole pipeline over `text`.
    pub fn extract(&self, text: &str, overrides: Option<&AnswerOverrides>) -> Extraction {
        let mut report = ExtractionReport::default();

        let parsed = self.answers.parse(text);
        report.answer_key_found = parsed.found_marker;
        report.answer_lines_skipped = parsed.skipped_lines;
        if !parsed.found_marker {
            report.warnings.push(ExtractionWarning::NoAnswerKey);
        }
        report.warnings.extend(
            parsed
                .duplicate_numbers
                .iter()
                .map(|&number| ExtractionWarning::DuplicateAnswerEntry { number }),
        );

        let mut key = parsed.key;
        if let Some(overrides) = overrides {
            report.overrides_applied = overrides.apply_to_key(&mut key);
        }
        report.answer_entries = key.len();

        let segmentation = self.segmenter.segment(text);
        report.pattern = segmentation.pattern;
        report.blocks_seen = segmentation.blocks.len();

        let mut by_number: BTreeMap<u32, QuestionRecord> = BTreeMap::new();
        for block in &segmentation.blocks {
            let Some(record) = self.parser.parse_block(block.number, block.text, &key) else {
                tracing::debug!("dropping block {} at offset {}", block.number, block.offset);
                report.dropped_blocks.push(block.number);
                continue;
            };

            if let Some(answer) = key.get(record.number()) {
                if record.correct().is_none() {
                    report.warnings.push(ExtractionWarning::AnswerLetterNotInOptions {
                        number: record.number(),
                        answer: answer.to_string(),
                    });
                }
            }

            let number = record.number();
            if by_number.contains_key(&number) {
                report.warnings.push(ExtractionWarning::DuplicateQuestion {
                    number,
                    policy: self.duplicate_policy,
                });
                if self.duplicate_policy == DuplicatePolicy::FirstWins {
                    continue;
                }
            }
            by_number.insert(number, record);
        }

        let records: Vec<QuestionRecord> = by_number.into_values().collect();
        tracing::info!(
            "extracted {} questions from {} blocks ({} dropped, {} with answers)",
            records.len(),
            report.blocks_seen,
            report.dropped_blocks.len(),
            records.iter().filter(|r| r.correct().is_some()).count()
        );

        Extraction { records, report }
    }
}

/// Convenience wrapper: extract with the default configuration.
pub fn extract_questions(
    text: &str,
    overrides: Option<&AnswerOverrides>,
) -> Result<Extraction, ExtractError> {
    Ok(Extractor::from_config(&ExtractConfig::default())?.extract(text, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAM: &str = "\
SnowPro Practice
Question #1 Topic 1
Which object stores data?
A. Table
B. Warehouse
Question #2 Topic 1
Select two features.
A. Time Travel
B. Fail-safe
C. Spreadsheets
Question #3 Topic 2
This block has no lettered options at all.
Question #4 Topic 2
Which letter is missing?
A. one
B. two
Answers
q1 a
q2 ab
q4 e
q2 b
";

    fn extractor() -> Extractor {
        Extractor::from_config(&ExtractConfig::default()).unwrap()
    }

    #[test]
    fn extracts_records_and_report() {
        let extraction = extractor().extract(EXAM, None);
        let numbers: Vec<u32> = extraction.records.iter().map(|r| r.number()).collect();
        assert_eq!(numbers, vec![1, 2, 4]);

        let q1 = &extraction.records[0];
        assert_eq!(q1.prompt(), "Which object stores data?");
        assert_eq!(q1.correct().unwrap().to_string(), "A");

        // The later answer-key line wins.
        assert_eq!(extraction.records[1].correct().unwrap().to_string(), "B");

        let report = &extraction.report;
        assert_eq!(report.blocks_seen, 4);
        assert_eq!(report.dropped_blocks, vec![3]);
        assert!(report.answer_key_found);
        assert_eq!(report.answer_entries, 3);
        assert!(report
            .warnings
            .contains(&ExtractionWarning::DuplicateAnswerEntry { number: 2 }));
        assert!(report
            .warnings
            .contains(&ExtractionWarning::AnswerLetterNotInOptions {
                number: 4,
                answer: "E".into()
            }));
        assert!(extraction.records[2].correct().is_none());
    }

    #[test]
    fn no_answer_key_means_all_unknown() {
        let text = "Question #1\nQ?\nA. x\nB. y\nQuestion #2\nQ2?\nA. z\n";
        let extraction = extractor().extract(text, None);
        assert_eq!(extraction.records.len(), 2);
        assert!(extraction.records.iter().all(|r| r.correct().is_none()));
        assert_eq!(extraction.report.warnings, vec![ExtractionWarning::NoAnswerKey]);
    }

    #[test]
    fn overrides_patch_the_key() {
        let overrides = AnswerOverrides::parse_str("unknown = [1]\n[answers]\n4 = \"b\"\n").unwrap();
        let extraction = extractor().extract(EXAM, Some(&overrides));
        assert!(extraction.records[0].correct().is_none());
        assert_eq!(extraction.records[2].correct().unwrap().to_string(), "B");
        assert_eq!(extraction.report.overrides_applied, 2);
    }

    #[test]
    fn duplicate_blocks_last_wins_by_default() {
        let text = "Question #5\nOld?\nA. old\nQuestion #5\nNew?\nA. new\n";
        let extraction = extractor().extract(text, None);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].prompt(), "New?");
        assert!(extraction
            .report
            .warnings
            .contains(&ExtractionWarning::DuplicateQuestion {
                number: 5,
                policy: DuplicatePolicy::LastWins
            }));
    }

    #[test]
    fn duplicate_blocks_first_wins() {
        let config = ExtractConfig {
            duplicate_policy: DuplicatePolicy::FirstWins,
            ..Default::default()
        };
        let text = "Question #5\nOld?\nA. old\nQuestion #5\nNew?\nA. new\n";
        let extraction = Extractor::from_config(&config).unwrap().extract(text, None);
        assert_eq!(extraction.records[0].prompt(), "Old?");
    }

    #[test]
    fn output_is_sorted_even_when_text_is_not() {
        let text = "Question #9\nNine?\nA. x\nQuestion #2\nTwo?\nA. y\n";
        let numbers: Vec<u32> = extractor()
            .extract(text, None)
            .records
            .iter()
            .map(|r| r.number())
            .collect();
        assert_eq!(numbers, vec![2, 9]);
    }

    #[test]
    fn every_record_upholds_invariants() {
        let extraction = extractor().extract(EXAM, None);
        for record in &extraction.records {
            assert!(record.choice_count() >= 1);
            assert_eq!(record.choice_count(), record.options().len());
            if let Some(answers) = record.correct() {
                assert!(answers.iter().all(|l| record.option(l).is_some()));
            }
        }
    }

    #[test]
    fn empty_input() {
        let extraction = extract_questions("", None).unwrap();
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.report.blocks_seen, 0);
    }
}
