//! Per-block question parsing.
//!
//! A block looks roughly like:
//!
//! ```text
//! Topic 1
//! Which statement about micro-partitions is true?
//! A. They are immutable.
//! B. They are 16 MB
//!    uncompressed.
//! C. ...
//! ```
//!
//! The prompt is everything before the first line starting with `A` plus a
//! separator; each option runs until the next lettered line.

use std::collections::BTreeMap;

use regex::Regex;

use crate::answer_key::AnswerKey;
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::model::{OptionLetter, QuestionRecord};

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
pub struct QuestionParser {
    header: Regex,
    first_option: Regex,
    option_marker: Regex,
    trailing_option: Regex,
}

impl QuestionParser {
    /// `section_label` names the header stripped from the start of each block
    /// (`Topic` strips `Topic 3`).
    pub fn new(section_label: &str) -> Result<Self, ExtractError> {
        if section_label.trim().is_empty() {
            return Err(ExtractError::EmptyMarker("section label"));
        }
        Ok(Self {
            header: compile(&format!(
                r"^\s*{}\s+\d+\s+",
                regex::escape(section_label.trim())
            ))?,
            first_option: compile(r"(?m)^[ \t]*A(?:[.:]|[ \t\r]|$)")?,
            option_marker: compile(r"(?m)^[ \t]*([A-F])(?:[.:]|[ \t\r]|$)")?,
            trailing_option: compile(r"\s+[A-F][.:].*$")?,
        })
    }

    pub fn from_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        Self::new(&config.section_label)
    }

    /// Parse one block into a record. Returns `None` when the block has no
    /// option `A`, no prompt, or no option with text.
    ///
    /// Answers naming a letter the block does not have are dropped, leaving
    /// the record's answer unknown.
    pub fn parse_block(
        &self,
        number: u32,
        text: &str,
        answers: &AnswerKey,
    ) -> Option<QuestionRecord> {
        let body = match self.header.find(text) {
            Some(m) => &text[m.end()..],
            None => text,
        };
        let body = body.trim_start();

        // The first line is always prompt text, even when it reads "A company ...".
        let start = self
            .first_option
            .find_iter(body)
            .map(|m| m.start())
            .find(|&pos| pos > 0)?;

        let prompt = normalize_whitespace(&body[..start]);
        if prompt.is_empty() {
            tracing::debug!("block {number}: empty prompt");
            return None;
        }

        let options = self.split_options(&body[start..]);
        if options.is_empty() {
            tracing::debug!("block {number}: no option text");
            return None;
        }

        let correct = answers.get(number).and_then(|answers| {
            if answers.iter().all(|l| options.contains_key(&l)) {
                Some(answers.clone())
            } else {
                tracing::debug!("block {number}: answer {answers} names a missing option");
                None
            }
        });
        QuestionRecord::new(number, prompt, options, correct).ok()
    }

    /// Split the option section at lettered line starts. Letters must ascend;
    /// a lower or repeated letter at a line start stays part of the current
    /// option's text.
    fn split_options(&self, section: &str) -> BTreeMap<OptionLetter, String> {
        let mut markers: Vec<(OptionLetter, usize, usize)> = Vec::new();
        for caps in self.option_marker.captures_iter(section) {
            let (Some(whole), Some(letter)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(letter) = letter.as_str().chars().next().and_then(OptionLetter::from_char)
            else {
                continue;
            };
            if markers.last().is_some_and(|(prev, _, _)| letter <= *prev) {
                continue;
            }
            markers.push((letter, whole.start(), whole.end()));
        }

        let mut options = BTreeMap::new();
        for (i, (letter, _, text_start)) in markers.iter().enumerate() {
            let text_end = markers.get(i + 1).map_or(section.len(), |(_, start, _)| *start);
            let text = normalize_whitespace(&section[*text_start..text_end]);
            let text = self.trailing_option.replace(&text, "").into_owned();
            if !text.is_empty() {
                options.insert(*letter, text);
            }
        }
        options
    }
}

fn compile(pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|source| ExtractError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerSet;

    fn parser() -> QuestionParser {
        QuestionParser::new("Topic").unwrap()
    }

    fn no_answers() -> AnswerKey {
        AnswerKey::new()
    }

    fn text_of(record: &QuestionRecord, letter: OptionLetter) -> &str {
        record.option(letter).unwrap()
    }

    #[test]
    fn parses_topic_block() {
        let record = parser()
            .parse_block(3, "Topic 3\nWhat is X?\nA. foo\nB. bar\n", &no_answers())
            .unwrap();
        assert_eq!(record.prompt(), "What is X?");
        assert_eq!(record.choice_count(), 2);
        assert_eq!(text_of(&record, OptionLetter::A), "foo");
        assert_eq!(text_of(&record, OptionLetter::B), "bar");
        assert!(record.correct().is_none());
    }

    #[test]
    fn header_on_marker_line() {
        let record = parser()
            .parse_block(1, " Topic 1\nWhich one?\nA: yes\nB: no\n", &no_answers())
            .unwrap();
        assert_eq!(record.prompt(), "Which one?");
        assert_eq!(text_of(&record, OptionLetter::A), "yes");
    }

    #[test]
    fn multiline_prompt_and_options_are_normalized() {
        let text = "\nA company stores\n   data in   stages.\nWhat should it use?\n\
                    A. Internal\n   stages\nB.   External stages\nC. Both\n";
        let record = parser().parse_block(9, text, &no_answers()).unwrap();
        assert_eq!(
            record.prompt(),
            "A company stores data in stages. What should it use?"
        );
        assert_eq!(text_of(&record, OptionLetter::A), "Internal stages");
        assert_eq!(text_of(&record, OptionLetter::B), "External stages");
        assert_eq!(record.choice_count(), 3);
    }

    #[test]
    fn space_separated_options() {
        let record = parser()
            .parse_block(2, "Topic 1\nWhat is Y?\nA foo\nB bar baz\nC   qux\n", &no_answers())
            .unwrap();
        assert_eq!(record.prompt(), "What is Y?");
        assert_eq!(record.choice_count(), 3);
        assert_eq!(text_of(&record, OptionLetter::A), "foo");
        assert_eq!(text_of(&record, OptionLetter::B), "bar baz");
        assert_eq!(text_of(&record, OptionLetter::C), "qux");
    }

    #[test]
    fn attaches_answers() {
        let answers: AnswerKey = [(4, AnswerSet::parse_run("bd").unwrap())].into_iter().collect();
        let record = parser()
            .parse_block(4, "Pick two\nA. a\nB. b\nC. c\nD. d\nE. e\nF. f\n", &answers)
            .unwrap();
        assert_eq!(record.choice_count(), 6);
        assert_eq!(record.correct().unwrap().to_string(), "BD");
    }

    #[test]
    fn answer_outside_options_becomes_unknown() {
        let answers: AnswerKey = [(5, AnswerSet::parse_run("e").unwrap())].into_iter().collect();
        let record = parser()
            .parse_block(5, "Q?\nA. a\nB. b\n", &answers)
            .unwrap();
        assert!(record.correct().is_none());
    }

    #[test]
    fn rejects_block_without_option_a() {
        assert!(parser()
            .parse_block(1, "Topic 1\nNo options here.\nB. b\nC. c\n", &no_answers())
            .is_none());
        assert!(parser()
            .parse_block(2, "Just a sentence.", &no_answers())
            .is_none());
    }

    #[test]
    fn rejects_block_with_empty_option_text() {
        assert!(parser().parse_block(1, "Q?\nA.\n", &no_answers()).is_none());
    }

    #[test]
    fn empty_options_are_absent() {
        let record = parser()
            .parse_block(1, "Q?\nA. yes\nB.\nC. maybe\n", &no_answers())
            .unwrap();
        assert_eq!(record.choice_count(), 2);
        assert!(record.option(OptionLetter::B).is_none());
    }

    #[test]
    fn out_of_order_letter_is_continuation() {
        let text = "Q?\nA. Create a view\nB. Use a stage\nA table is then loaded\nC. Other\n";
        let record = parser().parse_block(1, text, &no_answers()).unwrap();
        assert_eq!(
            text_of(&record, OptionLetter::B),
            "Use a stage A table is then loaded"
        );
        assert_eq!(text_of(&record, OptionLetter::C), "Other");
    }

    #[test]
    fn truncates_missed_boundary() {
        let record = parser()
            .parse_block(1, "Q?\nA. first option B. second option\n", &no_answers())
            .unwrap();
        assert_eq!(text_of(&record, OptionLetter::A), "first option");
        assert_eq!(record.choice_count(), 1);
    }

    #[test]
    fn crlf_line_endings() {
        let record = parser()
            .parse_block(1, "Topic 2\r\nWhy?\r\nA\r\nBecause\r\nB. No\r\n", &no_answers())
            .unwrap();
        assert_eq!(record.prompt(), "Why?");
        assert_eq!(text_of(&record, OptionLetter::A), "Because");
        assert_eq!(text_of(&record, OptionLetter::B), "No");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  c\n"), "a b c");
        assert_eq!(normalize_whitespace("\n \n"), "");
    }
}
