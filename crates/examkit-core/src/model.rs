//! Core data model types for examkit.
//!
//! A [`QuestionRecord`] is one multiple-choice exam question. Records are
//! validated on construction and on deserialization, so every record in a
//! bank upholds the invariants documented on the type.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// One lettered answer alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl OptionLetter {
    /// Every letter, in display order.
    pub const ALL: [OptionLetter; 6] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
        OptionLetter::E,
        OptionLetter::F,
    ];

    /// Parse a single letter, case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLetter::A),
            'B' => Some(OptionLetter::B),
            'C' => Some(OptionLetter::C),
            'D' => Some(OptionLetter::D),
            'E' => Some(OptionLetter::E),
            'F' => Some(OptionLetter::F),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            OptionLetter::A => 'A',
            OptionLetter::B => 'B',
            OptionLetter::C => 'C',
            OptionLetter::D => 'D',
            OptionLetter::E => 'E',
            OptionLetter::F => 'F',
        }
    }

    /// Zero-based position (`A` = 0).
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLetter {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                OptionLetter::from_char(c).ok_or_else(|| RecordError::InvalidLetter(s.to_string()))
            }
            _ => Err(RecordError::InvalidLetter(s.to_string())),
        }
    }
}

/// A non-empty set of correct option letters.
///
/// An unknown answer is `Option<AnswerSet>::None`; there is no empty set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnswerSet(BTreeSet<OptionLetter>);

impl AnswerSet {
    pub fn new(letters: impl IntoIterator<Item = OptionLetter>) -> Result<Self, RecordError> {
        let set: BTreeSet<_> = letters.into_iter().collect();
        if set.is_empty() {
            return Err(RecordError::EmptyAnswerSet);
        }
        Ok(Self(set))
    }

    /// Parse a run of letters such as `"abd"` or `"B"`. Case-insensitive;
    /// repeated letters collapse.
    pub fn parse_run(run: &str) -> Result<Self, RecordError> {
        let letters = run
            .trim()
            .chars()
            .map(|c| OptionLetter::from_char(c).ok_or_else(|| RecordError::InvalidLetter(c.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(letters)
    }

    pub fn contains(&self, letter: OptionLetter) -> bool {
        self.0.contains(&letter)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = OptionLetter> + '_ {
        self.0.iter().copied()
    }

    /// Uppercase letter strings, in order (`["A", "D"]`).
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|l| l.to_string()).collect()
    }
}

impl Serialize for AnswerSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl fmt::Display for AnswerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in &self.0 {
            write!(f, "{letter}")?;
        }
        Ok(())
    }
}

/// One extracted exam question.
///
/// Invariants:
/// - `number` is positive.
/// - `prompt` is non-empty.
/// - `options` holds at least one letter, and every text is non-empty.
/// - `correct`, when known, only names letters present in `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub struct QuestionRecord {
    number: u32,
    prompt: String,
    options: BTreeMap<OptionLetter, String>,
    correct: Option<AnswerSet>,
}

impl QuestionRecord {
    pub fn new(
        number: u32,
        prompt: impl Into<String>,
        options: BTreeMap<OptionLetter, String>,
        correct: Option<AnswerSet>,
    ) -> Result<Self, RecordError> {
        let prompt = prompt.into();
        if number == 0 {
            return Err(RecordError::ZeroNumber);
        }
        if prompt.trim().is_empty() {
            return Err(RecordError::EmptyPrompt(number));
        }
        if options.is_empty() {
            return Err(RecordError::NoOptions(number));
        }
        if let Some((&letter, _)) = options.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(RecordError::EmptyOption { number, letter });
        }
        if let Some(answers) = &correct {
            if let Some(letter) = answers.iter().find(|l| !options.contains_key(l)) {
                return Err(RecordError::AnswerNotInOptions { number, letter });
            }
        }
        Ok(Self {
            number,
            prompt,
            options,
            correct,
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &BTreeMap<OptionLetter, String> {
        &self.options
    }

    pub fn option(&self, letter: OptionLetter) -> Option<&str> {
        self.options.get(&letter).map(String::as_str)
    }

    /// Number of populated options. Always equal to `options().len()`.
    pub fn choice_count(&self) -> usize {
        self.options.len()
    }

    /// The correct letters, or `None` when the answer is unknown.
    pub fn correct(&self) -> Option<&AnswerSet> {
        self.correct.as_ref()
    }

    pub fn is_multi_answer(&self) -> bool {
        self.correct.as_ref().is_some_and(|a| a.len() > 1)
    }

    /// A copy of this record with its answer wholly replaced.
    pub fn with_correct(&self, correct: Option<AnswerSet>) -> Result<Self, RecordError> {
        Self::new(self.number, self.prompt.clone(), self.options.clone(), correct)
    }
}

/// Serialized shape of a record:
/// `{qnum, question, A, B, C, D, E, (F), correct, n_choices}`.
#[derive(Debug, Serialize, Deserialize)]
struct WireRecord {
    qnum: u32,
    question: String,
    #[serde(rename = "A", default)]
    a: String,
    #[serde(rename = "B", default)]
    b: String,
    #[serde(rename = "C", default)]
    c: String,
    #[serde(rename = "D", default)]
    d: String,
    #[serde(rename = "E", default)]
    e: String,
    #[serde(rename = "F", default, skip_serializing_if = "Option::is_none")]
    f: Option<String>,
    #[serde(default)]
    correct: Option<WireAnswer>,
    #[serde(default)]
    n_choices: usize,
}

/// `correct` is written as a letter array; older banks also store a run
/// such as `"AD"`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WireAnswer {
    Letters(Vec<String>),
    Run(String),
}

impl From<QuestionRecord> for WireRecord {
    fn from(record: QuestionRecord) -> Self {
        let n_choices = record.choice_count();
        let mut options = record.options;
        let mut take = |letter: OptionLetter| options.remove(&letter).unwrap_or_default();
        WireRecord {
            qnum: record.number,
            question: record.prompt,
            a: take(OptionLetter::A),
            b: take(OptionLetter::B),
            c: take(OptionLetter::C),
            d: take(OptionLetter::D),
            e: take(OptionLetter::E),
            f: options.remove(&OptionLetter::F),
            correct: record
                .correct
                .map(|answers| WireAnswer::Letters(answers.to_strings())),
            n_choices,
        }
    }
}

impl TryFrom<WireRecord> for QuestionRecord {
    type Error = RecordError;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let texts = [
            (OptionLetter::A, Some(wire.a)),
            (OptionLetter::B, Some(wire.b)),
            (OptionLetter::C, Some(wire.c)),
            (OptionLetter::D, Some(wire.d)),
            (OptionLetter::E, Some(wire.e)),
            (OptionLetter::F, wire.f),
        ];
        let options = texts
            .into_iter()
            .filter_map(|(letter, text)| {
                text.filter(|t| !t.trim().is_empty()).map(|t| (letter, t))
            })
            .collect();

        let run = match wire.correct {
            Some(WireAnswer::Letters(letters)) => letters.concat(),
            Some(WireAnswer::Run(run)) => run,
            None => String::new(),
        };
        let correct = if run.trim().is_empty() {
            None
        } else {
            Some(AnswerSet::parse_run(&run)?)
        };

        QuestionRecord::new(wire.qnum, wire.question, options, correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(OptionLetter, &str)]) -> BTreeMap<OptionLetter, String> {
        pairs.iter().map(|(l, t)| (*l, t.to_string())).collect()
    }

    #[test]
    fn letter_parse_and_display() {
        assert_eq!("b".parse::<OptionLetter>().unwrap(), OptionLetter::B);
        assert_eq!(" F ".parse::<OptionLetter>().unwrap(), OptionLetter::F);
        assert!("G".parse::<OptionLetter>().is_err());
        assert!("AB".parse::<OptionLetter>().is_err());
        assert_eq!(OptionLetter::E.to_string(), "E");
        assert_eq!(OptionLetter::C.index(), 2);
    }

    #[test]
    fn answer_set_from_run() {
        let set = AnswerSet::parse_run("dab").unwrap();
        assert_eq!(set.to_strings(), vec!["A", "B", "D"]);
        assert_eq!(set.to_string(), "ABD");
        assert_eq!(AnswerSet::parse_run("aa").unwrap().len(), 1);
        assert_eq!(AnswerSet::parse_run(""), Err(RecordError::EmptyAnswerSet));
        assert!(AnswerSet::parse_run("ax").is_err());
    }

    #[test]
    fn record_rejects_answer_outside_options() {
        let err = QuestionRecord::new(
            7,
            "Pick one",
            options(&[(OptionLetter::A, "x"), (OptionLetter::B, "y")]),
            Some(AnswerSet::parse_run("c").unwrap()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RecordError::AnswerNotInOptions {
                number: 7,
                letter: OptionLetter::C
            }
        );
    }

    #[test]
    fn record_rejects_empty_prompt_and_options() {
        let opts = options(&[(OptionLetter::A, "x")]);
        assert_eq!(
            QuestionRecord::new(3, "  ", opts.clone(), None),
            Err(RecordError::EmptyPrompt(3))
        );
        assert_eq!(
            QuestionRecord::new(3, "Q", BTreeMap::new(), None),
            Err(RecordError::NoOptions(3))
        );
        assert_eq!(
            QuestionRecord::new(0, "Q", opts, None),
            Err(RecordError::ZeroNumber)
        );
    }

    #[test]
    fn serializes_wire_shape() {
        let record = QuestionRecord::new(
            12,
            "Which two?",
            options(&[
                (OptionLetter::A, "one"),
                (OptionLetter::B, "two"),
                (OptionLetter::C, "three"),
            ]),
            Some(AnswerSet::parse_run("ac").unwrap()),
        )
        .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["qnum"], 12);
        assert_eq!(value["question"], "Which two?");
        assert_eq!(value["A"], "one");
        assert_eq!(value["D"], "");
        assert_eq!(value["E"], "");
        assert!(value.get("F").is_none());
        assert_eq!(value["correct"], serde_json::json!(["A", "C"]));
        assert_eq!(value["n_choices"], 3);
    }

    #[test]
    fn unknown_answer_serializes_as_null() {
        let record =
            QuestionRecord::new(1, "Q", options(&[(OptionLetter::A, "x")]), None).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["correct"].is_null());
    }

    #[test]
    fn deserializes_legacy_shapes() {
        let json = r#"{
            "qnum": 5, "question": "Q?", "A": "a", "B": "b", "C": "", "D": "", "E": "",
            "F": "f", "correct": "bf", "n_choices": 99
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.choice_count(), 3);
        assert_eq!(record.option(OptionLetter::F), Some("f"));
        assert_eq!(record.correct().unwrap().to_string(), "BF");

        let json = r#"{"qnum": 6, "question": "Q?", "A": "a", "correct": []}"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert!(record.correct().is_none());
    }

    #[test]
    fn deserialize_enforces_invariants() {
        let json = r#"{"qnum": 5, "question": "Q?", "A": "a", "correct": ["C"]}"#;
        assert!(serde_json::from_str::<QuestionRecord>(json).is_err());
    }

    #[test]
    fn with_correct_replaces_wholesale() {
        let record = QuestionRecord::new(
            2,
            "Q",
            options(&[(OptionLetter::A, "x"), (OptionLetter::B, "y")]),
            Some(AnswerSet::parse_run("a").unwrap()),
        )
        .unwrap();
        let patched = record
            .with_correct(Some(AnswerSet::parse_run("ab").unwrap()))
            .unwrap();
        assert!(patched.is_multi_answer());
        assert_eq!(record.correct().unwrap().to_string(), "A");
        assert!(record.with_correct(None).unwrap().correct().is_none());
    }
}
