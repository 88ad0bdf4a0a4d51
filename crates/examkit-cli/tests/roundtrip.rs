//! Persistence round-trip and idempotence tests.

use examkit_core::bank::{load_bank, save_bank};
use examkit_core::model::QuestionRecord;
use examkit_core::pipeline::extract_questions;

fn fixture_records() -> Vec<QuestionRecord> {
    let text = std::fs::read_to_string("../../fixtures/sample_exam.txt").unwrap();
    extract_questions(&text, None).unwrap().records
}

#[test]
fn json_roundtrip_preserves_records() {
    let records = fixture_records();
    let json = serde_json::to_string_pretty(&records).unwrap();
    let parsed: Vec<QuestionRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, records);
}

#[test]
fn bank_file_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("questions.json");
    let records = fixture_records();

    save_bank(&path, &records, true).unwrap();
    assert_eq!(load_bank(&path).unwrap(), records);

    // Saving what was loaded produces identical bytes.
    let first = std::fs::read_to_string(&path).unwrap();
    save_bank(&path, &load_bank(&path).unwrap(), false).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn extraction_is_idempotent() {
    let text = std::fs::read_to_string("../../fixtures/sample_exam.txt").unwrap();
    let first = extract_questions(&text, None).unwrap().records;
    let second = extract_questions(&text, None).unwrap().records;
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn legacy_bank_shapes_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"[
  {"qnum": 278, "question": "Pick three", "A": "a", "B": "b", "C": "c",
   "D": "d", "E": "e", "F": "f", "correct": "DEF", "n_choices": 6},
  {"qnum": 353, "question": "Debated", "A": "a", "B": "b", "C": "", "D": "",
   "E": "", "correct": [], "n_choices": 2}
]"#,
    )
    .unwrap();

    let records = load_bank(&path).unwrap();
    assert_eq!(records[0].correct().unwrap().to_string(), "DEF");
    assert!(records[1].correct().is_none());
    assert_eq!(records[1].choice_count(), 2);

    // Re-saving normalizes to the array form.
    save_bank(&path, &records, false).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value[0]["correct"], serde_json::json!(["D", "E", "F"]));
    assert!(value[1]["correct"].is_null());
}
