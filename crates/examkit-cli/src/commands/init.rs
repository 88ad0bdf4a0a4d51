//! The `examkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examkit.toml").exists() {
        println!("examkit.toml already exists, skipping.");
    } else {
        std::fs::write("examkit.toml", SAMPLE_CONFIG)?;
        println!("Created examkit.toml");
    }

    if std::path::Path::new("overrides.toml").exists() {
        println!("overrides.toml already exists, skipping.");
    } else {
        std::fs::write("overrides.toml", SAMPLE_OVERRIDES)?;
        println!("Created overrides.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: examkit answers --input exam.txt");
    println!("  2. Correct any bad answers in overrides.toml");
    println!("  3. Run: examkit extract --input exam.txt --overrides overrides.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examkit configuration

# Line that opens the answer-key section.
answer_marker = "Answers"
# Token before the question number on answer-key lines ("q12 bd").
answer_prefix = "q"
# Header stripped from the start of each question ("Topic 3").
section_label = "Topic"
# Characters at the start of a question searched for the answer marker.
stop_window = 100
# "last-wins" or "first-wins" when a question number appears twice.
duplicate_policy = "last-wins"

# Question boundary patterns, tried in order. Each needs one capture group.
question_patterns = [
    'Question\s*#\s*(\d+)',
    'Question\s+(\d+)\b',
    '(?m)^\s*Q(\d+)[.:]',
]
"#;

const SAMPLE_OVERRIDES: &str = r#"# Answer overrides, applied on top of the parsed answer key.

# Questions whose answer should stay unknown.
unknown = []

[answers]
# 12 = "bd"
"#;
