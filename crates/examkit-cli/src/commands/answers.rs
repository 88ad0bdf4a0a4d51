//! The `examkit answers` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examkit_core::answer_key::AnswerKeyParser;
use examkit_core::bank::read_text_lossy;
use examkit_core::config::load_config_from;

pub fn execute(input: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let parser = AnswerKeyParser::from_config(&config).context("invalid extraction config")?;

    let text = read_text_lossy(&input)?;
    let parsed = parser.parse(&text);

    println!("{}", serde_json::to_string_pretty(&parsed.key)?);

    if !parsed.found_marker {
        eprintln!("No `{}` section found in {}", parser.marker(), input.display());
    } else {
        eprintln!(
            "{} answer(s), {} line(s) skipped",
            parsed.key.len(),
            parsed.skipped_lines
        );
        for number in &parsed.duplicate_numbers {
            eprintln!("  WARNING: q{number} listed more than once; the last entry wins");
        }
    }

    Ok(())
}
