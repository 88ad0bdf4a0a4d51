//! The `examkit patch` command.

use std::path::PathBuf;

use anyhow::Result;

use examkit_core::bank::{load_bank, save_bank};
use examkit_core::overrides::{AnswerOverrides, PatchMode};
use examkit_core::validate::format_numbers;

pub fn execute(bank: PathBuf, overrides_path: PathBuf, fill_missing: bool, backup: bool) -> Result<()> {
    let records = load_bank(&bank)?;
    let overrides = AnswerOverrides::load(&overrides_path)?;
    let mode = if fill_missing {
        PatchMode::FillMissing
    } else {
        PatchMode::Replace
    };

    let outcome = overrides.apply_to_records(&records, mode);

    for (number, err) in &outcome.rejected {
        eprintln!("  [q{number}] WARNING: override rejected: {err}");
    }
    if !outcome.not_found.is_empty() {
        eprintln!(
            "  WARNING: no question for override(s): {}",
            format_numbers(&outcome.not_found)
        );
    }

    if outcome.changed.is_empty() {
        println!("No answers changed.");
        return Ok(());
    }

    if let Some(backup) = save_bank(&bank, &outcome.records, backup)? {
        println!("Backed up previous bank to {}", backup.display());
    }
    println!(
        "Updated {} answer(s): {}",
        outcome.changed.len(),
        format_numbers(&outcome.changed)
    );

    let unknown: Vec<u32> = outcome
        .records
        .iter()
        .filter(|r| r.correct().is_none())
        .map(|r| r.number())
        .collect();
    if !unknown.is_empty() {
        println!("Still unknown: {}", format_numbers(&unknown));
    }

    Ok(())
}
