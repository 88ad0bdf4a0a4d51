//! The `examkit validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let records = examkit_core::bank::load_bank(&bank_path)?;
    println!("Bank: {} ({} questions)", bank_path.display(), records.len());

    let warnings = examkit_core::validate::validate_bank(&records);
    for w in &warnings {
        let prefix = w
            .number
            .map(|n| format!("  [q{n}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Bank is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
