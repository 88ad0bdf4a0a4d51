//! The `examkit extract` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examkit_core::bank::{read_text_lossy, save_bank};
use examkit_core::config::load_config_from;
use examkit_core::overrides::AnswerOverrides;
use examkit_core::pipeline::{Extraction, Extractor};
use examkit_core::statistics::BankStats;

pub fn execute(
    input: PathBuf,
    output: PathBuf,
    overrides_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    backup: bool,
    to_stdout: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let extractor = Extractor::from_config(&config).context("invalid extraction config")?;

    let overrides = overrides_path
        .as_deref()
        .map(AnswerOverrides::load)
        .transpose()?;

    let text = read_text_lossy(&input)?;
    let Extraction { records, report } = extractor.extract(&text, overrides.as_ref());

    anyhow::ensure!(
        !records.is_empty(),
        "no questions found in {}",
        input.display()
    );

    if to_stdout {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        if let Some(backup) = save_bank(&output, &records, backup)? {
            eprintln!("Backed up previous bank to {}", backup.display());
        }
        eprintln!("Wrote {} questions to {}", records.len(), output.display());
    }

    if !report.dropped_blocks.is_empty() {
        eprintln!(
            "Skipped {} unparseable block(s): {}",
            report.dropped_blocks.len(),
            examkit_core::validate::format_numbers(&report.dropped_blocks)
        );
    }
    for warning in &report.warnings {
        eprintln!("  WARNING: {warning}");
    }

    super::stats::print_summary(&BankStats::compute(&records));

    Ok(())
}
