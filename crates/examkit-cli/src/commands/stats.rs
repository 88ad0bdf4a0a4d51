//! The `examkit stats` command.

use std::path::PathBuf;

use anyhow::Result;

use examkit_core::bank::load_bank;
use examkit_core::statistics::BankStats;
use examkit_core::validate::format_numbers;

pub fn execute(bank_path: PathBuf, format: String) -> Result<()> {
    let records = load_bank(&bank_path)?;
    let stats = BankStats::compute(&records);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&stats)?),
        "text" => {
            println!("{}", summary_table(&stats));
            if !stats.unknown.is_empty() {
                println!("Unknown answers: {}", format_numbers(&stats.unknown));
            }
            if !stats.missing_numbers.is_empty() {
                let listed = format_numbers(&stats.missing_numbers);
                if stats.missing_count > stats.missing_numbers.len() as u64 {
                    println!("Missing numbers: {listed}, ... ({} in total)", stats.missing_count);
                } else {
                    println!("Missing numbers: {listed}");
                }
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

/// Print the summary table to stderr.
pub fn print_summary(stats: &BankStats) {
    eprintln!("\n{}", summary_table(stats));
}

fn summary_table(stats: &BankStats) -> comfy_table::Table {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);

    let range = stats
        .number_range
        .map(|(lo, hi)| format!("{lo}-{hi}"))
        .unwrap_or_else(|| "-".to_string());
    let choices = stats
        .choice_histogram
        .iter()
        .map(|(choices, count)| format!("{choices}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");

    let rows = [
        ("Questions", stats.total.to_string()),
        (
            "With answers",
            format!(
                "{} ({:.1}%)",
                stats.with_answers,
                stats.answered_ratio() * 100.0
            ),
        ),
        ("Single answer", stats.single_answer.to_string()),
        ("Multi answer", stats.multi_answer.to_string()),
        ("Unknown", stats.unknown.len().to_string()),
        ("Numbers", range),
        ("Missing numbers", stats.missing_count.to_string()),
        ("Choices", choices),
    ];
    for (metric, value) in rows {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }

    table
}
