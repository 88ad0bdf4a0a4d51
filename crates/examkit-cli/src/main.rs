//! examkit CLI: turns exam text dumps into JSON question banks.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examkit", version, about = "Exam text to question bank extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract questions and answers from an exam text file
    Extract {
        /// Plain-text exam dump
        #[arg(long)]
        input: PathBuf,

        /// Output question bank
        #[arg(long, default_value = "questions.json")]
        output: PathBuf,

        /// Answer overrides TOML
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overwrite an existing bank without keeping a backup
        #[arg(long)]
        no_backup: bool,

        /// Print the bank to stdout instead of writing --output
        #[arg(long)]
        stdout: bool,
    },

    /// Print the answer key parsed from an exam text file
    Answers {
        /// Plain-text exam dump
        #[arg(long)]
        input: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Apply answer overrides to an existing question bank
    Patch {
        /// Question bank JSON
        #[arg(long)]
        bank: PathBuf,

        /// Answer overrides TOML
        #[arg(long)]
        overrides: PathBuf,

        /// Only fill questions whose answer is unknown
        #[arg(long)]
        fill_missing: bool,

        /// Overwrite the bank without keeping a backup
        #[arg(long)]
        no_backup: bool,
    },

    /// Check a question bank for data-quality issues
    Validate {
        /// Question bank JSON
        #[arg(long)]
        bank: PathBuf,
    },

    /// Show statistics for a question bank
    Stats {
        /// Question bank JSON
        #[arg(long)]
        bank: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and overrides files
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examkit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            overrides,
            config,
            no_backup,
            stdout,
        } => commands::extract::execute(input, output, overrides, config, !no_backup, stdout),
        Commands::Answers { input, config } => commands::answers::execute(input, config),
        Commands::Patch {
            bank,
            overrides,
            fill_missing,
            no_backup,
        } => commands::patch::execute(bank, overrides, fill_missing, !no_backup),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Stats { bank, format } => commands::stats::execute(bank, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
