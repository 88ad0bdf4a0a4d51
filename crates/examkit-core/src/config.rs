//! Extraction configuration.
//!
//! Every field has a default matching the usual exam-dump layout, so an empty
//! or missing config file is valid.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How to resolve two blocks carrying the same question number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The block appearing later in the text replaces the earlier one.
    #[default]
    LastWins,
    /// The first block is kept and later ones are discarded.
    FirstWins,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::LastWins => write!(f, "last-wins"),
            DuplicatePolicy::FirstWins => write!(f, "first-wins"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "last-wins" | "last" => Ok(DuplicatePolicy::LastWins),
            "first-wins" | "first" => Ok(DuplicatePolicy::FirstWins),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}

/// Top-level examkit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Line content that opens the answer-key section (case-sensitive).
    #[serde(default = "default_answer_marker")]
    pub answer_marker: String,
    /// Token preceding the question number on answer-key lines (`q` in `q12 bd`).
    #[serde(default = "default_answer_prefix")]
    pub answer_prefix: String,
    /// Candidate question boundary regexes, tried in order. Each needs one
    /// capture group for the question number.
    #[serde(default = "default_question_patterns")]
    pub question_patterns: Vec<String>,
    /// Label of the section header stripped from the start of a block (`Topic 3`).
    #[serde(default = "default_section_label")]
    pub section_label: String,
    /// Characters at the start of a block searched for the answer marker.
    #[serde(default = "default_stop_window")]
    pub stop_window: usize,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_answer_marker() -> String {
    "Answers".to_string()
}
fn default_answer_prefix() -> String {
    "q".to_string()
}
fn default_question_patterns() -> Vec<String> {
    vec![
        r"Question\s*#\s*(\d+)".to_string(),
        r"Question\s+(\d+)\b".to_string(),
        r"(?m)^\s*Q(\d+)[.:]".to_string(),
    ]
}
fn default_section_label() -> String {
    "Topic".to_string()
}
fn default_stop_window() -> usize {
    100
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            answer_marker: default_answer_marker(),
            answer_prefix: default_answer_prefix(),
            question_patterns: default_question_patterns(),
            section_label: default_section_label(),
            stop_window: default_stop_window(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl ExtractConfig {
    /// Parse a TOML string (missing fields take their defaults).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse examkit config")
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examkit.toml` in the current directory
/// 2. `~/.config/examkit/config.toml`
///
/// Environment variable overrides: `EXAMKIT_ANSWER_MARKER`, `EXAMKIT_DUPLICATE_POLICY`.
pub fn load_config() -> Result<ExtractConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExtractConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examkit.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExtractConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExtractConfig::default(),
    };

    if let Ok(marker) = std::env::var("EXAMKIT_ANSWER_MARKER") {
        config.answer_marker = marker;
    }

    if let Ok(policy) = std::env::var("EXAMKIT_DUPLICATE_POLICY") {
        config.duplicate_policy = policy
            .parse()
            .map_err(|e: String| anyhow::anyhow!("EXAMKIT_DUPLICATE_POLICY: {e}"))?;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examkit"))
}
