//! Question bank persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::QuestionRecord;

/// Load a bank (a JSON array of records) from a file.
pub fn load_bank(path: &Path) -> Result<Vec<QuestionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank from {}", path.display()))?;
    let records: Vec<QuestionRecord> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse bank JSON: {}", path.display()))?;
    tracing::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Write `records` as pretty-printed JSON.
///
/// With `backup`, an existing file at `path` is first copied to
/// [`backup_path`]; the backup location is returned when one was written.
pub fn save_bank(path: &Path, records: &[QuestionRecord], backup: bool) -> Result<Option<PathBuf>> {
    let json = serde_json::to_string_pretty(records).context("failed to serialize bank")?;

    let mut backed_up = None;
    if backup && path.exists() {
        let target = backup_path(path);
        std::fs::copy(path, &target).with_context(|| {
            format!(
                "failed to back up {} to {}",
                path.display(),
                target.display()
            )
        })?;
        tracing::info!("backed up existing bank to {}", target.display());
        backed_up = Some(target);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write bank to {}", path.display()))?;
    tracing::debug!("wrote {} records to {}", records.len(), path.display());
    Ok(backed_up)
}

/// `questions.json` → `questions_backup.json`, in the same directory.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bank".to_string());
    path.with_file_name(format!("{stem}_backup.json"))
}

/// Read a text file, replacing invalid UTF-8 sequences.
pub fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("{} is not valid UTF-8; invalid bytes replaced", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}
