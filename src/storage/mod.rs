// src/storage/mod.rs
use crate::utils::error::StorageError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes `content` to `<base_dir>/<file_name>`.
    pub fn save_text(&self, file_name: &str, content: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(file_name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }

        fs::write(&file_path, content).map_err(StorageError::IoError)?;

        tracing::info!("Saved {} bytes to {}", content.len(), file_path.display());
        Ok(file_path)
    }

    /// Overwrites a document where it lives, outside the base directory.
    pub fn overwrite(&self, path: &Path, content: &str) -> Result<PathBuf, StorageError> {
        fs::write(path, content).map_err(StorageError::IoError)?;
        tracing::info!("Rewrote {} ({} bytes)", path.display(), content.len());
        Ok(path.to_path_buf())
    }

    /// Saves a report as pretty JSON to `<base_dir>/<name>_report.json`.
    pub fn save_report<T: Serialize>(&self, name: &str, report: &T) -> Result<PathBuf, StorageError> {
        let report_str = serde_json::to_string_pretty(report)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        self.save_text(&format!("{}_report.json", name), &report_str)
    }
}

/// File name for a document derived from `source`: `health.seed.ts` -> `health.seed.<suffix>.ts`.
pub fn derived_file_name(source: &Path, suffix: &str) -> String {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}.{}.{}", stem, suffix, ext),
        _ => format!("{}.{}", file_name, suffix),
    }
}
