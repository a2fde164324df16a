// src/documents/loader.rs
use crate::utils::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};

/// A text document read fully into memory.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub content: String,
}

impl SourceDocument {
    /// Path as shown in logs and reports.
    pub fn label(&self) -> String {
        self.path.display().to_string()
    }
}

/// Reads a UTF-8 document from disk.
pub fn load_document(path: &Path) -> Result<SourceDocument, AppError> {
    tracing::debug!("Reading document: {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read {}: {}", path.display(), e);
        AppError::Io(e)
    })?;

    tracing::info!("Loaded {} ({} bytes)", path.display(), content.len());
    Ok(SourceDocument { path: path.to_path_buf(), content })
}

/// Like [`load_document`], but a missing file is `Ok(None)` rather than an error.
pub fn load_optional_document(path: &Path) -> Result<Option<SourceDocument>, AppError> {
    if !path.exists() {
        tracing::warn!("Document does not exist, treating as empty: {}", path.display());
        return Ok(None);
    }
    load_document(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.ts");
        fs::write(&path, "const A = [];").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.content, "const A = [];");
        assert!(doc.label().ends_with("seed.ts"));

        assert!(load_optional_document(&dir.path().join("absent.ts")).unwrap().is_none());
        assert!(matches!(load_document(&dir.path().join("absent.ts")), Err(AppError::Io(_))));
    }
}
