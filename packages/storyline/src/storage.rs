//! Loading and saving storyline documents on disk.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::model::{AttributeCensus, DocumentModel};
use crate::parser::DocumentParser;
use crate::schema::SchemaRegistry;
use crate::serializer::serialize;

/// Read and parse a storyline document.
///
/// The file handle is released before parsing starts.
///
/// # Arguments
/// * `path` - File to read
/// * `registry` - Schema to parse against
pub fn load_document(path: &Path, registry: &SchemaRegistry) -> Result<DocumentModel> {
    let xml = fs::read_to_string(path)?;
    let model = DocumentParser::new(registry).parse(&xml)?;

    let census = AttributeCensus::collect(&model, registry);
    if census.unknown_count() > 0 {
        warn!(
            path = %path.display(),
            storyline = ?census.storyline.unknown.keys().collect::<Vec<_>>(),
            data_object = ?census.data_object.unknown.keys().collect::<Vec<_>>(),
            article = ?census.article.unknown.keys().collect::<Vec<_>>(),
            "Document uses attributes outside the schema; they will be kept as written"
        );
    }

    info!(path = %path.display(), storylines = model.len(), "Loaded storyline document");
    Ok(model)
}

/// Serialize a document and write it to `path`.
///
/// Uses atomic write pattern: writes to a temp file next to the target,
/// syncs to disk, then renames over it. A failed save leaves any existing
/// file untouched and removes the temp file.
pub fn save_document(path: &Path, model: &DocumentModel) -> Result<()> {
    let content = serialize(model);
    write_atomic(path, |file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()
    })?;

    info!(path = %path.display(), storylines = model.len(), "Saved storyline document");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "storylines.xml".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Fill a temp file through `fill`, then move it over `path`.
fn write_atomic(path: &Path, fill: impl FnOnce(&mut File) -> io::Result<()>) -> Result<()> {
    let temp_file = temp_path(path);
    let result = File::create(&temp_file)
        .and_then(|mut file| fill(&mut file))
        .and_then(|()| replace_file(&temp_file, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_file);
        return Err(e.into());
    }
    Ok(())
}

fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorylineError;
    use crate::model::StorylineRecord;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let registry = SchemaRegistry::bundled();
        let dir = tempdir().unwrap();
        let path = dir.path().join("storylines.xml");

        let mut model = DocumentModel::new();
        model
            .upsert(StorylineRecord::with_defaults("trade_rumor", registry), registry)
            .unwrap();
        save_document(&path, &model).unwrap();

        let loaded = load_document(&path, registry).unwrap();
        assert_eq!(loaded, model);
        assert!(!dir.path().join(".storylines.xml.tmp").exists());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xml");
        fs::write(&path, "old").unwrap();

        save_document(&path, &DocumentModel::new()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<STORYLINES />"));
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pack.xml");
        fs::write(&path, "old").unwrap();

        let result = write_atomic(&path, |file| {
            file.write_all(b"<STORYLINE_DATABASE>")?;
            Err(io::Error::other("disk full"))
        });

        assert!(matches!(result, Err(StorylineError::Io(_))));
        assert!(!temp_path(&path).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_document(&dir.path().join("absent.xml"), SchemaRegistry::bundled());
        assert!(matches!(result, Err(StorylineError::Io(_))));
    }
}
