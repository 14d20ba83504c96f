//! JSON file backend

use crate::storage::{CorpusDocument, CorpusStorage, StoreResult};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Stores the corpus as one pretty-printed JSON file
///
/// Writes go to a sibling `.tmp` file that is renamed over the target, so a
/// crash mid-write leaves the previous corpus intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CorpusStorage for JsonFileStorage {
    fn load(&self) -> StoreResult<Option<CorpusDocument>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&mut self, document: &CorpusDocument) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&temp)?);
            serde_json::to_writer_pretty(&mut writer, document)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        fs::rename(&temp, &self.path)?;

        tracing::debug!("Saved corpus to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoreError, SCHEMA_VERSION};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn create_test_document() -> CorpusDocument {
        CorpusDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            base_domain: "example.org".to_string(),
            description: String::new(),
            created_at_utc: "2024-01-01T00:00:00+00:00".to_string(),
            phases: BTreeMap::new(),
            total_unique_urls: 0,
            updated_at_utc: "2024-01-01T00:00:00+00:00".to_string(),
            all_unique_urls: Vec::new(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("all_urls.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_empty_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all_urls.json");
        fs::write(&path, "  \n").unwrap();
        assert!(JsonFileStorage::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all_urls.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStorage::new(path).load(),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("all_urls.json");
        let mut storage = JsonFileStorage::new(&path);

        let doc = create_test_document();
        storage.save(&doc).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("all_urls.json.tmp").exists());
        assert_eq!(storage.load().unwrap(), Some(doc));
    }
}
