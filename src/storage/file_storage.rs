use crate::{
    error::{BoardError, Result},
    storage::KeyValueStore,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based key-value storage, one JSON document per key
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".teamboard";

    /// Creates a new FileStorage under the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn key_file(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BoardError::Persistence(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.root_path.join(format!("{}.json", key)))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.key_file(key)?;

        if !file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(Some(contents))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.key_file(key)?;
        self.ensure_directory_exists(&self.root_path).await?;

        // Write to a sibling file first so a crash never leaves half a record
        let tmp_path = file_path.with_extension("tmp");
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &file_path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.key_file(key)?;

        if file_path.exists() {
            fs::remove_file(file_path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert_eq!(storage.get("teamKanbanData").await.unwrap(), None);
        assert!(!storage.root_path().exists());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("teamKanbanData", "{\"a\":1}").await.unwrap();

        assert_eq!(
            storage.get("teamKanbanData").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(storage.root_path().join("teamKanbanData.json").exists());
        assert!(!storage.root_path().join("teamKanbanData.tmp").exists());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("board", "first").await.unwrap();
        storage.set("board", "second").await.unwrap();

        assert_eq!(storage.get("board").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("board", "value").await.unwrap();
        storage.remove("board").await.unwrap();
        storage.remove("board").await.unwrap();

        assert_eq!(storage.get("board").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        let result = storage.set("../escape", "value").await;
        assert!(matches!(result, Err(BoardError::Persistence(_))));
        assert!(storage.get("").await.is_err());
    }
}
