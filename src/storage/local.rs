use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;

use super::{validate_name, FileStore};
use crate::error::StorageError;

/// Files kept in one directory on local disk
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl FileStore for LocalStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn load(&self, name: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, name: &str, contents: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir).await?;

        // Write beside the target and rename so readers never see a partial file
        let tmp = self.dir.join(format!(".{}.tmp", name));
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));

        assert!(store.load("marked_words.csv").await.unwrap().is_none());

        store
            .save("marked_words.csv", "Day,Word,Meaning,Date\n")
            .await
            .unwrap();
        let text = store.load("marked_words.csv").await.unwrap().unwrap();
        assert_eq!(text, "Day,Word,Meaning,Date\n");
        assert!(dir.path().join("nested/marked_words.csv").exists());

        assert!(store.delete("marked_words.csv").await.unwrap());
        assert!(!store.delete("marked_words.csv").await.unwrap());
    }

    #[tokio::test]
    async fn test_local_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let err = store.load("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }
}
