use async_trait::async_trait;
use dashmap::DashMap;

use super::{validate_name, FileStore};
use crate::error::StorageError;

/// Process-local store. Contents vanish on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, name: &str) -> Result<Option<String>, StorageError> {
        validate_name(name)?;
        Ok(self.files.get(name).map(|entry| entry.value().clone()))
    }

    async fn save(&self, name: &str, contents: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        self.files.insert(name.to_string(), contents.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        validate_name(name)?;
        Ok(self.files.remove(name).is_some())
    }
}
