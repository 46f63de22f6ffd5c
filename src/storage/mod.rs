//! File store for the persisted word lists.
//!
//! Every backend stores whole files by exact name. Callers go through
//! [`load_list`] and [`save_list`], which speak the `Day,Word,Meaning,Date`
//! table format and turn failures into warnings the user can see.

pub mod http;
pub mod local;
pub mod memory;
pub mod table;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::{
    config::{StorageBackend, StorageConfig},
    error::StorageError,
    models::{AnswerRecord, WordList},
};

pub use http::HttpStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Words answered incorrectly
pub const INCORRECT_WORDS_FILE: &str = "incorrect_words.csv";
/// Words marked for the checklist
pub const MARKED_WORDS_FILE: &str = "marked_words.csv";
/// Exported answer records
pub const STUDY_RECORDS_FILE: &str = "study_records.csv";

/// Whole-file storage addressed by name
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Short backend label for logs
    fn kind(&self) -> &'static str;

    /// Fetch a file. `Ok(None)` means the file does not exist.
    async fn load(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Create or overwrite a file
    async fn save(&self, name: &str, contents: &str) -> Result<(), StorageError>;

    /// Delete a file. Returns `false` when there was nothing to delete.
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;
}

/// A list read from the store, with a warning when it had to fall back
#[derive(Debug, Default)]
pub struct LoadedList {
    pub list: WordList,
    pub warning: Option<String>,
}

/// Load a word table, treating every failure as an empty list
pub async fn load_list(store: &dyn FileStore, name: &str) -> LoadedList {
    match store.load(name).await {
        Ok(Some(text)) => match table::decode(&text) {
            Ok(rows) => {
                let list = WordList::from_rows(rows);
                tracing::debug!("Loaded {} rows from {} ({})", list.len(), name, store.kind());
                LoadedList {
                    list,
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!("Stored table {} is malformed: {}", name, e);
                LoadedList {
                    list: WordList::default(),
                    warning: Some(format!("Could not read {}: {}", name, e)),
                }
            }
        },
        Ok(None) => {
            tracing::info!("{} not found in {} store", name, store.kind());
            LoadedList {
                list: WordList::default(),
                warning: Some(format!("{} was not found in the file store", name)),
            }
        }
        Err(e) => {
            tracing::warn!("Failed to load {} from {} store: {}", name, store.kind(), e);
            LoadedList {
                list: WordList::default(),
                warning: Some(format!("Could not load {}: {}", name, e)),
            }
        }
    }
}

/// Write a word table, replacing any previous version
pub async fn save_list(
    store: &dyn FileStore,
    name: &str,
    list: &WordList,
) -> Result<(), StorageError> {
    let text = table::encode(list.rows())?;
    store.save(name, &text).await?;
    tracing::debug!("Saved {} rows to {} ({})", list.len(), name, store.kind());
    Ok(())
}

/// Persist the marked checklist. An empty checklist deletes the file.
pub async fn save_marked(store: &dyn FileStore, list: &WordList) -> Result<(), StorageError> {
    if list.is_empty() {
        let existed = store.delete(MARKED_WORDS_FILE).await?;
        tracing::debug!(
            "Marked list empty, deleted {} (existed: {})",
            MARKED_WORDS_FILE,
            existed
        );
        return Ok(());
    }
    save_list(store, MARKED_WORDS_FILE, list).await
}

/// Write the answer records as `study_records.csv`, replacing any earlier export
pub async fn save_records(store: &dyn FileStore, records: &[AnswerRecord]) -> Result<(), StorageError> {
    let text = table::encode_records(records)?;
    store.save(STUDY_RECORDS_FILE, &text).await?;
    tracing::info!("Exported {} study records ({})", records.len(), store.kind());
    Ok(())
}

/// Reject names that could escape a directory or URL prefix
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let bad = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.starts_with('.')
        || name.chars().any(char::is_control);
    if bad {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Build the backend selected in configuration
pub fn from_config(config: &StorageConfig, http_client: reqwest::Client) -> Result<Arc<dyn FileStore>> {
    let store: Arc<dyn FileStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Local => Arc::new(LocalStore::new(&config.dir)),
        StorageBackend::Http => {
            let base_url = config
                .url
                .clone()
                .context("STORAGE_URL must be set for the http storage backend")?;
            Arc::new(HttpStore::new(http_client, base_url, config.token.clone()))
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerResult, TrackedWord};

    fn tracked(word: &str) -> TrackedWord {
        TrackedWord {
            day: "Day1".to_string(),
            word: word.to_string(),
            meaning: format!("meaning of {}", word),
            date: "2024-03-01 09:30:00".to_string(),
        }
    }

    /// Store whose every call fails
    struct BrokenStore;

    #[async_trait]
    impl FileStore for BrokenStore {
        fn kind(&self) -> &'static str {
            "broken"
        }

        async fn load(&self, _name: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::AuthenticationFailed("no credentials".to_string()))
        }

        async fn save(&self, _name: &str, _contents: &str) -> Result<(), StorageError> {
            Err(StorageError::AuthenticationFailed("no credentials".to_string()))
        }

        async fn delete(&self, _name: &str) -> Result<bool, StorageError> {
            Err(StorageError::AuthenticationFailed("no credentials".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_falls_back_to_empty() {
        let store = MemoryStore::new();
        let loaded = load_list(&store, INCORRECT_WORDS_FILE).await;
        assert!(loaded.list.is_empty());
        assert!(loaded.warning.unwrap().contains(INCORRECT_WORDS_FILE));
    }

    #[tokio::test]
    async fn test_load_failure_falls_back_to_empty() {
        let loaded = load_list(&BrokenStore, MARKED_WORDS_FILE).await;
        assert!(loaded.list.is_empty());
        assert!(loaded.warning.unwrap().contains("authentication failed"));
    }

    #[tokio::test]
    async fn test_malformed_table_falls_back_to_empty() {
        let store = MemoryStore::new();
        store.save(INCORRECT_WORDS_FILE, "Word\nRun\n").await.unwrap();
        let loaded = load_list(&store, INCORRECT_WORDS_FILE).await;
        assert!(loaded.list.is_empty());
        assert!(loaded.warning.is_some());
    }

    #[tokio::test]
    async fn test_save_then_load_list() {
        let store = MemoryStore::new();
        let list = WordList::from_rows(vec![tracked("Run"), tracked("Apple")]);
        save_list(&store, INCORRECT_WORDS_FILE, &list).await.unwrap();

        let loaded = load_list(&store, INCORRECT_WORDS_FILE).await;
        assert!(loaded.warning.is_none());
        assert_eq!(loaded.list, list);
    }

    #[tokio::test]
    async fn test_empty_marked_list_deletes_file() {
        let store = MemoryStore::new();
        let list = WordList::from_rows(vec![tracked("Run")]);
        save_marked(&store, &list).await.unwrap();
        assert!(store.load(MARKED_WORDS_FILE).await.unwrap().is_some());

        save_marked(&store, &WordList::default()).await.unwrap();
        assert!(store.load(MARKED_WORDS_FILE).await.unwrap().is_none());

        // Deleting again is not an error
        save_marked(&store, &WordList::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let list = WordList::from_rows(vec![tracked("Run")]);
        let err = save_list(&BrokenStore, INCORRECT_WORDS_FILE, &list)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_save_records_replaces_export() {
        let store = MemoryStore::new();
        let first = vec![AnswerRecord {
            word: "Run".to_string(),
            result: AnswerResult::Incorrect,
            day: Some("Day1".to_string()),
        }];
        save_records(&store, &first).await.unwrap();

        let second = vec![AnswerRecord {
            word: "Book".to_string(),
            result: AnswerResult::Correct,
            day: None,
        }];
        save_records(&store, &second).await.unwrap();

        let saved = store.load(STUDY_RECORDS_FILE).await.unwrap().unwrap();
        assert_eq!(saved, "Word,Result,Day\nBook,Correct,\n");

        let err = save_records(&BrokenStore, &second).await.unwrap_err();
        assert!(matches!(err, StorageError::AuthenticationFailed(_)));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name(STUDY_RECORDS_FILE).is_ok());
        assert!(validate_name(INCORRECT_WORDS_FILE).is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../secrets").is_err());
        assert!(validate_name("a/b.csv").is_err());
        assert!(validate_name(".env").is_err());
    }
}
