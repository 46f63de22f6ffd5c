use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::fs;

use crate::models::{WordEntry, WordSet};

/// The full word list the service quizzes from
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<WordEntry>,
    has_days: bool,
}

impl Vocabulary {
    /// Load a vocabulary CSV from a file path or an http(s) URL
    pub async fn load(source: &str, http_client: &reqwest::Client) -> Result<Self> {
        let text = if source.starts_with("http://") || source.starts_with("https://") {
            let response = http_client
                .get(source)
                .send()
                .await
                .with_context(|| format!("failed to fetch {}", source))?;
            if !response.status().is_success() {
                bail!("fetching {} returned status {}", source, response.status());
            }
            response.text().await?
        } else {
            read_file(source).await?
        };

        let vocabulary = Self::from_csv(&text)?;
        tracing::info!(
            "Loaded {} words from {} ({} days)",
            vocabulary.len(),
            source,
            vocabulary.days().len()
        );

        Ok(vocabulary)
    }

    /// Parse a table with `Word` and `Meaning` columns and an optional `Day` column
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers().context("word list has no header row")?.clone();
        for required in ["Word", "Meaning"] {
            if !headers.iter().any(|h| h == required) {
                bail!("word list is missing the '{}' column", required);
            }
        }
        let has_days = headers.iter().any(|h| h == "Day");

        let mut entries = Vec::new();
        for (line, row) in reader.deserialize::<WordEntry>().enumerate() {
            let entry = row.with_context(|| format!("bad word list row {}", line + 2))?;
            if entry.word.is_empty() {
                continue;
            }
            entries.push(entry);
        }

        Ok(Self { entries, has_days })
    }

    /// Create an empty vocabulary (used when loading fails)
    pub fn empty() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<WordEntry>) -> Self {
        let has_days = entries.iter().any(|e| e.day.is_some());
        Self { entries, has_days }
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    /// Whether the dataset has a Day column to filter by
    pub fn has_days(&self) -> bool {
        self.has_days
    }

    /// Distinct Day values in first-appearance order
    pub fn days(&self) -> Vec<String> {
        let mut days: Vec<String> = Vec::new();
        for day in self.entries.iter().filter_map(|e| e.day.as_ref()) {
            if !days.contains(day) {
                days.push(day.clone());
            }
        }
        days
    }

    /// Build the word set for the selected days.
    /// Without a Day column the whole vocabulary is used.
    pub fn select(&self, days: &[String]) -> WordSet {
        if !self.has_days {
            return WordSet::new(self.entries.clone());
        }
        WordSet::filtered(&self.entries, days)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}
