use serde::{Deserialize, Serialize};

/// Day label used when a row carries no category
pub const UNSPECIFIED_DAY: &str = "Unspecified";
/// Meaning label used when a row carries no meaning
pub const MISSING_MEANING: &str = "No meaning provided";

/// A single vocabulary row as it appears in the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(rename = "Day", default)]
    pub day: Option<String>,
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Meaning")]
    pub meaning: String,
}

impl WordEntry {
    pub fn new(day: Option<&str>, word: &str, meaning: &str) -> Self {
        Self {
            day: day.map(str::to_string),
            word: word.to_string(),
            meaning: meaning.to_string(),
        }
    }

    /// Day label, falling back to "Unspecified"
    pub fn day_label(&self) -> &str {
        self.day.as_deref().unwrap_or(UNSPECIFIED_DAY)
    }
}

/// The day-filtered subset of the vocabulary currently in play
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    entries: Vec<WordEntry>,
}

impl WordSet {
    pub fn new(entries: Vec<WordEntry>) -> Self {
        Self { entries }
    }

    /// Build a set from `entries`, keeping rows whose Day is in `days`.
    /// An empty `days` slice keeps every row.
    pub fn filtered(entries: &[WordEntry], days: &[String]) -> Self {
        if days.is_empty() {
            return Self::new(entries.to_vec());
        }

        let entries = entries
            .iter()
            .filter(|entry| {
                entry
                    .day
                    .as_ref()
                    .is_some_and(|day| days.iter().any(|d| d == day))
            })
            .cloned()
            .collect();

        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<&WordEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A word saved to the marked checklist or the incorrect-answer queue.
/// Field order matches the persisted `Day,Word,Meaning,Date` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedWord {
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Meaning")]
    pub meaning: String,
    #[serde(rename = "Date")]
    pub date: String,
}

pub type MarkedWord = TrackedWord;
pub type IncorrectWord = TrackedWord;

impl TrackedWord {
    /// Snapshot a dataset row with the given timestamp
    pub fn from_entry(entry: &WordEntry, date: impl Into<String>) -> Self {
        let meaning = if entry.meaning.trim().is_empty() {
            MISSING_MEANING.to_string()
        } else {
            entry.meaning.clone()
        };

        Self {
            day: entry.day_label().to_string(),
            word: entry.word.clone(),
            meaning,
            date: date.into(),
        }
    }
}

/// Ordered collection of tracked words, unique by `word`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    rows: Vec<TrackedWord>,
}

impl WordList {
    /// Build a list from stored rows, dropping later duplicates of a word
    pub fn from_rows(rows: Vec<TrackedWord>) -> Self {
        let mut list = Self::default();
        for row in rows {
            list.insert(row);
        }
        list
    }

    pub fn contains(&self, word: &str) -> bool {
        self.rows.iter().any(|row| row.word == word)
    }

    /// Insert a row unless its word is already present. Returns whether it was added.
    pub fn insert(&mut self, row: TrackedWord) -> bool {
        if self.contains(&row.word) {
            return false;
        }
        self.rows.push(row);
        true
    }

    /// Remove a word. Returns whether it was present.
    pub fn remove(&mut self, word: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.word != word);
        self.rows.len() != before
    }

    pub fn get(&self, index: usize) -> Option<&TrackedWord> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[TrackedWord] {
        &self.rows
    }

    /// Distinct Day values in first-appearance order
    pub fn days(&self) -> Vec<String> {
        let mut days: Vec<String> = Vec::new();
        for row in &self.rows {
            if !days.contains(&row.day) {
                days.push(row.day.clone());
            }
        }
        days
    }

    pub fn for_day<'a>(&'a self, day: &'a str) -> impl Iterator<Item = &'a TrackedWord> + 'a {
        self.rows.iter().filter(move |row| row.day == day)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<WordEntry> {
        vec![
            WordEntry::new(Some("Day1"), "Apple", "사과"),
            WordEntry::new(Some("Day1"), "Run", "달리다"),
            WordEntry::new(Some("Day2"), "Happy", "행복한"),
            WordEntry::new(None, "Book", "책"),
        ]
    }

    fn tracked(word: &str, day: &str) -> TrackedWord {
        TrackedWord {
            day: day.to_string(),
            word: word.to_string(),
            meaning: format!("meaning of {}", word),
            date: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let set = WordSet::filtered(&sample_entries(), &[]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_filter_by_days() {
        let set = WordSet::filtered(&sample_entries(), &["Day1".to_string()]);
        let words: Vec<_> = set.entries().iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["Apple", "Run"]);

        let set = WordSet::filtered(&sample_entries(), &["Day3".to_string()]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_tracked_word_defaults() {
        let entry = WordEntry::new(None, "Book", "  ");
        let row = TrackedWord::from_entry(&entry, "2024-01-01 00:00:00");
        assert_eq!(row.day, UNSPECIFIED_DAY);
        assert_eq!(row.meaning, MISSING_MEANING);
    }

    #[test]
    fn test_word_list_has_no_duplicates() {
        let mut list = WordList::default();
        assert!(list.insert(tracked("Run", "Day1")));
        assert!(!list.insert(tracked("Run", "Day2")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.rows()[0].day, "Day1");

        let list = WordList::from_rows(vec![tracked("Run", "Day1"), tracked("Run", "Day1")]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_word_list_days_and_grouping() {
        let mut list = WordList::from_rows(vec![
            tracked("Run", "Day2"),
            tracked("Apple", "Day1"),
            tracked("Happy", "Day2"),
        ]);
        assert_eq!(list.days(), vec!["Day2".to_string(), "Day1".to_string()]);
        assert_eq!(list.for_day("Day2").count(), 2);
        assert!(list.remove("Happy"));
        assert!(!list.remove("Happy"));
        assert_eq!(list.for_day("Day2").count(), 1);
    }
}
