use crate::models::{MarkedWord, WordEntry, WordList};

/// Toggle `entry` in the marked checklist.
///
/// Adds the word when absent and removes it when present. Returns whether the
/// word is marked afterwards.
pub fn toggle_mark(marked: &mut WordList, entry: &WordEntry, date: &str) -> bool {
    if marked.remove(&entry.word) {
        tracing::debug!("Unmarked word {}", entry.word);
        return false;
    }

    marked.insert(MarkedWord::from_entry(entry, date));
    tracing::debug!("Marked word {}", entry.word);
    true
}
