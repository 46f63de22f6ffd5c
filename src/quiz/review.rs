use crate::{
    error::QuizError,
    models::{IncorrectWord, WordEntry, WordList},
    quiz::engine::{advance_cursor, Advance},
};

/// Words answered incorrectly, replayed until answered correctly once
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    words: WordList,
    cursor: usize,
}

impl ReviewQueue {
    pub fn new(words: WordList) -> Self {
        Self { words, cursor: 0 }
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word under the review cursor
    pub fn current(&self) -> Result<&IncorrectWord, QuizError> {
        if self.words.is_empty() {
            return Err(QuizError::EmptyReviewQueue);
        }
        self.words.get(self.cursor).ok_or(QuizError::CursorOutOfRange {
            cursor: self.cursor,
            len: self.words.len(),
        })
    }

    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        let advance = advance_cursor(self.words.len(), self.cursor).map_err(|e| match e {
            QuizError::EmptySet => QuizError::EmptyReviewQueue,
            other => other,
        })?;
        self.cursor = advance.cursor;
        Ok(advance)
    }

    /// Queue a word answered incorrectly. Returns false if already queued.
    pub fn capture(&mut self, entry: &WordEntry, date: &str) -> bool {
        self.words.insert(IncorrectWord::from_entry(entry, date))
    }

    /// Drop a word answered correctly. Returns whether it was queued.
    ///
    /// The cursor keeps pointing at the word that followed the removed one,
    /// wrapping to 0 when the removal leaves it past the end.
    pub fn graduate(&mut self, word: &str) -> bool {
        let Some(index) = self.words.rows().iter().position(|row| row.word == word) else {
            return false;
        };

        self.words.remove(word);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.words.len() {
            self.cursor = 0;
        }
        true
    }
}
