use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng,
};

use crate::{
    error::QuizError,
    models::{AnswerRecord, AnswerResult, WordEntry, WordSet},
};

/// Default number of choices shown per question
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Result of moving the cursor forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub cursor: usize,
    /// True when the cursor wrapped back to the first word
    pub wrapped: bool,
}

/// Return the entry under the cursor and its meaning as the correct answer
pub fn current_item(set: &WordSet, cursor: usize) -> Result<(&WordEntry, &str), QuizError> {
    if set.is_empty() {
        return Err(QuizError::EmptySet);
    }

    let entry = set.get(cursor).ok_or(QuizError::CursorOutOfRange {
        cursor,
        len: set.len(),
    })?;

    Ok((entry, entry.meaning.as_str()))
}

/// Build a shuffled list of answer choices.
///
/// Distractors are drawn without replacement from the distinct meanings of
/// `pool`, never repeating `correct_answer`. The result always contains the
/// correct answer exactly once and has `min(option_count, distinct available)`
/// entries. Options are never invented when the pool is too small.
pub fn generate_options<R: Rng + ?Sized>(
    pool: &[WordEntry],
    correct_answer: &str,
    option_count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut distinct: Vec<&str> = Vec::new();
    for entry in pool {
        let meaning = entry.meaning.as_str();
        if meaning != correct_answer && !distinct.contains(&meaning) {
            distinct.push(meaning);
        }
    }

    let wanted = option_count.saturating_sub(1);
    let mut options: Vec<String> = distinct
        .choose_multiple(rng, wanted)
        .map(|meaning| meaning.to_string())
        .collect();

    options.push(correct_answer.to_string());
    options.shuffle(rng);
    options
}

/// Compare a selection with the correct answer
pub fn judge(selected: &str, correct_answer: &str, entry: &WordEntry) -> AnswerRecord {
    let result = if selected == correct_answer {
        AnswerResult::Correct
    } else {
        AnswerResult::Incorrect
    };

    AnswerRecord {
        word: entry.word.clone(),
        result,
        day: entry.day.clone(),
    }
}

/// Move the cursor one step, wrapping to 0 past the end
pub fn advance_cursor(len: usize, cursor: usize) -> Result<Advance, QuizError> {
    if len == 0 {
        return Err(QuizError::EmptySet);
    }

    let next = cursor + 1;
    if next >= len {
        Ok(Advance {
            cursor: 0,
            wrapped: true,
        })
    } else {
        Ok(Advance {
            cursor: next,
            wrapped: false,
        })
    }
}

/// Draw a random cursor, avoiding the current word when there is another
pub fn random_cursor<R: Rng + ?Sized>(len: usize, cursor: usize, rng: &mut R) -> Result<Advance, QuizError> {
    if len == 0 {
        return Err(QuizError::EmptySet);
    }
    if len == 1 {
        return Ok(Advance {
            cursor: 0,
            wrapped: false,
        });
    }

    let mut next = rng.random_range(0..len - 1);
    if next >= cursor {
        next += 1;
    }
    Ok(Advance {
        cursor: next.min(len - 1),
        wrapped: false,
    })
}

/// Append-only log of answered questions
#[derive(Debug, Clone, Default)]
pub struct AnswerLog {
    records: Vec<AnswerRecord>,
}

impl AnswerLog {
    /// Judge one answer and append exactly one record
    pub fn record(&mut self, selected: &str, correct_answer: &str, entry: &WordEntry) -> AnswerRecord {
        let record = judge(selected, correct_answer, entry);
        self.records.push(record.clone());
        record
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
