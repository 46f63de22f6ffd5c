pub mod mode;
pub mod record;
pub mod word;

pub use mode::{LearnOrder, Mode, NavAction};
pub use record::{AnswerRecord, AnswerResult};
pub use word::{IncorrectWord, MarkedWord, TrackedWord, WordEntry, WordList, WordSet};
