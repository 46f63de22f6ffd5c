// Quiz engine: option generation, cursor movement, answer tracking

pub mod engine;
pub mod marks;
pub mod review;
pub mod stats;

pub use engine::{advance_cursor, current_item, generate_options, random_cursor, Advance, AnswerLog};
pub use marks::toggle_mark;
pub use review::ReviewQueue;
pub use stats::{summarize, ProgressSummary};
