use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::QuizError,
    models::{AnswerRecord, AnswerResult, LearnOrder, Mode, NavAction, WordEntry, WordList, WordSet},
    quiz::{self, Advance, AnswerLog, ReviewQueue},
    storage::{self, FileStore, INCORRECT_WORDS_FILE, MARKED_WORDS_FILE, STUDY_RECORDS_FILE},
    vocabulary::Vocabulary,
    AppState,
};

/// Header carrying the session id
pub const SESSION_HEADER: &str = "x-session-id";
/// Query parameter carrying the session id when no header is sent
pub const SESSION_QUERY_PARAM: &str = "session";

/// Timestamp format of the persisted `Date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// A question currently on screen
#[derive(Debug, Clone)]
pub struct Question {
    pub entry: WordEntry,
    pub correct_answer: String,
    pub options: Vec<String>,
    /// Outcome of the latest answer to this question
    pub outcome: Option<AnswerResult>,
    /// Set once an answer removed this word from the review queue
    pub graduated: bool,
}

/// Result of answering a learn question
#[derive(Debug, Clone)]
pub struct LearnOutcome {
    pub record: AnswerRecord,
    pub correct_answer: String,
    /// Whether the incorrect-word list changed and needs saving
    pub review_changed: bool,
}

/// Result of answering a review question
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub record: AnswerRecord,
    pub correct_answer: String,
    pub graduated: bool,
}

/// Everything one user works with. Handlers receive it explicitly.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub mode: Mode,
    pub selected_days: Vec<String>,
    pub order: LearnOrder,
    pub word_set: WordSet,
    pub cursor: usize,
    pub question: Option<Question>,
    pub answers: AnswerLog,
    pub known_words: Vec<String>,
    pub unknown_words: Vec<String>,
    /// Marked checklist, loaded from the store on first use
    pub marked: Option<WordList>,
    /// Incorrect-word queue, loaded from the store on first use
    pub review: Option<ReviewQueue>,
    pub review_question: Option<Question>,
    rng: StdRng,
}

impl Session {
    pub fn new(id: Uuid, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            id,
            mode: Mode::Home,
            selected_days: Vec::new(),
            order: LearnOrder::default(),
            word_set: WordSet::default(),
            cursor: 0,
            question: None,
            answers: AnswerLog::default(),
            known_words: Vec::new(),
            unknown_words: Vec::new(),
            marked: None,
            review: None,
            review_question: None,
            rng,
        }
    }

    /// Rebuild the word set for the chosen days. The previous set is kept
    /// when the new one would be empty.
    pub fn select_days(
        &mut self,
        vocabulary: &Vocabulary,
        days: Vec<String>,
        order: LearnOrder,
    ) -> Result<usize, QuizError> {
        if vocabulary.is_empty() {
            return Err(QuizError::NoData);
        }

        let word_set = vocabulary.select(&days);
        if word_set.is_empty() {
            return Err(QuizError::EmptySet);
        }

        tracing::debug!(
            "Session {} selected {} words from days {:?} ({:?})",
            self.id,
            word_set.len(),
            days,
            order
        );

        self.cursor = match order {
            LearnOrder::Sequential => 0,
            LearnOrder::Random => self.rng.random_range(0..word_set.len()),
        };
        self.selected_days = days;
        self.order = order;
        self.word_set = word_set;
        self.question = None;
        self.review_question = None;
        Ok(self.word_set.len())
    }

    pub fn navigate(&mut self, action: NavAction) -> Result<Mode, QuizError> {
        let next = self
            .mode
            .transition(action)
            .ok_or_else(|| QuizError::InvalidTransition {
                from: format!("{:?}", self.mode),
                to: format!("{:?}", action.target()),
            })?;

        if next.requires_words() && self.word_set.is_empty() {
            return Err(QuizError::EmptySet);
        }

        self.mode = next;
        Ok(next)
    }

    pub fn require_mode(&self, expected: Mode) -> Result<(), QuizError> {
        if self.mode != expected {
            return Err(QuizError::WrongMode {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", self.mode),
            });
        }
        Ok(())
    }

    /// Question for the word under the cursor, built on first request
    pub fn learn_question(&mut self, option_count: usize) -> Result<&Question, QuizError> {
        if self.question.is_none() {
            let (entry, correct_answer) = quiz::current_item(&self.word_set, self.cursor)?;
            let options = quiz::generate_options(
                self.word_set.entries(),
                correct_answer,
                option_count,
                &mut self.rng,
            );
            self.question = Some(Question {
                entry: entry.clone(),
                correct_answer: correct_answer.to_string(),
                options,
                outcome: None,
                graduated: false,
            });
        }

        self.question.as_ref().ok_or(QuizError::NoActiveQuestion)
    }

    /// Record an answer to the learn question.
    ///
    /// A miss queues the word for review. A hit only clears it from the
    /// queue when `clear_review_on_learn` is set. The review queue must
    /// already be loaded for either to happen.
    pub fn answer_learn(
        &mut self,
        selected: &str,
        clear_review_on_learn: bool,
        date: &str,
    ) -> Result<LearnOutcome, QuizError> {
        let question = self.question.as_mut().ok_or(QuizError::NoActiveQuestion)?;
        let record = self
            .answers
            .record(selected, &question.correct_answer, &question.entry);
        question.outcome = Some(record.result);

        let mut review_changed = false;
        match record.result {
            AnswerResult::Correct => {
                self.known_words.push(record.word.clone());
                if clear_review_on_learn {
                    if let Some(review) = self.review.as_mut() {
                        review_changed = review.graduate(&record.word);
                    }
                }
            }
            AnswerResult::Incorrect => {
                self.unknown_words.push(record.word.clone());
                if let Some(review) = self.review.as_mut() {
                    review_changed = review.capture(&question.entry, date);
                }
            }
        }

        Ok(LearnOutcome {
            correct_answer: question.correct_answer.clone(),
            record,
            review_changed,
        })
    }

    /// Move to the next learn word and draw fresh options.
    /// Random order never wraps.
    pub fn next_learn(&mut self, option_count: usize) -> Result<Advance, QuizError> {
        let advance = match self.order {
            LearnOrder::Sequential => quiz::advance_cursor(self.word_set.len(), self.cursor)?,
            LearnOrder::Random => {
                quiz::random_cursor(self.word_set.len(), self.cursor, &mut self.rng)?
            }
        };
        self.cursor = advance.cursor;
        self.question = None;
        self.learn_question(option_count)?;
        Ok(advance)
    }

    /// Word under the learn cursor
    pub fn current_entry(&self) -> Result<&WordEntry, QuizError> {
        quiz::current_item(&self.word_set, self.cursor).map(|(entry, _)| entry)
    }

    pub fn is_marked(&self, word: &str) -> bool {
        self.marked.as_ref().is_some_and(|marked| marked.contains(word))
    }

    /// Toggle the mark on the word under the learn cursor.
    /// Returns the word and whether it is now marked.
    ///
    /// The checklist must be loaded first, otherwise saving would replace
    /// the stored file with this one word.
    pub fn toggle_current_mark(&mut self, date: &str) -> Result<(String, bool), QuizError> {
        let entry = self.current_entry()?.clone();
        let marked = self
            .marked
            .as_mut()
            .ok_or_else(|| QuizError::ListNotLoaded("marked".to_string()))?;
        let now_marked = quiz::toggle_mark(marked, &entry, date);
        Ok((entry.word, now_marked))
    }

    /// Question for the review word under the review cursor.
    /// Options are drawn from the selected word set.
    pub fn review_question(&mut self, option_count: usize) -> Result<&Question, QuizError> {
        if self.review_question.is_none() {
            let review = self.review.as_ref().ok_or(QuizError::EmptyReviewQueue)?;
            let row = review.current()?;
            let entry = WordEntry {
                day: Some(row.day.clone()),
                word: row.word.clone(),
                meaning: row.meaning.clone(),
            };
            let options = quiz::generate_options(
                self.word_set.entries(),
                &entry.meaning,
                option_count,
                &mut self.rng,
            );
            self.review_question = Some(Question {
                correct_answer: entry.meaning.clone(),
                entry,
                options,
                outcome: None,
                graduated: false,
            });
        }

        self.review_question.as_ref().ok_or(QuizError::NoActiveQuestion)
    }

    /// Record a review answer. A correct answer graduates the word.
    pub fn answer_review(&mut self, selected: &str) -> Result<ReviewOutcome, QuizError> {
        let question = self
            .review_question
            .as_mut()
            .ok_or(QuizError::NoActiveQuestion)?;
        let record = self
            .answers
            .record(selected, &question.correct_answer, &question.entry);
        question.outcome = Some(record.result);

        let graduated = record.result.is_correct()
            && self
                .review
                .as_mut()
                .is_some_and(|review| review.graduate(&record.word));
        question.graduated |= graduated;

        Ok(ReviewOutcome {
            correct_answer: question.correct_answer.clone(),
            record,
            graduated,
        })
    }

    /// Move to the next review word.
    ///
    /// After a graduation the cursor already points at the following word,
    /// so it is not advanced again.
    pub fn next_review(&mut self, option_count: usize) -> Result<Advance, QuizError> {
        let graduated = self.review_question.as_ref().is_some_and(|q| q.graduated);
        let review = self.review.as_mut().ok_or(QuizError::EmptyReviewQueue)?;

        let advance = if graduated {
            if review.is_empty() {
                return Err(QuizError::EmptyReviewQueue);
            }
            Advance {
                cursor: review.cursor(),
                wrapped: false,
            }
        } else {
            review.advance()?
        };

        self.review_question = None;
        self.review_question(option_count)?;
        Ok(advance)
    }

    /// Load the incorrect-word queue if this session has not yet.
    /// Returns a warning when the store could not provide it.
    pub async fn ensure_review_loaded(&mut self, store: &dyn FileStore) -> Option<String> {
        if self.review.is_some() {
            return None;
        }
        let loaded = storage::load_list(store, INCORRECT_WORDS_FILE).await;
        self.review = Some(ReviewQueue::new(loaded.list));
        self.review_question = None;
        loaded.warning
    }

    /// Load the marked checklist if this session has not yet
    pub async fn ensure_marked_loaded(&mut self, store: &dyn FileStore) -> Option<String> {
        if self.marked.is_some() {
            return None;
        }
        let loaded = storage::load_list(store, MARKED_WORDS_FILE).await;
        self.marked = Some(loaded.list);
        loaded.warning
    }

    /// Export this session's answer records.
    /// Fails when nothing was answered; a store failure is returned as a warning.
    pub async fn save_records(&self, store: &dyn FileStore) -> Result<Option<String>, QuizError> {
        if self.answers.is_empty() {
            return Err(QuizError::NoRecords);
        }
        match storage::save_records(store, self.answers.records()).await {
            Ok(()) => Ok(None),
            Err(e) => {
                tracing::warn!("Session {} failed to save study records: {}", self.id, e);
                Ok(Some(format!("Could not save {}: {}", STUDY_RECORDS_FILE, e)))
            }
        }
    }

    /// Persist the incorrect-word queue. Returns a warning on failure.
    pub async fn save_review(&self, store: &dyn FileStore) -> Option<String> {
        let review = self.review.as_ref()?;
        match storage::save_list(store, INCORRECT_WORDS_FILE, review.words()).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Session {} failed to save incorrect words: {}", self.id, e);
                Some(format!("Could not save {}: {}", INCORRECT_WORDS_FILE, e))
            }
        }
    }

    /// Persist the marked checklist. Returns a warning on failure.
    pub async fn save_marked(&self, store: &dyn FileStore) -> Option<String> {
        let marked = self.marked.as_ref()?;
        match storage::save_marked(store, marked).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("Session {} failed to save marked words: {}", self.id, e);
                Some(format!("Could not save {}: {}", MARKED_WORDS_FILE, e))
            }
        }
    }
}

/// A session as kept in the application state
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub session: Arc<Mutex<Session>>,
    pub last_seen: Instant,
}

/// Register a new session, dropping sessions idle longer than the configured timeout
pub fn create_session(state: &AppState) -> Uuid {
    let removed = purge_idle_sessions(state, state.config.session_idle_timeout(), Instant::now());
    if removed > 0 {
        tracing::info!("Removed {} idle sessions", removed);
    }

    let id = Uuid::new_v4();
    let session = Session::new(id, state.config.quiz.seed);
    state.sessions.insert(
        id,
        SessionEntry {
            session: Arc::new(Mutex::new(session)),
            last_seen: Instant::now(),
        },
    );
    tracing::info!("Created session {}", id);
    id
}

/// Remove sessions not seen within `idle_timeout` of `now`
pub fn purge_idle_sessions(state: &AppState, idle_timeout: Duration, now: Instant) -> usize {
    let stale: Vec<Uuid> = state
        .sessions
        .iter()
        .filter(|entry| now.duration_since(entry.last_seen) > idle_timeout)
        .map(|entry| *entry.key())
        .collect();

    for id in &stale {
        state.sessions.remove(id);
        tracing::debug!("Session {} expired", id);
    }
    stale.len()
}

/// Extractor resolving the caller's session
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub id: Uuid,
    pub session: Arc<Mutex<Session>>,
}

impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = Arc::<AppState>::from_ref(state);

        // Try the header first, then the query string
        let raw_id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(String::from)
            .or_else(|| {
                parts
                    .uri
                    .query()
                    .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
                    .and_then(|params| {
                        params
                            .iter()
                            .find(|(k, _)| k == SESSION_QUERY_PARAM)
                            .map(|(_, v)| v.clone())
                    })
            });

        async move {
            let raw_id = raw_id.ok_or(StatusCode::UNAUTHORIZED)?;
            let id = Uuid::parse_str(raw_id.trim()).map_err(|_| StatusCode::UNAUTHORIZED)?;

            let mut entry = app_state.sessions.get_mut(&id).ok_or_else(|| {
                tracing::debug!("Unknown session {}", id);
                StatusCode::NOT_FOUND
            })?;
            entry.last_seen = Instant::now();

            Ok(ActiveSession {
                id,
                session: entry.session.clone(),
            })
        }
    }
}
