use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{env, str::FromStr, time::Duration};

use crate::quiz::engine::DEFAULT_OPTION_COUNT;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub storage: StorageConfig,
    pub quiz: QuizConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Path or http(s) URL of the word list
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Local,
    Http,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "local" => Ok(StorageBackend::Local),
            "http" => Ok(StorageBackend::Http),
            other => bail!("unknown storage backend '{}' (expected memory, local or http)", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub dir: String,
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    pub option_count: usize,
    /// Also drop a word from the review queue when it is answered correctly while learning
    pub clear_review_on_learn: bool,
    pub reveal_delay_ms: u64,
    /// Fixed seed for option shuffling; random per session when unset
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
}

/// Fewest choices a multiple-choice question can show
pub const MIN_OPTION_COUNT: usize = 2;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            frontend_dir: env::var("FRONTEND_DIR")
                .unwrap_or_else(|_| "./frontend".to_string()),
        };

        let dataset = DatasetConfig {
            source: env::var("DATASET_SOURCE")
                .unwrap_or_else(|_| "./words.csv".to_string()),
        };

        let storage = StorageConfig {
            backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "local".to_string())
                .parse()
                .context("STORAGE_BACKEND is invalid")?,
            dir: env::var("STORAGE_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            url: env::var("STORAGE_URL").ok().filter(|s| !s.is_empty()),
            token: env::var("STORAGE_TOKEN").ok().filter(|s| !s.is_empty()),
        };

        let option_count: usize = env::var("QUIZ_OPTION_COUNT")
            .unwrap_or_else(|_| DEFAULT_OPTION_COUNT.to_string())
            .parse()
            .context("QUIZ_OPTION_COUNT must be a number")?;
        if option_count < MIN_OPTION_COUNT {
            bail!("QUIZ_OPTION_COUNT must be at least {}", MIN_OPTION_COUNT);
        }

        let quiz = QuizConfig {
            option_count,
            clear_review_on_learn: env::var("QUIZ_CLEAR_REVIEW_ON_LEARN")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            reveal_delay_ms: env::var("QUIZ_REVEAL_DELAY_MS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .unwrap_or(1500),
            seed: match env::var("QUIZ_SEED") {
                Ok(v) => Some(v.parse().context("QUIZ_SEED must be a number")?),
                Err(_) => None,
            },
        };

        let session = SessionConfig {
            idle_timeout_secs: env::var("SESSION_IDLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
        };

        Ok(Config {
            server,
            dataset,
            storage,
            quiz,
            session,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.quiz.reveal_delay_ms)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session.idle_timeout_secs)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_dir: "./frontend".to_string(),
        },
        dataset: DatasetConfig {
            source: "./words.csv".to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            dir: "./data".to_string(),
            url: None,
            token: None,
        },
        quiz: QuizConfig {
            option_count: DEFAULT_OPTION_COUNT,
            clear_review_on_learn: false,
            reveal_delay_ms: 0,
            seed: Some(7),
        },
        session: SessionConfig {
            idle_timeout_secs: 3600,
        },
    }
}
