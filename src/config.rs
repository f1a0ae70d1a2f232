use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::partition::DEFAULT_CHAPTER_SIZE;
use crate::engine::projection::Projection;
use crate::session::autoplay::{DEFAULT_PERIOD_MS, clamp_period};
use crate::session::quiz::{MAX_QUESTIONS, MIN_QUESTIONS};

const MAX_CHAPTER_SIZE: usize = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_chapter_size")]
    pub chapter_size: usize,
    #[serde(default = "default_autoplay_period_ms")]
    pub autoplay_period_ms: u64,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_quiz_projection")]
    pub quiz_projection: String,
    /// Command run with the reading appended, e.g. `say -v Kyoko`. Empty disables speech.
    #[serde(default)]
    pub speech_command: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_chapter_size() -> usize {
    DEFAULT_CHAPTER_SIZE
}
fn default_autoplay_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}
fn default_question_count() -> usize {
    MIN_QUESTIONS
}
fn default_quiz_projection() -> String {
    Projection::default().key().to_string()
}
fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chapter_size: default_chapter_size(),
            autoplay_period_ms: default_autoplay_period_ms(),
            question_count: default_question_count(),
            quiz_projection: default_quiz_projection(),
            speech_command: String::new(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kotoba")
            .join("config.toml")
    }

    /// Clamp numeric fields into range and reset an unknown projection key.
    pub fn validate(&mut self) {
        self.chapter_size = self.chapter_size.clamp(1, MAX_CHAPTER_SIZE);
        self.autoplay_period_ms = clamp_period(self.autoplay_period_ms);
        self.question_count = self.question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS);
        if Projection::from_key(&self.quiz_projection).is_none() {
            self.quiz_projection = default_quiz_projection();
        }
    }

    pub fn projection(&self) -> Projection {
        Projection::from_key(&self.quiz_projection).unwrap_or_default()
    }
}
