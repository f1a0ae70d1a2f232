use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::engine::partition::ChapterMap;
use crate::session::result::QuizResult;
use crate::store::schema::{
    DeckData, DeckDataRef, MAX_QUIZ_HISTORY, QuizHistoryData, SCHEMA_VERSION,
};

const DECK_FILE: &str = "deck.json";
const QUIZ_HISTORY_FILE: &str = "quiz_history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kotoba");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing files load as the default; unreadable or malformed ones too,
    /// with a warning.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("{} is malformed, starting empty: {e}", path.display());
                    T::default()
                }
            },
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_deck(&self) -> ChapterMap {
        let data: DeckData = self.load(DECK_FILE);
        if data.schema_version > SCHEMA_VERSION {
            log::warn!(
                "deck schema {} is newer than supported {}, reading what is compatible",
                data.schema_version,
                SCHEMA_VERSION
            );
        }
        data.cards_by_chapter
    }

    pub fn save_deck(&self, chapters: &ChapterMap) -> Result<()> {
        self.save(
            DECK_FILE,
            &DeckDataRef {
                schema_version: SCHEMA_VERSION,
                cards_by_chapter: chapters,
            },
        )
    }

    pub fn load_quiz_history(&self) -> Vec<QuizResult> {
        let data: QuizHistoryData = self.load(QUIZ_HISTORY_FILE);
        data.results
    }

    pub fn save_quiz_history(&self, results: &[QuizResult]) -> Result<()> {
        let start = results.len().saturating_sub(MAX_QUIZ_HISTORY);
        self.save(
            QUIZ_HISTORY_FILE,
            &QuizHistoryData {
                schema_version: SCHEMA_VERSION,
                results: results[start..].to_vec(),
            },
        )
    }
}
