use serde::{Deserialize, Serialize};

use crate::engine::partition::ChapterMap;
use crate::session::result::QuizResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Oldest results are dropped beyond this many.
pub const MAX_QUIZ_HISTORY: usize = 500;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Snapshot of every card, keyed by chapter. Files written before versioning
/// (bare `{"cardsByChapter": ...}`) load as the current version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(rename = "cardsByChapter", default)]
    pub cards_by_chapter: ChapterMap,
}

impl Default for DeckData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            cards_by_chapter: ChapterMap::default(),
        }
    }
}

/// Borrowing twin of [`DeckData`] so saving doesn't clone image payloads.
#[derive(Serialize)]
pub(crate) struct DeckDataRef<'a> {
    pub schema_version: u32,
    #[serde(rename = "cardsByChapter")]
    pub cards_by_chapter: &'a ChapterMap,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizHistoryData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub results: Vec<QuizResult>,
}

impl Default for QuizHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            results: Vec::new(),
        }
    }
}
