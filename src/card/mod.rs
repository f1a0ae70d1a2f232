pub mod image;
pub mod parser;

use serde::{Deserialize, Serialize};

/// One vocabulary entry. Built by [`parser::parse_line`]; only the image
/// attachment changes after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub kanji: String,
    pub hiragana: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Card {
    /// Text handed to the speech collaborator when the back face is revealed.
    pub fn pronunciation(&self) -> &str {
        &self.hiragana
    }
}
