use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::partition::ChapterId;
use crate::engine::projection::Projection;

/// A finished quiz as kept in history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Projection key, e.g. `"k2m"`.
    pub projection: String,
    pub chapters: Vec<ChapterId>,
    pub score: usize,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

impl QuizResult {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64 * 100.0
    }

    pub fn projection_label(&self) -> &str {
        Projection::from_key(&self.projection)
            .map(Projection::label)
            .unwrap_or(self.projection.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: usize, total: usize, projection: &str) -> QuizResult {
        QuizResult {
            projection: projection.to_string(),
            chapters: vec![ChapterId::FIRST],
            score,
            total,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn percent_of_empty_quiz_is_zero() {
        assert_eq!(result(0, 0, "k2m").percent(), 0.0);
        assert!((result(3, 4, "k2m").percent() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_projection_key_is_shown_verbatim() {
        assert_eq!(result(1, 1, "k2h").projection_label(), "Kanji → Hiragana");
        assert_eq!(result(1, 1, "legacy").projection_label(), "legacy");
    }

    #[test]
    fn serializes_chapters_as_numbers() {
        let json = serde_json::to_value(result(1, 2, "m2k")).unwrap();
        assert_eq!(json["chapters"][0], 1);
    }
}
