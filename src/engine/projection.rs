use std::fmt;

use crate::card::Card;

/// Joins reading and meaning in the combined projection.
pub const ANSWER_SEPARATOR: &str = " — ";

/// Which card field is asked and which is expected back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    KanjiToMeaning,
    MeaningToKanji,
    KanjiToHiragana,
    KanjiToReadingAndMeaning,
}

impl Projection {
    pub const ALL: [Projection; 4] = [
        Projection::KanjiToMeaning,
        Projection::MeaningToKanji,
        Projection::KanjiToHiragana,
        Projection::KanjiToReadingAndMeaning,
    ];

    /// Stable key stored in config and quiz history.
    pub fn key(self) -> &'static str {
        match self {
            Projection::KanjiToMeaning => "k2m",
            Projection::MeaningToKanji => "m2k",
            Projection::KanjiToHiragana => "k2h",
            Projection::KanjiToReadingAndMeaning => "k2hm",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Projection::KanjiToMeaning => "Kanji → Meaning",
            Projection::MeaningToKanji => "Meaning → Kanji",
            Projection::KanjiToHiragana => "Kanji → Hiragana",
            Projection::KanjiToReadingAndMeaning => "Kanji → Hiragana + Meaning",
        }
    }

    pub fn question(self, card: &Card) -> String {
        match self {
            Projection::MeaningToKanji => card.meaning.clone(),
            _ => card.kanji.clone(),
        }
    }

    pub fn answer(self, card: &Card) -> String {
        match self {
            Projection::KanjiToMeaning => card.meaning.clone(),
            Projection::MeaningToKanji => card.kanji.clone(),
            Projection::KanjiToHiragana => card.hiragana.clone(),
            Projection::KanjiToReadingAndMeaning => {
                format!("{}{ANSWER_SEPARATOR}{}", card.hiragana, card.meaning)
            }
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Exact comparison after trimming the submission. No case or width folding.
pub fn is_correct(submitted: &str, expected: &str) -> bool {
    submitted.trim() == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fish() -> Card {
        Card {
            kanji: "魚".to_string(),
            hiragana: "さかな".to_string(),
            meaning: "Fish".to_string(),
            number: Some(1),
            image: None,
        }
    }

    #[test]
    fn projections_pick_expected_fields() {
        let card = fish();
        assert_eq!(Projection::KanjiToMeaning.question(&card), "魚");
        assert_eq!(Projection::KanjiToMeaning.answer(&card), "Fish");
        assert_eq!(Projection::MeaningToKanji.question(&card), "Fish");
        assert_eq!(Projection::MeaningToKanji.answer(&card), "魚");
        assert_eq!(Projection::KanjiToHiragana.answer(&card), "さかな");
        assert_eq!(
            Projection::KanjiToReadingAndMeaning.answer(&card),
            "さかな — Fish"
        );
    }

    #[test]
    fn keys_round_trip() {
        for p in Projection::ALL {
            assert_eq!(Projection::from_key(p.key()), Some(p));
        }
        assert_eq!(Projection::from_key("kanji"), None);
    }

    #[test]
    fn cycling_visits_every_projection() {
        let mut p = Projection::default();
        for _ in 0..Projection::ALL.len() {
            p = p.next();
        }
        assert_eq!(p, Projection::default());
        assert_eq!(Projection::KanjiToMeaning.prev(), Projection::KanjiToReadingAndMeaning);
    }

    #[test]
    fn scoring_trims_submission_only() {
        assert!(is_correct("  Fish \n", "Fish"));
        assert!(!is_correct("fish", "Fish"));
        assert!(!is_correct("", "Fish"));
        assert!(!is_correct("Fish", " Fish"));
    }
}
