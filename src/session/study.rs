use std::sync::Arc;

use crate::card::Card;
use crate::engine::partition::{ChapterId, ChapterMap, repartition};
use crate::session::autoplay::AutoplaySignal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StudyCursor {
    pub chapter: ChapterId,
    pub index: usize,
}

impl Default for StudyCursor {
    fn default() -> Self {
        Self {
            chapter: ChapterId::FIRST,
            index: 0,
        }
    }
}

/// Which side of the current card is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CardFace {
    #[default]
    Front,
    Back,
}

impl CardFace {
    fn toggled(self) -> Self {
        match self {
            CardFace::Front => CardFace::Back,
            CardFace::Back => CardFace::Front,
        }
    }
}

/// Chapter map snapshot plus the study cursor and visible face.
///
/// The map is only ever replaced as a whole (`Arc` swap), so anything holding
/// an earlier snapshot keeps a consistent view.
pub struct StudySession {
    chapters: Arc<ChapterMap>,
    cursor: StudyCursor,
    face: CardFace,
}

impl StudySession {
    pub fn new(chapters: ChapterMap) -> Self {
        Self {
            chapters: Arc::new(chapters),
            cursor: StudyCursor::default(),
            face: CardFace::Front,
        }
    }

    pub fn chapters(&self) -> Arc<ChapterMap> {
        Arc::clone(&self.chapters)
    }

    pub fn cursor(&self) -> StudyCursor {
        self.cursor
    }

    pub fn face(&self) -> CardFace {
        self.face
    }

    pub fn total_cards(&self) -> usize {
        self.chapters.total()
    }

    pub fn current_cards(&self) -> &[Card] {
        self.chapters.get(self.cursor.chapter)
    }

    pub fn current_len(&self) -> usize {
        self.current_cards().len()
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current_cards().get(self.cursor.index)
    }

    /// Cursor plus the current chapter length, for the autoplay coordinator.
    pub fn cursor_mut(&mut self) -> (&mut StudyCursor, usize) {
        let len = self.chapters.chapter_len(self.cursor.chapter);
        (&mut self.cursor, len)
    }

    pub fn select_chapter(&mut self, chapter: ChapterId) {
        self.cursor = StudyCursor { chapter, index: 0 };
        self.face = CardFace::Front;
    }

    pub fn next(&mut self) {
        let len = self.current_len();
        if len > 0 {
            self.cursor.index = (self.cursor.index + 1) % len;
        }
        self.face = CardFace::Front;
    }

    pub fn prev(&mut self) {
        self.cursor.index = self.cursor.index.saturating_sub(1);
        self.face = CardFace::Front;
    }

    /// Toggle the visible face. Returns the face now showing; an empty
    /// chapter always stays on the front.
    pub fn flip(&mut self) -> CardFace {
        if self.current_card().is_some() {
            self.face = self.face.toggled();
        }
        self.face
    }

    pub fn show_front(&mut self) {
        self.face = CardFace::Front;
    }

    /// Renderer side of an autoplay signal. Returns the new face when the
    /// signal changed it.
    pub fn apply_signal(&mut self, signal: AutoplaySignal) -> Option<CardFace> {
        match signal {
            AutoplaySignal::Flip => {
                let before = self.face;
                let after = self.flip();
                (before != after).then_some(after)
            }
            AutoplaySignal::Advance { index } => {
                if index < self.current_len() {
                    self.cursor.index = index;
                }
                let changed = self.face != CardFace::Front;
                self.face = CardFace::Front;
                changed.then_some(CardFace::Front)
            }
        }
    }

    /// Add freshly parsed cards, redistribute everything and restart from
    /// chapter 1. Returns the new snapshot.
    pub fn import(&mut self, cards: Vec<Card>, chapter_size: usize) -> Arc<ChapterMap> {
        let next = repartition(&self.chapters, cards, chapter_size);
        self.chapters = Arc::new(next);
        self.cursor = StudyCursor::default();
        self.face = CardFace::Front;
        self.chapters()
    }

    /// Replace the chapter map wholesale, e.g. when the chapter size changes.
    pub fn replace(&mut self, chapters: ChapterMap) {
        self.chapters = Arc::new(chapters);
        self.cursor = StudyCursor::default();
        self.face = CardFace::Front;
    }

    /// Attach an encoded image to one card. Returns false if there is no card
    /// at that position.
    pub fn attach_image(&mut self, chapter: ChapterId, index: usize, data_uri: String) -> bool {
        if self.chapters.card(chapter, index).is_none() {
            return false;
        }
        let map = Arc::make_mut(&mut self.chapters);
        match map.card_mut(chapter, index) {
            Some(card) => {
                card.image = Some(data_uri);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parser::parse_block;

    fn session_with(text: &str, size: usize) -> StudySession {
        let mut session = StudySession::new(ChapterMap::default());
        session.import(parse_block(text).cards, size);
        session
    }

    const THREE: &str = "1. 魚（さかな）＝ Fish\n2. 水（みず）＝ Water\n3. 山（やま）＝ Mountain";

    #[test]
    fn empty_session_has_no_card() {
        let mut session = StudySession::new(ChapterMap::default());
        assert!(session.current_card().is_none());
        session.next();
        session.prev();
        assert_eq!(session.cursor().index, 0);
        assert_eq!(session.flip(), CardFace::Front);
    }

    #[test]
    fn next_wraps_and_prev_clamps() {
        let mut session = session_with(THREE, 10);
        session.prev();
        assert_eq!(session.cursor().index, 0);
        session.next();
        session.next();
        assert_eq!(session.current_card().unwrap().kanji, "山");
        session.next();
        assert_eq!(session.cursor().index, 0);
    }

    #[test]
    fn navigation_shows_front() {
        let mut session = session_with(THREE, 10);
        assert_eq!(session.flip(), CardFace::Back);
        session.next();
        assert_eq!(session.face(), CardFace::Front);
    }

    #[test]
    fn import_resets_cursor_to_first_chapter() {
        let mut session = session_with(THREE, 1);
        session.select_chapter(ChapterId::new(3).unwrap());
        assert_eq!(session.current_card().unwrap().kanji, "山");

        session.import(parse_block("川（かわ）＝ River").cards, 1);
        assert_eq!(session.cursor(), StudyCursor::default());
        assert_eq!(session.total_cards(), 4);
        assert_eq!(
            session.chapters().get(ChapterId::new(4).unwrap())[0].kanji,
            "川"
        );
    }

    #[test]
    fn readers_keep_their_snapshot_across_import() {
        let mut session = session_with(THREE, 10);
        let before = session.chapters();
        session.import(parse_block("川（かわ）＝ River").cards, 10);
        assert_eq!(before.total(), 3);
        assert_eq!(session.chapters().total(), 4);
    }

    #[test]
    fn attach_image_is_copy_on_write() {
        let mut session = session_with(THREE, 10);
        let before = session.chapters();
        assert!(session.attach_image(ChapterId::FIRST, 1, "data:image/png;base64,AA==".into()));
        assert!(before.card(ChapterId::FIRST, 1).unwrap().image.is_none());
        assert_eq!(
            session.chapters().card(ChapterId::FIRST, 1).unwrap().image.as_deref(),
            Some("data:image/png;base64,AA==")
        );
    }

    #[test]
    fn attach_image_out_of_range_is_rejected() {
        let mut session = session_with(THREE, 10);
        assert!(!session.attach_image(ChapterId::FIRST, 9, "data:,".into()));
        assert!(!session.attach_image(ChapterId::LAST, 0, "data:,".into()));
    }

    #[test]
    fn flip_signal_toggles_once_per_signal() {
        let mut session = session_with(THREE, 10);
        assert_eq!(session.apply_signal(AutoplaySignal::Flip), Some(CardFace::Back));
        assert_eq!(session.apply_signal(AutoplaySignal::Flip), Some(CardFace::Front));
        assert_eq!(session.apply_signal(AutoplaySignal::Flip), Some(CardFace::Back));
        assert_eq!(
            session.apply_signal(AutoplaySignal::Advance { index: 1 }),
            Some(CardFace::Front)
        );
        assert_eq!(session.apply_signal(AutoplaySignal::Advance { index: 2 }), None);
        assert_eq!(session.cursor().index, 2);
        assert_eq!(session.current_card().unwrap().kanji, "山");
    }
}
