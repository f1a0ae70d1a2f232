use std::collections::BTreeSet;

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::card::Card;
use crate::engine::partition::{ChapterId, ChapterMap};
use crate::engine::projection::{Projection, is_correct};
use crate::session::result::QuizResult;

pub const MIN_QUESTIONS: usize = 10;
pub const MAX_QUESTIONS: usize = 100;
pub const QUESTION_STEP: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("select at least one chapter")]
    NoChaptersSelected,
    #[error("no quiz is in progress")]
    NotActive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizPhase {
    Setup,
    Active,
    Completed,
}

/// What the learner picked before starting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSetup {
    pub chapters: BTreeSet<ChapterId>,
    question_count: usize,
    pub projection: Projection,
}

impl Default for QuizSetup {
    fn default() -> Self {
        Self::new(MIN_QUESTIONS, Projection::default())
    }
}

impl QuizSetup {
    /// All chapters selected.
    pub fn new(question_count: usize, projection: Projection) -> Self {
        Self {
            chapters: ChapterId::all().collect(),
            question_count: question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS),
            projection,
        }
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    pub fn set_question_count(&mut self, count: usize) {
        self.question_count = count.clamp(MIN_QUESTIONS, MAX_QUESTIONS);
    }

    pub fn more_questions(&mut self) {
        self.set_question_count(self.question_count + QUESTION_STEP);
    }

    pub fn fewer_questions(&mut self) {
        self.set_question_count(self.question_count.saturating_sub(QUESTION_STEP));
    }

    pub fn toggle_chapter(&mut self, chapter: ChapterId) {
        if !self.chapters.remove(&chapter) {
            self.chapters.insert(chapter);
        }
    }

    pub fn select_all(&mut self) {
        self.chapters = ChapterId::all().collect();
    }

    pub fn clear_chapters(&mut self) {
        self.chapters.clear();
    }

    pub fn is_selected(&self, chapter: ChapterId) -> bool {
        self.chapters.contains(&chapter)
    }

    /// Cards available under the current selection.
    pub fn available(&self, chapters: &ChapterMap) -> usize {
        self.chapters.iter().map(|id| chapters.chapter_len(*id)).sum()
    }
}

/// A pooled card tagged with the chapter it was drawn from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizItem {
    pub chapter: ChapterId,
    pub card: Card,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerRecord {
    /// Exactly what was typed; trimmed only for comparison.
    pub submitted: String,
    pub expected: String,
    pub item: QuizItem,
}

impl AnswerRecord {
    pub fn is_correct(&self) -> bool {
        is_correct(&self.submitted, &self.expected)
    }
}

pub struct QuizSession {
    phase: QuizPhase,
    pub setup: QuizSetup,
    pool: Vec<QuizItem>,
    current: usize,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    pub fn new(setup: QuizSetup) -> Self {
        Self {
            phase: QuizPhase::Setup,
            setup,
            pool: Vec::new(),
            current: 0,
            answers: Vec::new(),
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn pool(&self) -> &[QuizItem] {
        &self.pool
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Zero-based index of the question being asked.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.pool.len()
    }

    /// Sample the pool and begin asking. An empty pool completes at once.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        chapters: &ChapterMap,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        if self.setup.chapters.is_empty() {
            return Err(QuizError::NoChaptersSelected);
        }

        let mut pool: Vec<QuizItem> = self
            .setup
            .chapters
            .iter()
            .flat_map(|&chapter| {
                chapters.get(chapter).iter().map(move |card| QuizItem {
                    chapter,
                    card: card.clone(),
                })
            })
            .collect();
        pool.shuffle(rng);
        pool.truncate(self.setup.question_count);

        self.pool = pool;
        self.current = 0;
        self.answers.clear();
        self.phase = if self.pool.is_empty() {
            QuizPhase::Completed
        } else {
            QuizPhase::Active
        };
        Ok(())
    }

    pub fn current_item(&self) -> Option<&QuizItem> {
        match self.phase {
            QuizPhase::Active => self.pool.get(self.current),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<String> {
        self.current_item()
            .map(|item| self.setup.projection.question(&item.card))
    }

    /// Record an answer for the current question and move on. Returns
    /// whether it was correct.
    pub fn submit(&mut self, submitted: &str) -> Result<bool, QuizError> {
        let item = self.current_item().cloned().ok_or(QuizError::NotActive)?;
        let record = AnswerRecord {
            submitted: submitted.to_string(),
            expected: self.setup.projection.answer(&item.card),
            item,
        };
        let correct = record.is_correct();
        self.answers.push(record);
        self.current += 1;
        if self.current >= self.pool.len() {
            self.phase = QuizPhase::Completed;
        }
        Ok(correct)
    }

    pub fn score(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct()).count()
    }

    /// Summary for history, once every question has been answered.
    pub fn result(&self) -> Option<QuizResult> {
        if self.phase != QuizPhase::Completed {
            return None;
        }
        Some(QuizResult {
            projection: self.setup.projection.key().to_string(),
            chapters: self.setup.chapters.iter().copied().collect(),
            score: self.score(),
            total: self.pool.len(),
            timestamp: Utc::now(),
        })
    }

    /// Back to setup with the previous choices kept.
    pub fn restart(&mut self) {
        self.phase = QuizPhase::Setup;
        self.pool.clear();
        self.current = 0;
        self.answers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parser::parse_block;
    use crate::engine::partition::repartition;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn chapters_with(count: usize, size: usize) -> ChapterMap {
        let text: String = (0..count)
            .map(|i| format!("{}. 字{i}（じ{i}）＝ word {i}\n", i + 1))
            .collect();
        repartition(&ChapterMap::default(), parse_block(&text).cards, size)
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn setup_clamps_question_count() {
        let mut setup = QuizSetup::new(3, Projection::KanjiToMeaning);
        assert_eq!(setup.question_count(), MIN_QUESTIONS);
        setup.set_question_count(500);
        assert_eq!(setup.question_count(), MAX_QUESTIONS);
        setup.more_questions();
        assert_eq!(setup.question_count(), MAX_QUESTIONS);
        setup.set_question_count(10);
        setup.fewer_questions();
        assert_eq!(setup.question_count(), MIN_QUESTIONS);
    }

    #[test]
    fn empty_selection_cannot_start() {
        let mut quiz = QuizSession::new(QuizSetup::default());
        quiz.setup.clear_chapters();
        assert_eq!(
            quiz.start(&chapters_with(20, 10), &mut rng()),
            Err(QuizError::NoChaptersSelected)
        );
        assert_eq!(quiz.phase(), QuizPhase::Setup);
    }

    #[test]
    fn pool_is_truncated_to_question_count() {
        let chapters = chapters_with(40, 10);
        let mut quiz = QuizSession::new(QuizSetup::new(15, Projection::KanjiToMeaning));
        quiz.start(&chapters, &mut rng()).unwrap();
        assert_eq!(quiz.total(), 15);
        assert_eq!(quiz.phase(), QuizPhase::Active);
    }

    #[test]
    fn small_selection_gives_shorter_quiz() {
        let chapters = chapters_with(40, 10);
        let mut setup = QuizSetup::new(50, Projection::KanjiToHiragana);
        setup.clear_chapters();
        setup.toggle_chapter(ChapterId::new(2).unwrap());
        let mut quiz = QuizSession::new(setup);
        quiz.start(&chapters, &mut rng()).unwrap();
        assert_eq!(quiz.total(), 10);
        assert!(quiz.pool().iter().all(|item| item.chapter == ChapterId::new(2).unwrap()));
    }

    #[test]
    fn pool_has_no_duplicates_and_respects_selection() {
        let chapters = chapters_with(80, 10);
        let mut setup = QuizSetup::new(100, Projection::KanjiToMeaning);
        setup.toggle_chapter(ChapterId::FIRST);
        setup.toggle_chapter(ChapterId::new(5).unwrap());
        let available = setup.available(&chapters);
        assert_eq!(available, 60);

        let mut quiz = QuizSession::new(setup.clone());
        quiz.start(&chapters, &mut rng()).unwrap();
        assert_eq!(quiz.total(), available);

        let unique: BTreeSet<&str> = quiz.pool().iter().map(|i| i.card.kanji.as_str()).collect();
        assert_eq!(unique.len(), quiz.total());
        assert!(quiz.pool().iter().all(|i| setup.is_selected(i.chapter)));
    }

    #[test]
    fn every_position_is_reachable_by_shuffle() {
        let chapters = chapters_with(3, 10);
        let mut seen_first = BTreeSet::new();
        let mut rng = rng();
        for _ in 0..200 {
            let mut quiz = QuizSession::new(QuizSetup::default());
            quiz.start(&chapters, &mut rng).unwrap();
            seen_first.insert(quiz.pool()[0].card.kanji.clone());
        }
        assert_eq!(seen_first.len(), 3);
    }

    #[test]
    fn empty_pool_completes_immediately() {
        let mut quiz = QuizSession::new(QuizSetup::default());
        quiz.start(&ChapterMap::default(), &mut rng()).unwrap();
        assert_eq!(quiz.phase(), QuizPhase::Completed);
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.current_question(), None);
        let result = quiz.result().unwrap();
        assert_eq!((result.score, result.total), (0, 0));
    }

    #[test]
    fn answering_every_question_completes() {
        let chapters = chapters_with(12, 48);
        let mut quiz = QuizSession::new(QuizSetup::new(10, Projection::KanjiToMeaning));
        quiz.start(&chapters, &mut rng()).unwrap();

        for i in 0..10 {
            assert_eq!(quiz.current_index(), i);
            let expected = quiz.current_item().unwrap().card.meaning.clone();
            let submitted = if i % 2 == 0 { format!("  {expected} ") } else { String::new() };
            assert_eq!(quiz.submit(&submitted).unwrap(), i % 2 == 0);
        }
        assert_eq!(quiz.phase(), QuizPhase::Completed);
        assert_eq!(quiz.score(), 5);
        assert_eq!(quiz.answers().len(), 10);
        assert_eq!(quiz.answers()[0].submitted.chars().next(), Some(' '));
        assert_eq!(quiz.submit("late"), Err(QuizError::NotActive));
    }

    #[test]
    fn submit_before_start_is_rejected() {
        let mut quiz = QuizSession::new(QuizSetup::default());
        assert_eq!(quiz.submit("x"), Err(QuizError::NotActive));
        assert!(quiz.result().is_none());
    }

    #[test]
    fn question_follows_projection() {
        let chapters = chapters_with(1, 48);
        let mut quiz = QuizSession::new(QuizSetup::new(10, Projection::MeaningToKanji));
        quiz.start(&chapters, &mut rng()).unwrap();
        assert_eq!(quiz.current_question().as_deref(), Some("word 0"));
        assert!(quiz.submit("字0").unwrap());
    }

    #[test]
    fn combined_projection_expects_separator() {
        let chapters = chapters_with(1, 48);
        let mut quiz =
            QuizSession::new(QuizSetup::new(10, Projection::KanjiToReadingAndMeaning));
        quiz.start(&chapters, &mut rng()).unwrap();
        assert!(!quiz.submit("じ0 word 0").unwrap());
        quiz.restart();
        quiz.start(&chapters, &mut rng()).unwrap();
        assert!(quiz.submit("じ0 — word 0").unwrap());
    }

    #[test]
    fn restart_clears_log_and_keeps_setup() {
        let chapters = chapters_with(12, 48);
        let mut quiz = QuizSession::new(QuizSetup::new(20, Projection::KanjiToHiragana));
        quiz.start(&chapters, &mut rng()).unwrap();
        quiz.submit("x").unwrap();
        quiz.restart();
        assert_eq!(quiz.phase(), QuizPhase::Setup);
        assert!(quiz.answers().is_empty());
        assert!(quiz.pool().is_empty());
        assert_eq!(quiz.setup.question_count(), 20);
        assert_eq!(quiz.setup.projection, Projection::KanjiToHiragana);
    }

    #[test]
    fn result_summarises_completed_quiz() {
        let chapters = chapters_with(2, 48);
        let mut quiz = QuizSession::new(QuizSetup::default());
        quiz.start(&chapters, &mut rng()).unwrap();
        while let Some(item) = quiz.current_item().cloned() {
            quiz.submit(&item.card.meaning).unwrap();
        }
        let result = quiz.result().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.total, 2);
        assert_eq!(result.projection, "k2m");
        assert_eq!(result.chapters.len(), 13);
    }
}
