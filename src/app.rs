use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::card::image::encode_image_file;
use crate::card::parser::parse_block;
use crate::config::Config;
use crate::engine::partition::{CHAPTER_COUNT, ChapterId, repartition};
use crate::session::autoplay::{
    AutoplayCoordinator, AutoplayPhase, AutoplaySignal, PERIOD_STEP_MS, clamp_period,
};
use crate::session::import::{ImportDraft, ImportFocus};
use crate::session::quiz::{
    MAX_QUESTIONS, MIN_QUESTIONS, QUESTION_STEP, QuizPhase, QuizSession, QuizSetup,
};
use crate::session::result::QuizResult;
use crate::session::study::{CardFace, StudySession};
use crate::speech::{Speaker, speaker_from_command};
use crate::store::json_store::JsonStore;
use crate::store::schema::MAX_QUIZ_HISTORY;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Study,
    Import,
    AttachImage,
    QuizSetup,
    Quiz,
    QuizResult,
    Settings,
}

pub const SETTINGS_FIELDS: usize = 5;
const CHAPTER_SIZE_STEP: usize = 4;

/// Quiz setup rows: one per chapter, then question count, then quiz type.
pub const QUIZ_SETUP_ROWS: usize = CHAPTER_COUNT + 2;
pub const QUIZ_COUNT_ROW: usize = CHAPTER_COUNT;
pub const QUIZ_PROJECTION_ROW: usize = CHAPTER_COUNT + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    pub parsed: usize,
    pub lines: usize,
    pub deck_size: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} lines parsed ({} cards in deck)",
            self.parsed, self.lines, self.deck_size
        )
    }
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub study: StudySession,
    pub autoplay: AutoplayCoordinator,
    signals: mpsc::Receiver<AutoplaySignal>,
    pub quiz: QuizSession,
    pub quiz_cursor: usize,
    pub quiz_history: Vec<QuizResult>,
    pub last_result: Option<QuizResult>,
    pub import_draft: ImportDraft,
    pub import_focus: ImportFocus,
    pub import_path: LineInput,
    pub image_path: LineInput,
    pub answer_input: LineInput,
    pub settings_selected: usize,
    pub status: Option<String>,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
    config_path: Option<PathBuf>,
    config_dirty: bool,
    chapter_size_on_enter: usize,
    speaker: Box<dyn Speaker>,
    rng: SmallRng,
}

fn leak_theme(name: &str) -> &'static Theme {
    let theme = Theme::load(name).unwrap_or_else(|| {
        log::warn!("theme {name:?} not found, using default");
        Theme::default()
    });
    Box::leak(Box::new(theme))
}

fn expand_tilde(raw: &str) -> PathBuf {
    match raw.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(raw),
        },
        None => PathBuf::from(raw),
    }
}

impl App {
    pub fn new() -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            log::warn!("config unreadable, using defaults: {e:#}");
            Config::default()
        });
        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                log::error!("data directory unavailable, nothing will be saved: {e:#}");
                None
            }
        };
        let speaker = speaker_from_command(&config.speech_command);
        let mut app = Self::with_parts(config, store, speaker, SmallRng::from_entropy());
        app.config_path = Some(Config::config_path());
        app
    }

    /// Build an app around explicit collaborators. The config is only
    /// written back when a config path is set.
    pub fn with_parts(
        config: Config,
        store: Option<JsonStore>,
        speaker: Box<dyn Speaker>,
        rng: SmallRng,
    ) -> Self {
        let theme = leak_theme(&config.theme);
        let (chapters, quiz_history) = match &store {
            Some(s) => (s.load_deck(), s.load_quiz_history()),
            None => Default::default(),
        };
        log::info!(
            "loaded {} cards and {} quiz results",
            chapters.total(),
            quiz_history.len()
        );

        let mut autoplay = AutoplayCoordinator::new(config.autoplay_period_ms);
        let signals = autoplay.subscribe();
        let quiz = QuizSession::new(QuizSetup::new(config.question_count, config.projection()));
        let chapter_size_on_enter = config.chapter_size;

        let mut app = Self {
            screen: AppScreen::Menu,
            menu: Menu::new(theme),
            theme,
            config,
            study: StudySession::new(chapters),
            autoplay,
            signals,
            quiz,
            quiz_cursor: 0,
            quiz_history,
            last_result: None,
            import_draft: ImportDraft::new(),
            import_focus: ImportFocus::Text,
            import_path: LineInput::path(""),
            image_path: LineInput::path(""),
            answer_input: LineInput::new(""),
            settings_selected: 0,
            status: None,
            store,
            should_quit: false,
            config_path: None,
            config_dirty: false,
            chapter_size_on_enter,
            speaker,
            rng,
        };
        app.refresh_menu_subtitle();
        app
    }

    pub fn set_speaker(&mut self, speaker: Box<dyn Speaker>) {
        self.speaker = speaker;
    }

    pub fn set_theme(&mut self, name: &str) {
        self.config.theme = name.to_string();
        self.theme = leak_theme(name);
        self.menu.theme = self.theme;
    }

    fn refresh_menu_subtitle(&mut self) {
        self.menu.subtitle = match self.study.total_cards() {
            0 => "No cards yet. Import a list to begin".to_string(),
            n => format!("{n} cards in {CHAPTER_COUNT} chapters"),
        };
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn go_to_menu(&mut self) {
        self.autoplay.stop();
        self.refresh_menu_subtitle();
        self.screen = AppScreen::Menu;
    }

    pub fn activate(&mut self, action: MenuAction) {
        self.status = None;
        match action {
            MenuAction::Study => self.go_to_study(),
            MenuAction::Import => self.go_to_import(),
            MenuAction::Quiz => self.go_to_quiz_setup(),
            MenuAction::Settings => self.go_to_settings(),
        }
    }

    pub fn go_to_study(&mut self) {
        self.study.show_front();
        self.screen = AppScreen::Study;
    }

    pub fn go_to_import(&mut self) {
        self.autoplay.stop();
        self.import_focus = ImportFocus::Text;
        self.screen = AppScreen::Import;
    }

    pub fn go_to_attach_image(&mut self) {
        if self.study.current_card().is_none() {
            self.set_status("No card to attach a picture to");
            return;
        }
        self.autoplay.stop();
        self.image_path.clear();
        self.screen = AppScreen::AttachImage;
    }

    pub fn go_to_quiz_setup(&mut self) {
        self.autoplay.stop();
        self.quiz.restart();
        self.answer_input.clear();
        self.screen = AppScreen::QuizSetup;
    }

    pub fn go_to_settings(&mut self) {
        self.autoplay.stop();
        self.settings_selected = 0;
        self.chapter_size_on_enter = self.config.chapter_size;
        self.screen = AppScreen::Settings;
    }

    // --- study ---

    fn pronounce_current(&self) {
        if let Some(card) = self.study.current_card() {
            self.speaker.pronounce(card.pronunciation());
        }
    }

    fn resync_autoplay(&mut self, now: Instant) {
        let phase = match self.study.face() {
            CardFace::Front => AutoplayPhase::Front,
            CardFace::Back => AutoplayPhase::Back,
        };
        self.autoplay.resync(now, phase);
    }

    pub fn flip_card(&mut self, now: Instant) {
        if self.study.flip() == CardFace::Back {
            self.pronounce_current();
        }
        self.resync_autoplay(now);
    }

    pub fn next_card(&mut self, now: Instant) {
        self.study.next();
        self.resync_autoplay(now);
    }

    pub fn prev_card(&mut self, now: Instant) {
        self.study.prev();
        self.resync_autoplay(now);
    }

    pub fn speak_current(&self) {
        self.pronounce_current();
    }

    pub fn select_chapter(&mut self, chapter: ChapterId, now: Instant) {
        self.study.select_chapter(chapter);
        self.autoplay.restart_for_chapter(now);
    }

    pub fn toggle_autoplay(&mut self, now: Instant) {
        self.autoplay.toggle(now);
        if self.autoplay.is_running() {
            self.resync_autoplay(now);
        }
    }

    pub fn autoplay_faster(&mut self, now: Instant) {
        self.autoplay.faster(now);
        self.remember_period();
    }

    pub fn autoplay_slower(&mut self, now: Instant) {
        self.autoplay.slower(now);
        self.remember_period();
    }

    fn remember_period(&mut self) {
        let period = self.autoplay.period_ms();
        if self.config.autoplay_period_ms != period {
            self.config.autoplay_period_ms = period;
            self.config_dirty = true;
        }
    }

    /// Advance autoplay to `now` and apply whatever it published.
    pub fn tick(&mut self, now: Instant) {
        let (cursor, len) = self.study.cursor_mut();
        if self.autoplay.poll(now, cursor, len) == 0 {
            return;
        }
        let signals: Vec<AutoplaySignal> = self.signals.try_iter().collect();
        for signal in signals {
            if self.study.apply_signal(signal) == Some(CardFace::Back) {
                self.pronounce_current();
            }
        }
    }

    // --- import ---

    /// Parse `text`, fold the cards into the deck and save it.
    pub fn import_text(&mut self, text: &str, now: Instant) -> ImportSummary {
        let report = parse_block(text);
        let (parsed, lines) = (report.parsed(), report.lines);
        if report.is_empty() {
            log::info!("import: none of {lines} lines matched");
            return ImportSummary {
                parsed,
                lines,
                deck_size: self.study.total_cards(),
            };
        }

        let snapshot = self.study.import(report.cards, self.config.chapter_size);
        self.autoplay.restart_for_chapter(now);
        let summary = ImportSummary {
            parsed,
            lines,
            deck_size: snapshot.total(),
        };
        log::info!("import: {summary}");
        self.persist_deck();
        self.refresh_menu_subtitle();
        summary
    }

    pub fn import_file(&mut self, path: &Path, now: Instant) -> Result<ImportSummary> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(self.import_text(&text, now))
    }

    pub fn commit_import(&mut self, now: Instant) {
        let text = self.import_draft.text().to_string();
        let summary = self.import_text(&text, now);
        if summary.parsed == 0 {
            self.set_status("Nothing imported: use lines like 1. 魚（さかな）＝ Fish");
            return;
        }
        self.import_draft.clear();
        self.set_status(format!("Imported {summary}"));
        self.go_to_study();
    }

    /// Load the file named in the path field into the paste buffer for review.
    pub fn load_import_path(&mut self) {
        let raw = self.import_path.value().trim().to_string();
        if raw.is_empty() {
            return;
        }
        let path = expand_tilde(&raw);
        match fs::read_to_string(&path) {
            Ok(text) => {
                self.import_draft.replace(text);
                self.import_focus = ImportFocus::Text;
                self.set_status(format!(
                    "Loaded {}: {} items recognised",
                    path.display(),
                    self.import_draft.preview().parsed()
                ));
            }
            Err(e) => {
                log::warn!("cannot read {}: {e}", path.display());
                self.set_status(format!("Cannot read {}: {e}", path.display()));
            }
        }
    }

    pub fn attach_image(&mut self) {
        let raw = self.image_path.value().trim().to_string();
        if raw.is_empty() {
            return;
        }
        let path = expand_tilde(&raw);
        let data_uri = match encode_image_file(&path) {
            Ok(uri) => uri,
            Err(e) => {
                log::warn!("image {}: {e}", path.display());
                self.set_status(format!("{e}"));
                return;
            }
        };

        let cursor = self.study.cursor();
        if self.study.attach_image(cursor.chapter, cursor.index, data_uri) {
            log::info!(
                "attached {} to chapter {} card {}",
                path.display(),
                cursor.chapter,
                cursor.index
            );
            self.persist_deck();
            self.set_status("Picture attached");
            self.screen = AppScreen::Study;
        } else {
            self.set_status("No card to attach a picture to");
        }
    }

    fn persist_deck(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save_deck(&self.study.chapters()) {
            log::error!("saving deck: {e:#}");
            self.status = Some(format!("Could not save deck: {e}"));
        }
    }

    // --- quiz ---

    pub fn quiz_cursor_down(&mut self) {
        self.quiz_cursor = (self.quiz_cursor + 1).min(QUIZ_SETUP_ROWS - 1);
    }

    pub fn quiz_cursor_up(&mut self) {
        self.quiz_cursor = self.quiz_cursor.saturating_sub(1);
    }

    /// Space on a chapter row toggles it.
    pub fn quiz_toggle_row(&mut self) {
        if let Some(id) = u8::try_from(self.quiz_cursor + 1).ok().and_then(ChapterId::new) {
            self.quiz.setup.toggle_chapter(id);
        }
    }

    /// Left/right on the count or type rows.
    pub fn quiz_adjust_row(&mut self, forward: bool) {
        let setup = &mut self.quiz.setup;
        match (self.quiz_cursor, forward) {
            (QUIZ_COUNT_ROW, true) => setup.more_questions(),
            (QUIZ_COUNT_ROW, false) => setup.fewer_questions(),
            (QUIZ_PROJECTION_ROW, true) => setup.projection = setup.projection.next(),
            (QUIZ_PROJECTION_ROW, false) => setup.projection = setup.projection.prev(),
            _ => self.quiz_toggle_row(),
        }
    }

    pub fn start_quiz(&mut self) {
        let chapters = self.study.chapters();
        if let Err(e) = self.quiz.start(&chapters, &mut self.rng) {
            self.set_status(e.to_string());
            return;
        }
        self.status = None;
        self.answer_input.clear();
        log::info!(
            "quiz started: {} questions, {}",
            self.quiz.total(),
            self.quiz.setup.projection.key()
        );
        match self.quiz.phase() {
            QuizPhase::Completed => self.finish_quiz(),
            _ => self.screen = AppScreen::Quiz,
        }
    }

    pub fn submit_answer(&mut self) {
        let answer = self.answer_input.take();
        match self.quiz.submit(&answer) {
            Ok(_) if self.quiz.phase() == QuizPhase::Completed => self.finish_quiz(),
            Ok(_) => {}
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn finish_quiz(&mut self) {
        let Some(result) = self.quiz.result() else {
            return;
        };
        log::info!("quiz finished: {}/{}", result.score, result.total);
        if result.total == 0 {
            self.set_status("The selected chapters have no cards");
        } else {
            self.quiz_history.push(result.clone());
            if self.quiz_history.len() > MAX_QUIZ_HISTORY {
                let excess = self.quiz_history.len() - MAX_QUIZ_HISTORY;
                self.quiz_history.drain(..excess);
            }
            if let Some(store) = &self.store
                && let Err(e) = store.save_quiz_history(&self.quiz_history)
            {
                log::error!("saving quiz history: {e:#}");
                self.status = Some(format!("Could not save quiz history: {e}"));
            }
        }
        self.last_result = Some(result);
        self.screen = AppScreen::QuizResult;
    }

    /// Same chapters and settings, freshly shuffled.
    pub fn retry_quiz(&mut self) {
        self.quiz.restart();
        self.start_quiz();
    }

    // --- settings ---

    pub fn settings_cycle_forward(&mut self) {
        self.settings_adjust(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_adjust(false);
    }

    fn settings_adjust(&mut self, forward: bool) {
        let config = &mut self.config;
        match self.settings_selected {
            0 => {
                config.chapter_size = if forward {
                    config.chapter_size + CHAPTER_SIZE_STEP
                } else {
                    config.chapter_size.saturating_sub(CHAPTER_SIZE_STEP).max(1)
                };
            }
            1 => {
                config.autoplay_period_ms = clamp_period(if forward {
                    config.autoplay_period_ms + PERIOD_STEP_MS
                } else {
                    config.autoplay_period_ms.saturating_sub(PERIOD_STEP_MS)
                });
            }
            2 => {
                config.question_count = if forward {
                    config.question_count + QUESTION_STEP
                } else {
                    config.question_count.saturating_sub(QUESTION_STEP)
                }
                .clamp(MIN_QUESTIONS, MAX_QUESTIONS);
            }
            3 => {
                let projection = config.projection();
                let next = if forward {
                    projection.next()
                } else {
                    projection.prev()
                };
                config.quiz_projection = next.key().to_string();
            }
            4 => {
                let themes = Theme::available_themes();
                let idx = themes.iter().position(|t| *t == config.theme).unwrap_or(0);
                let next = if forward {
                    (idx + 1) % themes.len()
                } else {
                    (idx + themes.len() - 1) % themes.len()
                };
                let name = themes[next].clone();
                self.set_theme(&name);
            }
            _ => {}
        }
        self.config_dirty = true;
    }

    /// Apply edited settings, rebalance the deck if the chapter size
    /// changed, then save and return to the menu.
    pub fn leave_settings(&mut self, now: Instant) {
        self.autoplay.set_period(now, self.config.autoplay_period_ms);
        self.quiz.setup.set_question_count(self.config.question_count);
        self.quiz.setup.projection = self.config.projection();

        if self.config.chapter_size != self.chapter_size_on_enter {
            let chapters = self.study.chapters();
            if !chapters.is_empty() {
                let rebalanced = repartition(&chapters, Vec::new(), self.config.chapter_size);
                log::info!(
                    "chapter size {} -> {}, deck redistributed",
                    self.chapter_size_on_enter,
                    self.config.chapter_size
                );
                self.study.replace(rebalanced);
                self.persist_deck();
            }
        }

        self.save_config();
        self.go_to_menu();
    }

    fn save_config(&mut self) {
        if !self.config_dirty {
            return;
        }
        let Some(path) = &self.config_path else {
            self.config_dirty = false;
            return;
        };
        match self.config.save_to(path) {
            Ok(()) => self.config_dirty = false,
            Err(e) => {
                log::error!("saving config: {e:#}");
                self.status = Some(format!("Could not save settings: {e}"));
            }
        }
    }

    pub fn quit(&mut self) {
        self.autoplay.stop();
        self.save_config();
        self.should_quit = true;
    }
}
