use std::io;
use std::path::MAIN_SEPARATOR;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

const MAX_SCANNED_ENTRIES: usize = 1000;
const MAX_COMPLETIONS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

#[derive(Default)]
struct Completion {
    candidates: Vec<String>,
    index: Option<usize>,
}

/// Single-line editor used for quiz answers and file paths.
pub struct LineInput {
    text: String,
    /// Char index, 0 is before the first char.
    cursor: usize,
    path_completion: bool,
    completion: Completion,
    /// Set when the last Tab could not read the directory.
    pub completion_error: bool,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            path_completion: false,
            completion: Completion::default(),
            completion_error: false,
        }
    }

    /// An input where Tab cycles through matching filesystem entries.
    pub fn path(text: &str) -> Self {
        Self {
            path_completion: true,
            ..Self::new(text)
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.reset_completion();
        self.text.clear();
        self.cursor = 0;
    }

    /// Returns the text and leaves the input empty.
    pub fn take(&mut self) -> String {
        self.reset_completion();
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    /// `(before, under_cursor, after)`; `under_cursor` is `None` at end of text.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_at(self.cursor);
        match self.text[at..].chars().next() {
            Some(ch) => (&self.text[..at], Some(ch), &self.text[at + ch.len_utf8()..]),
            None => (&self.text, None, ""),
        }
    }

    /// Styled line with a block cursor; pass `None` to hide the cursor.
    pub fn to_line(&self, text: Style, cursor: Option<Style>) -> Line<'_> {
        let (before, under, after) = self.render_parts();
        let mut spans = vec![Span::styled(before, text)];
        match (under, cursor) {
            (Some(ch), Some(style)) => spans.push(Span::styled(ch.to_string(), style)),
            (Some(ch), None) => spans.push(Span::styled(ch.to_string(), text)),
            (None, Some(style)) => spans.push(Span::styled(" ", style)),
            (None, None) => {}
        }
        spans.push(Span::styled(after, text));
        Line::from(spans)
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Tab if self.path_completion => self.tab_complete(true),
            KeyCode::BackTab if self.path_completion => self.tab_complete(false),
            KeyCode::Tab | KeyCode::BackTab => {}
            code => {
                self.reset_completion();
                match code {
                    KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
                    KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
                    KeyCode::Home => self.cursor = 0,
                    KeyCode::End => self.cursor = self.len(),
                    KeyCode::Char('a') if ctrl => self.cursor = 0,
                    KeyCode::Char('e') if ctrl => self.cursor = self.len(),
                    KeyCode::Char('u') if ctrl => {
                        self.text.clear();
                        self.cursor = 0;
                    }
                    KeyCode::Char('w') if ctrl => self.delete_word_back(),
                    KeyCode::Backspace if self.cursor > 0 => {
                        self.cursor -= 1;
                        self.remove_at_cursor();
                    }
                    KeyCode::Delete => self.remove_at_cursor(),
                    KeyCode::Char(ch) if !ctrl => self.insert(ch),
                    _ => {}
                }
            }
        }
        InputResult::Continue
    }

    /// Insert pasted text at the cursor. Newlines are dropped.
    pub fn insert_str(&mut self, text: &str) {
        self.reset_completion();
        for ch in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.insert(ch);
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(b, _)| b)
    }

    fn insert(&mut self, ch: char) {
        let at = self.byte_at(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    fn remove_at_cursor(&mut self) {
        let at = self.byte_at(self.cursor);
        if at < self.text.len() {
            self.text.remove(at);
        }
    }

    /// unix-word-rubout: whitespace, then the word before it.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let (start, end) = (self.byte_at(pos), self.byte_at(self.cursor));
        self.text.replace_range(start..end, "");
        self.cursor = pos;
    }

    fn reset_completion(&mut self) {
        self.completion = Completion::default();
        self.completion_error = false;
    }

    fn tab_complete(&mut self, forward: bool) {
        if self.cursor < self.len() {
            return;
        }
        let next = match self.completion.index {
            None => {
                self.completion_error = false;
                match path_completions(&self.text) {
                    Ok(candidates) => self.completion.candidates = candidates,
                    Err(_) => {
                        self.completion_error = true;
                        return;
                    }
                }
                0
            }
            Some(idx) => {
                let count = self.completion.candidates.len();
                if forward {
                    (idx + 1) % count
                } else {
                    (idx + count - 1) % count
                }
            }
        };
        if let Some(candidate) = self.completion.candidates.get(next) {
            self.text = candidate.clone();
            self.cursor = self.len();
            self.completion.index = Some(next);
        }
    }
}

/// Entries completing `seed`, directories first. A leading `~` is expanded
/// for the lookup but kept in the results.
fn path_completions(seed: &str) -> io::Result<Vec<String>> {
    let split = seed.rfind(['/', '\\']).map_or(0, |pos| pos + 1);
    let (dir, partial) = seed.split_at(split);

    let lookup = match dir.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => format!("{}{rest}", home.display()),
            None => dir.to_string(),
        },
        None if dir.is_empty() => ".".to_string(),
        None => dir.to_string(),
    };

    let entries = std::fs::read_dir(lookup)?.map(|entry| {
        entry.map(|e| {
            let is_dir = e.file_type().is_ok_and(|ft| ft.is_dir());
            (e.file_name().to_string_lossy().into_owned(), is_dir)
        })
    });
    rank_completions(entries, dir, partial)
}

fn rank_completions(
    entries: impl Iterator<Item = io::Result<(String, bool)>>,
    dir: &str,
    partial: &str,
) -> io::Result<Vec<String>> {
    let show_hidden = partial.starts_with('.');
    let mut matches: Vec<(bool, String)> = Vec::new();
    for entry in entries.take(MAX_SCANNED_ENTRIES) {
        let (name, is_dir) = entry?;
        if (name.starts_with('.') && !show_hidden) || !name.starts_with(partial) {
            continue;
        }
        let full = if is_dir {
            format!("{dir}{name}{MAIN_SEPARATOR}")
        } else {
            format!("{dir}{name}")
        };
        matches.push((is_dir, full));
    }
    matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    matches.truncate(MAX_COMPLETIONS);
    Ok(matches.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(input: &mut LineInput, text: &str) {
        for ch in text.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_kana_moves_cursor_by_chars() {
        let mut input = LineInput::new("");
        type_str(&mut input, "さかな");
        assert_eq!(input.value(), "さかな");
        assert_eq!(input.cursor, 3);

        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "さな");
        assert_eq!(input.render_parts(), ("さ", Some('な'), ""));
    }

    #[test]
    fn insert_in_the_middle() {
        let mut input = LineInput::new("Fsh");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Right));
        input.handle(key(KeyCode::Char('i')));
        assert_eq!(input.value(), "Fish");
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn backspace_and_delete_at_boundaries() {
        let mut input = LineInput::new("a");
        input.handle(key(KeyCode::Backspace));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);

        let mut input = LineInput::new("ab");
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "ab");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "b");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = LineInput::new("a");
        input.handle(key(KeyCode::Right));
        assert_eq!(input.cursor, 1);
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Left));
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn emacs_bindings() {
        let mut input = LineInput::new("big fish  ");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "big ");
        input.handle(ctrl('a'));
        assert_eq!(input.cursor, 0);
        input.handle(ctrl('e'));
        assert_eq!(input.cursor, 4);
        input.handle(ctrl('u'));
        assert!(input.is_empty());
    }

    #[test]
    fn take_empties_the_input() {
        let mut input = LineInput::new("Water");
        assert_eq!(input.take(), "Water");
        assert!(input.is_empty());
        assert_eq!(input.render_parts(), ("", None, ""));
    }

    #[test]
    fn paste_drops_newlines() {
        let mut input = LineInput::new("");
        input.insert_str("/tmp/deck\n.txt\r\n");
        assert_eq!(input.value(), "/tmp/deck.txt");
    }

    #[test]
    fn enter_submits_and_esc_cancels() {
        let mut input = LineInput::new("Fish");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
    }

    #[test]
    fn tab_is_ignored_without_path_completion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deck.txt"), "").unwrap();
        let mut input = LineInput::new(&format!("{}/", dir.path().display()));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with('/'));
    }

    #[test]
    fn tab_cycles_directories_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kanji.txt"), "").unwrap();
        std::fs::write(dir.path().join("fish.png"), "").unwrap();
        std::fs::create_dir(dir.path().join("decks")).unwrap();

        let mut input = LineInput::path(&format!("{}/", dir.path().display()));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("decks{MAIN_SEPARATOR}")));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with("fish.png"));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with("kanji.txt"));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("decks{MAIN_SEPARATOR}")));
        input.handle(key(KeyCode::BackTab));
        assert!(input.value().ends_with("kanji.txt"));
    }

    #[test]
    fn tab_filters_by_prefix_and_hides_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("n5.txt"), "").unwrap();
        std::fs::write(dir.path().join("n4.txt"), "").unwrap();
        std::fs::write(dir.path().join(".n3.txt"), "").unwrap();

        let mut input = LineInput::path(&format!("{}/n", dir.path().display()));
        input.handle(key(KeyCode::Tab));
        assert_eq!(input.completion.candidates.len(), 2);

        let mut hidden = LineInput::path(&format!("{}/.n", dir.path().display()));
        hidden.handle(key(KeyCode::Tab));
        assert_eq!(hidden.completion.candidates.len(), 1);
    }

    #[test]
    fn tab_mid_line_is_noop() {
        let mut input = LineInput::path("/tmp");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Tab));
        assert_eq!(input.value(), "/tmp");
        assert!(input.completion.index.is_none());
    }

    #[test]
    fn unreadable_directory_flags_error_until_next_edit() {
        let mut input = LineInput::path("/kotoba_no_such_dir_zzz/");
        input.handle(key(KeyCode::Tab));
        assert!(input.completion_error);
        assert!(input.completion.candidates.is_empty());

        input.handle(key(KeyCode::Char('x')));
        assert!(!input.completion_error);
    }

    #[test]
    fn ranking_aborts_on_entry_error() {
        let entries = vec![
            Ok(("a.txt".to_string(), false)),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
        ];
        assert!(rank_completions(entries.into_iter(), "", "").is_err());
    }

    #[test]
    fn ranking_caps_candidates() {
        let entries = (0..1500).map(|i| Ok((format!("deck_{i:04}.txt"), false)));
        let ranked = rank_completions(entries, "d/", "deck_").unwrap();
        assert_eq!(ranked.len(), MAX_COMPLETIONS);
        assert_eq!(ranked[0], "d/deck_0000.txt");
    }
}
