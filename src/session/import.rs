use crate::card::parser::{ParseReport, parse_block};

/// Which part of the import screen receives keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportFocus {
    #[default]
    Text,
    Path,
}

/// Multi-line paste buffer with a live parse preview.
#[derive(Clone, Debug, Default)]
pub struct ImportDraft {
    text: String,
    preview: ParseReport,
}

impl ImportDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn preview(&self) -> &ParseReport {
        &self.preview
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.refresh();
    }

    /// Append pasted text. CRLF and lone CR become LF.
    pub fn push_str(&mut self, pasted: &str) {
        let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");
        self.text.push_str(&normalized);
        self.refresh();
    }

    pub fn backspace(&mut self) {
        self.text.pop();
        self.refresh();
    }

    /// Erase the text of the last line, or the newline ending it when it is
    /// already empty.
    pub fn delete_line(&mut self) {
        if self.text.ends_with('\n') {
            self.text.pop();
        } else {
            let keep = self.text.rfind('\n').map_or(0, |pos| pos + 1);
            self.text.truncate(keep);
        }
        self.refresh();
    }

    pub fn replace(&mut self, text: String) {
        self.text = text;
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.preview = ParseReport::default();
    }

    fn refresh(&mut self) {
        self.preview = parse_block(&self.text);
    }
}
