use std::sync::LazyLock;

use regex::Regex;

use crate::card::Card;

/// Leading ordinal such as `12.` or `3)`, with any whitespace after it.
static NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)[.)]\s*").expect("numbering pattern is valid"));

/// `漢字（かんじ）＝ meaning`, ASCII `=` also accepted. No field spans a line
/// break.
static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\r\n]*?)（([^\r\n]*?)）\s*[=＝]\s*([^\r\n]*)$")
        .expect("entry pattern is valid")
});

/// Outcome of parsing a pasted block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub cards: Vec<Card>,
    /// Non-blank lines that were attempted.
    pub lines: usize,
}

impl ParseReport {
    pub fn parsed(&self) -> usize {
        self.cards.len()
    }

    pub fn rejected(&self) -> usize {
        self.lines - self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Parse a single entry line. Lines that don't match the grammar yield `None`.
pub fn parse_line(line: &str) -> Option<Card> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (number, rest) = match NUMBERING.captures(trimmed) {
        Some(caps) => {
            let whole = caps.get(0)?;
            // Zero or an ordinal too large for u32 is stripped but not kept.
            let number = caps[1].parse::<u32>().ok().filter(|n| *n > 0);
            (number, &trimmed[whole.end()..])
        }
        None => (None, trimmed),
    };

    let caps = ENTRY.captures(rest)?;
    let kanji = caps[1].trim();
    let hiragana = caps[2].trim();
    let meaning = caps[3].trim();
    if kanji.is_empty() || hiragana.is_empty() {
        return None;
    }

    Some(Card {
        kanji: kanji.to_string(),
        hiragana: hiragana.to_string(),
        meaning: meaning.to_string(),
        number,
        image: None,
    })
}

/// Parse a multi-line block, keeping successfully parsed lines in order.
/// LF, CRLF and lone CR all end a line.
pub fn parse_block(text: &str) -> ParseReport {
    let mut report = ParseReport::default();
    for line in text.split(['\n', '\r']) {
        if line.trim().is_empty() {
            continue;
        }
        report.lines += 1;
        if let Some(card) = parse_line(line) {
            report.cards.push(card);
        }
    }
    report
}
