use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Number of study chapters. Fixed regardless of how many cards exist.
pub const CHAPTER_COUNT: usize = 13;

/// Chapter size used when no configuration overrides it (613 words over 13 chapters).
pub const DEFAULT_CHAPTER_SIZE: usize = 48;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChapterId(u8);

impl ChapterId {
    pub const FIRST: ChapterId = ChapterId(1);
    pub const LAST: ChapterId = ChapterId(CHAPTER_COUNT as u8);

    pub fn new(id: u8) -> Option<Self> {
        (1..=CHAPTER_COUNT as u8).contains(&id).then_some(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = ChapterId> {
        (1..=CHAPTER_COUNT as u8).map(ChapterId)
    }

    /// Next chapter, wrapping from 13 back to 1.
    pub fn next(self) -> Self {
        if self == Self::LAST { Self::FIRST } else { Self(self.0 + 1) }
    }

    /// Previous chapter, wrapping from 1 to 13.
    pub fn prev(self) -> Self {
        if self == Self::FIRST { Self::LAST } else { Self(self.0 - 1) }
    }

    fn slot(self) -> usize {
        self.0 as usize - 1
    }
}

impl TryFrom<u8> for ChapterId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("chapter id out of range: {value}"))
    }
}

impl From<ChapterId> for u8 {
    fn from(id: ChapterId) -> u8 {
        id.0
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cards grouped into the fixed set of chapters. Every id in `1..=13` is
/// always present, possibly with an empty sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterMap {
    chapters: Vec<Vec<Card>>,
}

impl Default for ChapterMap {
    fn default() -> Self {
        Self {
            chapters: vec![Vec::new(); CHAPTER_COUNT],
        }
    }
}

impl ChapterMap {
    pub fn get(&self, id: ChapterId) -> &[Card] {
        &self.chapters[id.slot()]
    }

    pub fn card(&self, id: ChapterId, index: usize) -> Option<&Card> {
        self.get(id).get(index)
    }

    pub(crate) fn card_mut(&mut self, id: ChapterId, index: usize) -> Option<&mut Card> {
        self.chapters[id.slot()].get_mut(index)
    }

    pub fn chapter_len(&self, id: ChapterId) -> usize {
        self.get(id).len()
    }

    pub fn total(&self) -> usize {
        self.chapters.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.iter().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChapterId, &[Card])> {
        ChapterId::all().zip(self.chapters.iter().map(Vec::as_slice))
    }

    /// All cards in chapter order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.chapters.iter().flatten()
    }

    fn from_raw(raw: BTreeMap<u32, Vec<Card>>) -> Self {
        let mut map = Self::default();
        for (id, cards) in raw {
            match u8::try_from(id).ok().and_then(ChapterId::new) {
                Some(chapter) => map.chapters[chapter.slot()] = cards,
                None => log::warn!(
                    "discarding {} stored cards under unknown chapter {id}",
                    cards.len()
                ),
            }
        }
        map
    }
}

impl Serialize for ChapterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(id, cards)| (id.get(), cards)))
    }
}

impl<'de> Deserialize<'de> for ChapterMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<u32, Vec<Card>>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

/// Redistribute every existing card plus `new_cards` into consecutive chunks
/// of `chapter_size`, chunk *i* going to chapter *i + 1*.
///
/// Order is preserved across the whole concatenation. When the cards need
/// more than [`CHAPTER_COUNT`] chunks, the last chapter keeps the remainder so
/// no card is ever dropped. A size of zero is treated as one.
pub fn repartition(existing: &ChapterMap, new_cards: Vec<Card>, chapter_size: usize) -> ChapterMap {
    let size = chapter_size.max(1);
    let mut remaining = existing.cards().cloned().chain(new_cards);

    let mut next = ChapterMap::default();
    for (slot, chapter) in next.chapters.iter_mut().enumerate() {
        if slot + 1 == CHAPTER_COUNT {
            chapter.extend(remaining.by_ref());
        } else {
            chapter.extend(remaining.by_ref().take(size));
        }
    }
    next
}
