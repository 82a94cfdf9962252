//! Progress engine: per-item mastery levels, merge-on-refresh and the
//! kanji → vocabulary unlock rule.

pub mod defaults;
pub mod engine;
pub mod merge;
pub mod stats;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::MASTERY_LEVEL;
use crate::store::keys::CollectionKind;
use crate::store::operations::kana::Kana;
use crate::store::operations::kanji::Kanji;
use crate::store::operations::vocabulary::Vocabulary;

/// Shared shape of everything that carries a level.
pub trait Learnable: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: CollectionKind;

    /// Glyph for kanji/kana, the surface form for words.
    fn key(&self) -> &str;
    fn level(&self) -> u32;
    fn set_level(&mut self, level: u32);
    fn from_item(item: LearnableItem) -> Option<Self>;
    fn into_item(self) -> LearnableItem;

    fn is_learned(&self) -> bool {
        self.level() > 0
    }

    fn is_mastered(&self) -> bool {
        self.level() >= MASTERY_LEVEL
    }
}

impl Learnable for Kanji {
    const KIND: CollectionKind = CollectionKind::Kanji;

    fn key(&self) -> &str {
        &self.kanji
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    fn from_item(item: LearnableItem) -> Option<Self> {
        match item {
            LearnableItem::Kanji(kanji) => Some(kanji),
            _ => None,
        }
    }

    fn into_item(self) -> LearnableItem {
        LearnableItem::Kanji(self)
    }
}

impl Learnable for Kana {
    const KIND: CollectionKind = CollectionKind::Katakana;

    fn key(&self) -> &str {
        &self.character
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    fn from_item(item: LearnableItem) -> Option<Self> {
        match item {
            LearnableItem::Kana(kana) => Some(kana),
            _ => None,
        }
    }

    fn into_item(self) -> LearnableItem {
        LearnableItem::Kana(self)
    }
}

impl Learnable for Vocabulary {
    const KIND: CollectionKind = CollectionKind::Words;

    fn key(&self) -> &str {
        &self.word
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    fn from_item(item: LearnableItem) -> Option<Self> {
        match item {
            LearnableItem::Vocabulary(word) => Some(word),
            _ => None,
        }
    }

    fn into_item(self) -> LearnableItem {
        LearnableItem::Vocabulary(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LearnableItem {
    #[serde(rename = "kanji")]
    Kanji(Kanji),
    #[serde(rename = "katakana")]
    Kana(Kana),
    #[serde(rename = "words")]
    Vocabulary(Vocabulary),
}

impl LearnableItem {
    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::Kanji(_) => CollectionKind::Kanji,
            Self::Kana(_) => CollectionKind::Katakana,
            Self::Vocabulary(_) => CollectionKind::Words,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Self::Kanji(item) => item.level,
            Self::Kana(item) => item.level,
            Self::Vocabulary(item) => item.level,
        }
    }
}

/// Identifies one item for a level-up. Words may repeat, so a word key can
/// carry its position in the stored list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey {
    pub key: String,
    pub index: Option<usize>,
}

impl ItemKey {
    pub fn glyph(glyph: &str) -> Self {
        Self {
            key: glyph.to_string(),
            index: None,
        }
    }

    pub fn word(word: &str, index: usize) -> Self {
        Self {
            key: word.to_string(),
            index: Some(index),
        }
    }

    /// Position of the addressed item in `items`.
    pub fn locate<T: Learnable>(&self, items: &[T]) -> Option<usize> {
        match self.index {
            Some(index) => items
                .get(index)
                .filter(|item| item.key() == self.key)
                .map(|_| index),
            None => items.iter().position(|item| item.key() == self.key),
        }
    }
}

/// Items still in active practice (level below mastery), stored order kept.
pub fn active_view<T: Learnable>(items: &[T]) -> Vec<T> {
    items.iter().filter(|item| !item.is_mastered()).cloned().collect()
}
