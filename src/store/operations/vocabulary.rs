use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// A word unlocked through a kanji. `source_kanji` is a plain back-reference;
/// the kanji may have been reset since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    pub word: String,
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jlpt: Option<String>,
    #[serde(default)]
    pub source_kanji: String,
    #[serde(default)]
    pub level: u32,
}

impl Vocabulary {
    pub fn contains_glyph(&self, glyph: &str) -> bool {
        !glyph.is_empty() && self.word.contains(glyph)
    }
}

impl Store {
    pub fn get_words_list(&self) -> Result<Option<Vec<Vocabulary>>, StoreError> {
        self.read_blob(keys::WORDS_LIST)
    }
}
