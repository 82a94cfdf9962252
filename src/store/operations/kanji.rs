use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kanji {
    pub kanji: String,
    /// Empty until an enrichment fills it in.
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub level: u32,
}

impl Kanji {
    pub fn new(glyph: &str, meaning: &str) -> Self {
        Self {
            kanji: glyph.to_string(),
            meaning: meaning.to_string(),
            level: 0,
        }
    }
}

impl Store {
    pub fn get_kanji_list(&self) -> Result<Option<Vec<Kanji>>, StoreError> {
        self.read_blob(keys::KANJI_LIST)
    }

    pub fn save_kanji_list(&self, list: &[Kanji]) -> Result<(), StoreError> {
        self.write_blob(keys::KANJI_LIST, list)
    }
}
