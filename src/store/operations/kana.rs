use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kana {
    pub character: String,
    /// Field name kept as the app has always written it.
    #[serde(default)]
    pub romanji: String,
    #[serde(default)]
    pub level: u32,
}

impl Kana {
    pub fn new(glyph: &str, romanization: &str) -> Self {
        Self {
            character: glyph.to_string(),
            romanji: romanization.to_string(),
            level: 0,
        }
    }
}

impl Store {
    pub fn get_katakana_list(&self) -> Result<Option<Vec<Kana>>, StoreError> {
        self.read_blob(keys::KATAKANA_LIST)
    }

    pub fn save_katakana_list(&self, list: &[Kana]) -> Result<(), StoreError> {
        self.write_blob(keys::KATAKANA_LIST, list)
    }
}
