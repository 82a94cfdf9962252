use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const KANJI_LIST: &str = "kanjiList";
pub const KATAKANA_LIST: &str = "katakanaList";
pub const WORDS_LIST: &str = "wordsList";
pub const USER_SETTINGS: &str = "userSettings";

pub const SCHEMA_VERSION: &str = "_meta:version";

/// The three learnable collections. Each maps to exactly one content blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Kanji,
    Katakana,
    Words,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [Self::Kanji, Self::Katakana, Self::Words];

    pub fn blob_key(self) -> &'static str {
        match self {
            Self::Kanji => KANJI_LIST,
            Self::Katakana => KATAKANA_LIST,
            Self::Words => WORDS_LIST,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kanji => "kanji",
            Self::Katakana => "katakana",
            Self::Words => "words",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kanji" => Ok(Self::Kanji),
            "katakana" | "kana" => Ok(Self::Katakana),
            "words" | "word" | "vocabulary" => Ok(Self::Words),
            other => Err(format!("unknown collection: {other}")),
        }
    }
}
