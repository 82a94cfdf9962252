use crate::store::operations::kana::Kana;
use crate::store::operations::kanji::Kanji;
use crate::store::operations::vocabulary::Vocabulary;

const SEED_KANJI: &[(&str, &str)] = &[
    ("一", "one"),
    ("二", "two"),
    ("三", "three"),
    ("四", "four"),
    ("五", "five"),
    ("六", "six"),
];

const SEED_KATAKANA: &[(&str, &str)] = &[
    ("ア", "a"),
    ("イ", "i"),
    ("ウ", "u"),
    ("エ", "e"),
    ("オ", "o"),
    ("カ", "ka"),
    ("キ", "ki"),
    ("ク", "ku"),
    ("ケ", "ke"),
    ("コ", "ko"),
];

/// Basic katakana table, served when the canonical list cannot be fetched.
const KATAKANA_TABLE: &[(&str, &str)] = &[
    ("ア", "a"), ("イ", "i"), ("ウ", "u"), ("エ", "e"), ("オ", "o"),
    ("カ", "ka"), ("キ", "ki"), ("ク", "ku"), ("ケ", "ke"), ("コ", "ko"),
    ("サ", "sa"), ("シ", "shi"), ("ス", "su"), ("セ", "se"), ("ソ", "so"),
    ("タ", "ta"), ("チ", "chi"), ("ツ", "tsu"), ("テ", "te"), ("ト", "to"),
    ("ナ", "na"), ("ニ", "ni"), ("ヌ", "nu"), ("ネ", "ne"), ("ノ", "no"),
    ("ハ", "ha"), ("ヒ", "hi"), ("フ", "fu"), ("ヘ", "he"), ("ホ", "ho"),
    ("マ", "ma"), ("ミ", "mi"), ("ム", "mu"), ("メ", "me"), ("モ", "mo"),
    ("ヤ", "ya"), ("ユ", "yu"), ("ヨ", "yo"),
    ("ラ", "ra"), ("リ", "ri"), ("ル", "ru"), ("レ", "re"), ("ロ", "ro"),
    ("ワ", "wa"), ("ヲ", "wo"), ("ン", "n"),
];

pub fn seed_kanji() -> Vec<Kanji> {
    SEED_KANJI
        .iter()
        .map(|(glyph, meaning)| Kanji::new(glyph, meaning))
        .collect()
}

pub fn seed_katakana() -> Vec<Kana> {
    SEED_KATAKANA
        .iter()
        .map(|(glyph, romaji)| Kana::new(glyph, romaji))
        .collect()
}

/// Words only ever appear through unlocks.
pub fn seed_words() -> Vec<Vocabulary> {
    Vec::new()
}

pub fn katakana_table() -> Vec<Kana> {
    KATAKANA_TABLE
        .iter()
        .map(|(glyph, romaji)| Kana::new(glyph, romaji))
        .collect()
}
