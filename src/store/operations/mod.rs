pub mod kana;
pub mod kanji;
pub mod settings;
pub mod vocabulary;
