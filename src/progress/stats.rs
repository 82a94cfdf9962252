//! 学习进度统计：每次请求时从存储重新计算，不持久化任何状态。

use serde::Serialize;

use crate::progress::Learnable;
use crate::store::keys::CollectionKind;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total: usize,
    pub learned: usize,
}

impl CollectionStats {
    pub fn of<T: Learnable>(items: &[T]) -> Self {
        Self {
            total: items.len(),
            learned: items.iter().filter(|item| item.is_learned()).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub kanji: CollectionStats,
    pub katakana: CollectionStats,
    pub words: CollectionStats,
    /// round(100 * learned / total) over all three; 0 when everything is empty.
    pub combined_percentage: u32,
}

pub fn compute(kanji: CollectionStats, katakana: CollectionStats, words: CollectionStats) -> ProgressStats {
    let total = kanji.total + katakana.total + words.total;
    let learned = kanji.learned + katakana.learned + words.learned;
    let combined_percentage = if total == 0 {
        0
    } else {
        (100.0 * learned as f64 / total as f64).round() as u32
    };

    ProgressStats {
        kanji,
        katakana,
        words,
        combined_percentage,
    }
}

fn stats_or_empty<T: Learnable>(
    kind: CollectionKind,
    loaded: Result<Option<Vec<T>>, StoreError>,
) -> CollectionStats {
    match loaded {
        Ok(items) => items.map(|items| CollectionStats::of(&items)).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(collection = %kind, error = %e, "Collection unreadable, counted as empty");
            CollectionStats::default()
        }
    }
}

/// Statistics over the persisted collections. Unreadable collections count
/// as empty.
pub fn collect(store: &Store) -> ProgressStats {
    compute(
        stats_or_empty(CollectionKind::Kanji, store.get_kanji_list()),
        stats_or_empty(CollectionKind::Katakana, store.get_katakana_list()),
        stats_or_empty(CollectionKind::Words, store.get_words_list()),
    )
}
