use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::progress::defaults::{seed_kanji, seed_katakana, seed_words};
use crate::progress::merge::merge_remote;
use crate::progress::{ItemKey, Learnable, LearnableItem};
use crate::services::gateway::{ContentGateway, GatewayError};
use crate::store::keys::CollectionKind;
use crate::store::operations::kana::Kana;
use crate::store::operations::kanji::Kanji;
use crate::store::operations::vocabulary::Vocabulary;
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("item '{key}' not found in {collection}")]
    ItemNotFound { collection: CollectionKind, key: String },
    #[error("collection {0} has no canonical list to refresh from")]
    NotRefreshable(CollectionKind),
}

/// 单次解锁的结果。失败不在这里，由调用方决定是报错还是降级为警告。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UnlockOutcome {
    AlreadyUnlocked,
    Unlocked { added: usize },
    /// The gateway had no words for this kanji; nothing was written.
    NoWords,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockWarning {
    pub code: &'static str,
    pub glyph: String,
    pub message: String,
}

impl UnlockWarning {
    fn unlock_failed(glyph: &str, error: &EngineError) -> Self {
        Self {
            code: "UNLOCK_FAILED",
            glyph: glyph.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result of `mark_learned`. The level change is always committed when this
/// is returned; `warning` reports an unlock that still needs a retry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUp {
    pub item: LearnableItem,
    pub previous_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock: Option<UnlockOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<UnlockWarning>,
}

/// An item plus its position in the stored list, which is what a word's
/// [`ItemKey`] needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedItem {
    pub index: usize,
    #[serde(flatten)]
    pub item: LearnableItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailure {
    pub glyph: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Learned kanji that were checked.
    pub examined: usize,
    pub unlocked: Vec<String>,
    pub already_unlocked: usize,
    /// Kanji the gateway returned no words for. They are fetched again on
    /// the next sweep.
    pub no_words: Vec<String>,
    pub words_added: usize,
    pub failed: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    pub kanji_reset: usize,
    pub katakana_reset: usize,
    pub words_removed: usize,
}

/// Owns every read-modify-write of the three collections. One lock per
/// collection; multi-collection operations lock kanji, katakana, words in
/// that order.
pub struct ProgressEngine {
    store: Arc<Store>,
    gateway: Arc<dyn ContentGateway>,
    kanji_lock: Mutex<()>,
    katakana_lock: Mutex<()>,
    words_lock: Mutex<()>,
}

impl ProgressEngine {
    pub fn new(store: Arc<Store>, gateway: Arc<dyn ContentGateway>) -> Self {
        Self {
            store,
            gateway,
            kanji_lock: Mutex::new(()),
            katakana_lock: Mutex::new(()),
            words_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<dyn ContentGateway> {
        &self.gateway
    }

    async fn lock(&self, kind: CollectionKind) -> MutexGuard<'_, ()> {
        match kind {
            CollectionKind::Kanji => self.kanji_lock.lock().await,
            CollectionKind::Katakana => self.katakana_lock.lock().await,
            CollectionKind::Words => self.words_lock.lock().await,
        }
    }

    fn read_collection<T: Learnable>(&self) -> Result<Option<Vec<T>>, StoreError> {
        self.store.read_blob(T::KIND.blob_key())
    }

    fn write_collection<T: Learnable>(&self, items: &[T]) -> Result<(), StoreError> {
        self.store.write_blob(T::KIND.blob_key(), items)
    }

    /// Collection for a mutation: seeded defaults when absent, an error when
    /// the stored blob is unreadable (it must not be overwritten).
    fn read_for_update<T: Learnable>(&self) -> Result<Vec<T>, StoreError> {
        match self.read_collection::<T>() {
            Ok(Some(items)) => Ok(items),
            Ok(None) => Ok(defaults_for::<T>()),
            Err(e) => {
                tracing::error!(
                    collection = %T::KIND,
                    error = %e,
                    "Stored collection is unreadable, refusing to overwrite it"
                );
                Err(e)
            }
        }
    }

    // ── load ──

    /// Never fails: a missing collection is seeded and persisted, an
    /// unreadable one is replaced in memory only.
    pub async fn load_or_seed<T: Learnable>(&self, defaults: Vec<T>) -> Vec<T> {
        let _guard = self.lock(T::KIND).await;
        match self.read_collection::<T>() {
            Ok(Some(items)) => items,
            Ok(None) => {
                if let Err(e) = self.write_collection(&defaults) {
                    tracing::error!(collection = %T::KIND, error = %e, "Failed to persist seed collection");
                } else {
                    tracing::info!(collection = %T::KIND, count = defaults.len(), "Seeded collection");
                }
                defaults
            }
            Err(e) => {
                tracing::warn!(
                    collection = %T::KIND,
                    error = %e,
                    "Stored collection failed to parse, using built-in defaults"
                );
                defaults
            }
        }
    }

    pub async fn load_kanji(&self) -> Vec<Kanji> {
        self.load_or_seed(seed_kanji()).await
    }

    pub async fn load_katakana(&self) -> Vec<Kana> {
        self.load_or_seed(seed_katakana()).await
    }

    pub async fn load_words(&self) -> Vec<Vocabulary> {
        self.load_or_seed(seed_words()).await
    }

    /// Loaded collection with each item's stored position; `active_only`
    /// hides mastered items.
    pub async fn collection(&self, kind: CollectionKind, active_only: bool) -> Vec<IndexedItem> {
        fn view<T: Learnable>(items: Vec<T>, active_only: bool) -> Vec<IndexedItem> {
            items
                .into_iter()
                .enumerate()
                .filter(|(_, item)| !active_only || !item.is_mastered())
                .map(|(index, item)| IndexedItem {
                    index,
                    item: item.into_item(),
                })
                .collect()
        }

        match kind {
            CollectionKind::Kanji => view(self.load_kanji().await, active_only),
            CollectionKind::Katakana => view(self.load_katakana().await, active_only),
            CollectionKind::Words => view(self.load_words().await, active_only),
        }
    }

    // ── refresh ──

    /// Fetch the canonical list and merge it over the stored collection.
    /// The fetch runs without holding the collection lock.
    pub async fn refresh<T: Learnable>(&self) -> Result<Vec<T>, EngineError> {
        if T::KIND == CollectionKind::Words {
            return Err(EngineError::NotRefreshable(T::KIND));
        }

        let remote: Vec<T> = self
            .gateway
            .fetch_canonical_list(T::KIND)
            .await
            .map_err(|e| {
                tracing::warn!(collection = %T::KIND, error = %e, "Canonical list fetch failed");
                e
            })?
            .into_iter()
            .filter_map(T::from_item)
            .collect();

        let _guard = self.lock(T::KIND).await;
        let local = self.read_for_update::<T>()?;
        let merged = merge_remote(&local, remote, |item| item.key().to_string());
        self.write_collection(&merged)?;

        tracing::info!(
            collection = %T::KIND,
            local = local.len(),
            merged = merged.len(),
            "Collection refreshed"
        );
        Ok(merged)
    }

    pub async fn refresh_kind(&self, kind: CollectionKind) -> Result<Vec<LearnableItem>, EngineError> {
        fn tagged<T: Learnable>(items: Vec<T>) -> Vec<LearnableItem> {
            items.into_iter().map(Learnable::into_item).collect()
        }

        match kind {
            CollectionKind::Kanji => Ok(tagged(self.refresh::<Kanji>().await?)),
            CollectionKind::Katakana => Ok(tagged(self.refresh::<Kana>().await?)),
            CollectionKind::Words => Err(EngineError::NotRefreshable(kind)),
        }
    }

    // ── level up ──

    async fn level_up<T: Learnable>(&self, key: &ItemKey) -> Result<(T, u32), EngineError> {
        let _guard = self.lock(T::KIND).await;
        let mut items = self.read_for_update::<T>()?;
        let index = key.locate(&items).ok_or_else(|| EngineError::ItemNotFound {
            collection: T::KIND,
            key: key.key.clone(),
        })?;

        let item = &mut items[index];
        let previous = item.level();
        item.set_level(previous.saturating_add(1));
        let updated = item.clone();

        self.write_collection(&items)?;
        tracing::debug!(collection = %T::KIND, key = %key.key, level = updated.level(), "Level up");
        Ok((updated, previous))
    }

    /// Raise one item's level by one. A kanji's first level-up also unlocks
    /// vocabulary; that step failing leaves the level change in place and
    /// comes back as a warning.
    pub async fn mark_learned(&self, kind: CollectionKind, key: &ItemKey) -> Result<LevelUp, EngineError> {
        match kind {
            CollectionKind::Kanji => {
                let (kanji, previous_level) = self.level_up::<Kanji>(key).await?;
                let mut level_up = LevelUp {
                    item: kanji.clone().into_item(),
                    previous_level,
                    unlock: None,
                    warning: None,
                };
                if previous_level == 0 {
                    match self.unlock_vocabulary_for(&kanji.kanji).await {
                        Ok(outcome) => level_up.unlock = Some(outcome),
                        Err(e) => {
                            tracing::warn!(
                                glyph = %kanji.kanji,
                                error = %e,
                                "Vocabulary unlock failed after level up; sweep will retry"
                            );
                            level_up.warning = Some(UnlockWarning::unlock_failed(&kanji.kanji, &e));
                        }
                    }
                }
                Ok(level_up)
            }
            CollectionKind::Katakana => {
                let (kana, previous_level) = self.level_up::<Kana>(key).await?;
                Ok(LevelUp {
                    item: kana.into_item(),
                    previous_level,
                    unlock: None,
                    warning: None,
                })
            }
            CollectionKind::Words => {
                let (word, previous_level) = self.level_up::<Vocabulary>(key).await?;
                Ok(LevelUp {
                    item: word.into_item(),
                    previous_level,
                    unlock: None,
                    warning: None,
                })
            }
        }
    }

    // ── unlock ──

    fn has_vocabulary_from(&self, glyph: &str) -> Result<bool, StoreError> {
        Ok(self
            .read_collection::<Vocabulary>()?
            .is_some_and(|words| words.iter().any(|w| w.source_kanji == glyph)))
    }

    fn has_kanji(&self, glyph: &str) -> Result<bool, StoreError> {
        Ok(self.read_for_update::<Kanji>()?.iter().any(|k| k.kanji == glyph))
    }

    /// Append words containing `glyph`, unless words from this kanji already
    /// exist. The guard is checked before the fetch and again under the lock.
    /// `glyph` must be in the kanji collection.
    pub async fn unlock_vocabulary_for(&self, glyph: &str) -> Result<UnlockOutcome, EngineError> {
        if self.has_vocabulary_from(glyph)? {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }
        if !self.has_kanji(glyph)? {
            return Err(EngineError::ItemNotFound {
                collection: CollectionKind::Kanji,
                key: glyph.to_string(),
            });
        }

        let fetched = self.gateway.fetch_words_containing(glyph).await?;
        if fetched.is_empty() {
            tracing::info!(glyph, "Gateway returned no words for kanji");
            return Ok(UnlockOutcome::NoWords);
        }

        let _guard = self.lock(CollectionKind::Words).await;
        let mut words = self.read_for_update::<Vocabulary>()?;
        if words.iter().any(|w| w.source_kanji == glyph) {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let added = fetched.len();
        words.extend(fetched.into_iter().map(|mut word| {
            word.source_kanji = glyph.to_string();
            word.level = 0;
            word
        }));
        self.write_collection(&words)?;

        tracing::info!(glyph, added, "Vocabulary unlocked");
        Ok(UnlockOutcome::Unlocked { added })
    }

    /// Make sure every learned kanji has its vocabulary. Each glyph is
    /// independent; failures are collected and the sweep continues.
    pub async fn sweep_unlocks(&self, kanji: &[Kanji]) -> SweepReport {
        let mut report = SweepReport::default();

        for item in kanji.iter().filter(|k| k.is_learned()) {
            report.examined += 1;
            match self.unlock_vocabulary_for(&item.kanji).await {
                Ok(UnlockOutcome::AlreadyUnlocked) => report.already_unlocked += 1,
                Ok(UnlockOutcome::NoWords) => report.no_words.push(item.kanji.clone()),
                Ok(UnlockOutcome::Unlocked { added }) => {
                    report.unlocked.push(item.kanji.clone());
                    report.words_added += added;
                }
                Err(e) => {
                    tracing::warn!(glyph = %item.kanji, error = %e, "Sweep unlock failed");
                    report.failed.push(SweepFailure {
                        glyph: item.kanji.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if report.examined > 0 {
            tracing::info!(
                examined = report.examined,
                unlocked = report.unlocked.len(),
                no_words = report.no_words.len(),
                failed = report.failed.len(),
                "Unlock sweep finished"
            );
        }
        report
    }

    /// Sweep over the persisted kanji collection.
    pub async fn sweep_stored(&self) -> Result<SweepReport, EngineError> {
        let kanji = self.read_collection::<Kanji>()?.unwrap_or_default();
        Ok(self.sweep_unlocks(&kanji).await)
    }

    pub fn related_words(&self, glyph: &str) -> Result<Vec<Vocabulary>, EngineError> {
        Ok(self
            .read_collection::<Vocabulary>()?
            .unwrap_or_default()
            .into_iter()
            .filter(|w| w.source_kanji == glyph || w.contains_glyph(glyph))
            .collect())
    }

    // ── reset ──

    /// Zero every kanji and katakana level and delete the vocabulary
    /// collection. Both leveled collections are read before anything is
    /// written, so an unreadable one aborts the reset untouched; the writes
    /// land as one atomic batch.
    pub async fn reset_all_progress(&self) -> Result<ResetSummary, EngineError> {
        let _kanji_guard = self.lock(CollectionKind::Kanji).await;
        let _katakana_guard = self.lock(CollectionKind::Katakana).await;
        let _words_guard = self.lock(CollectionKind::Words).await;

        let kanji = self.read_collection::<Kanji>()?;
        let katakana = self.read_collection::<Kana>()?;
        let words_removed = match self.read_collection::<Vocabulary>() {
            Ok(words) => words.map_or(0, |w| w.len()),
            Err(e) => {
                tracing::warn!(error = %e, "Vocabulary collection unreadable, deleting anyway");
                0
            }
        };

        let mut summary = ResetSummary {
            words_removed,
            ..ResetSummary::default()
        };
        let mut writes = Vec::new();
        if let Some(items) = kanji {
            summary.kanji_reset = items.len();
            writes.push((CollectionKind::Kanji.blob_key(), Store::serialize(&zeroed(items))?));
        }
        if let Some(items) = katakana {
            summary.katakana_reset = items.len();
            writes.push((CollectionKind::Katakana.blob_key(), Store::serialize(&zeroed(items))?));
        }
        self.store.apply_blob_batch(writes, &[CollectionKind::Words.blob_key()])?;

        tracing::warn!(
            kanji = summary.kanji_reset,
            katakana = summary.katakana_reset,
            words_removed = summary.words_removed,
            "All progress reset"
        );
        Ok(summary)
    }
}

fn zeroed<T: Learnable>(mut items: Vec<T>) -> Vec<T> {
    for item in &mut items {
        item.set_level(0);
    }
    items
}

fn defaults_for<T: Learnable>() -> Vec<T> {
    let items: Vec<LearnableItem> = match T::KIND {
        CollectionKind::Kanji => seed_kanji().into_iter().map(Learnable::into_item).collect(),
        CollectionKind::Katakana => seed_katakana().into_iter().map(Learnable::into_item).collect(),
        CollectionKind::Words => seed_words().into_iter().map(Learnable::into_item).collect(),
    };
    items.into_iter().filter_map(T::from_item).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::services::gateway::{Identification, StrokePath};
    use crate::store::keys::{KANJI_LIST, KATAKANA_LIST};

    #[derive(Default)]
    struct CountingGateway {
        word_calls: AtomicUsize,
        fail_words: bool,
        no_words: bool,
    }

    #[async_trait]
    impl ContentGateway for CountingGateway {
        async fn fetch_item_enrichment(&self, _key: &str, _kind: CollectionKind) -> Result<Value, GatewayError> {
            Err(GatewayError::Disabled)
        }

        async fn fetch_stroke_render(&self, _glyph: &str) -> Result<Vec<StrokePath>, GatewayError> {
            Err(GatewayError::Disabled)
        }

        async fn fetch_canonical_list(&self, kind: CollectionKind) -> Result<Vec<LearnableItem>, GatewayError> {
            match kind {
                CollectionKind::Kanji => Ok(vec![
                    Kanji::new("二", "").into_item(),
                    Kanji::new("七", "").into_item(),
                ]),
                _ => Err(GatewayError::Unsupported(kind)),
            }
        }

        async fn fetch_words_containing(&self, glyph: &str) -> Result<Vec<Vocabulary>, GatewayError> {
            self.word_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_words {
                return Err(GatewayError::Timeout { url: "mock".to_string() });
            }
            if self.no_words {
                return Ok(Vec::new());
            }
            Ok(vec![Vocabulary {
                word: format!("{glyph}人"),
                reading: String::new(),
                meaning: String::new(),
                jlpt: None,
                source_kanji: String::new(),
                level: 3,
            }])
        }

        async fn identify_from_description(&self, _description: &str) -> Result<Identification, GatewayError> {
            Err(GatewayError::Disabled)
        }
    }

    fn engine_with(gateway: CountingGateway) -> (TempDir, Arc<CountingGateway>, ProgressEngine) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("engine-db").to_str().unwrap()).unwrap();
        let gateway = Arc::new(gateway);
        let engine = ProgressEngine::new(Arc::new(store), gateway.clone());
        (dir, gateway, engine)
    }

    #[tokio::test]
    async fn seeds_once_then_reads_back() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        let first = engine.load_kanji().await;
        assert_eq!(first, seed_kanji());
        assert!(engine.store().has_blob(KANJI_LIST).unwrap());
    }

    #[tokio::test]
    async fn corrupt_collection_is_not_overwritten() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        engine.store().content.insert(KANJI_LIST, b"{broken".to_vec()).unwrap();

        assert_eq!(engine.load_kanji().await, seed_kanji());
        let err = engine
            .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("一"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(ref e) if e.is_corrupt_blob()));
        assert_eq!(
            engine.store().content.get(KANJI_LIST).unwrap().unwrap().as_ref(),
            b"{broken"
        );
    }

    #[tokio::test]
    async fn first_kanji_level_up_unlocks_words() {
        let (_dir, gw, engine) = engine_with(CountingGateway::default());
        engine.load_kanji().await;

        let first = engine
            .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("一"))
            .await
            .unwrap();
        assert_eq!(first.previous_level, 0);
        assert_eq!(first.unlock, Some(UnlockOutcome::Unlocked { added: 1 }));

        let second = engine
            .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("一"))
            .await
            .unwrap();
        assert_eq!(second.item.level(), 2);
        assert!(second.unlock.is_none());
        assert_eq!(gw.word_calls.load(Ordering::SeqCst), 1);

        let words = engine.load_words().await;
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].source_kanji, "一");
        assert_eq!(words[0].level, 0);
    }

    #[tokio::test]
    async fn failed_unlock_keeps_level_and_warns() {
        let (_dir, _gw, engine) = engine_with(CountingGateway {
            fail_words: true,
            ..CountingGateway::default()
        });
        engine.load_kanji().await;

        let result = engine
            .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("二"))
            .await
            .unwrap();
        let warning = result.warning.unwrap();
        assert_eq!(warning.code, "UNLOCK_FAILED");
        assert_eq!(warning.glyph, "二");

        let kanji = engine.load_kanji().await;
        assert_eq!(kanji.iter().find(|k| k.kanji == "二").unwrap().level, 1);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        let err = engine
            .mark_learned(CollectionKind::Katakana, &ItemKey::glyph("ン"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ItemNotFound { collection: CollectionKind::Katakana, .. }));
    }

    #[tokio::test]
    async fn refresh_keeps_levels_of_known_items() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        engine.load_kanji().await;
        engine
            .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("二"))
            .await
            .unwrap();

        let merged = engine.refresh::<Kanji>().await.unwrap();
        let keys: Vec<&str> = merged.iter().map(|k| k.kanji.as_str()).collect();
        assert_eq!(keys, vec!["二", "七"]);
        assert_eq!(merged[0].level, 1);
        assert_eq!(merged[0].meaning, "two");
        assert_eq!(merged[1].level, 0);

        assert!(matches!(
            engine.refresh_kind(CollectionKind::Words).await,
            Err(EngineError::NotRefreshable(CollectionKind::Words))
        ));
    }

    #[tokio::test]
    async fn sweep_continues_past_failures() {
        let (_dir, gw, engine) = engine_with(CountingGateway {
            fail_words: true,
            ..CountingGateway::default()
        });
        let mut kanji = seed_kanji();
        kanji[0].level = 1;
        kanji[2].level = 4;

        let report = engine.sweep_unlocks(&kanji).await;
        assert_eq!(report.examined, 2);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_clean());
        assert_eq!(gw.word_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reset_zeroes_levels_and_drops_words() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        engine.load_kanji().await;
        engine.load_katakana().await;
        engine
            .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("三"))
            .await
            .unwrap();
        engine
            .mark_learned(CollectionKind::Katakana, &ItemKey::glyph("イ"))
            .await
            .unwrap();

        let summary = engine.reset_all_progress().await.unwrap();
        assert_eq!(summary.kanji_reset, seed_kanji().len());
        assert_eq!(summary.katakana_reset, seed_katakana().len());
        assert_eq!(summary.words_removed, 1);

        assert!(engine.load_kanji().await.iter().all(|k| k.level == 0));
        assert!(engine.load_katakana().await.iter().all(|k| k.level == 0));
        assert!(engine.load_words().await.is_empty());
    }

    #[tokio::test]
    async fn active_collection_hides_mastered_but_keeps_positions() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        engine.load_kanji().await;
        for _ in 0..5 {
            engine
                .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("二"))
                .await
                .unwrap();
        }

        let active = engine.collection(CollectionKind::Kanji, true).await;
        assert_eq!(active.len(), seed_kanji().len() - 1);
        assert_eq!(active[1].index, 2);
        assert_eq!(
            engine.collection(CollectionKind::Kanji, false).await.len(),
            seed_kanji().len()
        );
    }

    #[tokio::test]
    async fn related_words_match_source_or_surface() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        engine.unlock_vocabulary_for("三").await.unwrap();
        let related = engine.related_words("三").unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].word, "三人");
        assert_eq!(engine.related_words("人").unwrap().len(), 1);
        assert!(engine.related_words("川").unwrap().is_empty());
    }

    #[tokio::test]
    async fn unlock_rejects_glyph_outside_kanji_collection() {
        let (_dir, gw, engine) = engine_with(CountingGateway::default());
        engine.load_kanji().await;

        let err = engine.unlock_vocabulary_for("山").await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::ItemNotFound { collection: CollectionKind::Kanji, ref key } if key == "山"
        ));
        assert_eq!(gw.word_calls.load(Ordering::SeqCst), 0);
        assert!(engine.load_words().await.is_empty());
    }

    #[tokio::test]
    async fn empty_word_list_is_reported_and_not_written() {
        let (_dir, gw, engine) = engine_with(CountingGateway {
            no_words: true,
            ..CountingGateway::default()
        });
        let mut kanji = seed_kanji();
        kanji[1].level = 1;

        let outcome = engine.unlock_vocabulary_for("二").await.unwrap();
        assert_eq!(outcome, UnlockOutcome::NoWords);
        assert!(!engine.store().has_blob(CollectionKind::Words.blob_key()).unwrap());

        let report = engine.sweep_unlocks(&kanji).await;
        assert_eq!(report.no_words, vec!["二".to_string()]);
        assert!(report.unlocked.is_empty());
        assert_eq!(report.words_added, 0);
        assert!(report.is_clean());
        assert_eq!(gw.word_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reset_with_unreadable_katakana_changes_nothing() {
        let (_dir, _gw, engine) = engine_with(CountingGateway::default());
        engine.load_kanji().await;
        engine
            .mark_learned(CollectionKind::Kanji, &ItemKey::glyph("一"))
            .await
            .unwrap();
        engine.store().content.insert(KATAKANA_LIST, b"{broken".to_vec()).unwrap();

        assert!(engine.reset_all_progress().await.is_err());
        let kanji = engine.load_kanji().await;
        assert_eq!(kanji[0].level, 1);
        assert_eq!(engine.load_words().await.len(), 1);
    }
}
