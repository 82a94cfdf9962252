use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use nihongo_trainer::progress::{Learnable, LearnableItem};
use nihongo_trainer::services::gateway::{ContentGateway, GatewayError, Identification, StrokePath};
use nihongo_trainer::store::keys::CollectionKind;
use nihongo_trainer::store::operations::kana::Kana;
use nihongo_trainer::store::operations::kanji::Kanji;
use nihongo_trainer::store::operations::vocabulary::Vocabulary;

/// Gateway whose answers and failures are set by the test.
#[derive(Default)]
pub struct ScriptedGateway {
    pub canonical_kanji: Mutex<Vec<Kanji>>,
    pub canonical_katakana: Mutex<Vec<Kana>>,
    /// Glyphs whose word fetch times out.
    pub failing_glyphs: Mutex<HashSet<String>>,
    pub words_per_glyph: usize,
    pub word_delay: Duration,
    pub word_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            words_per_glyph: 2,
            ..Self::default()
        }
    }

    pub fn with_kanji(self, glyphs: &[&str]) -> Self {
        *self.canonical_kanji.lock().unwrap() = glyphs.iter().map(|g| Kanji::new(g, "")).collect();
        self
    }

    pub fn with_katakana(self, pairs: &[(&str, &str)]) -> Self {
        *self.canonical_katakana.lock().unwrap() = pairs.iter().map(|(g, r)| Kana::new(g, r)).collect();
        self
    }

    pub fn with_word_delay(mut self, delay: Duration) -> Self {
        self.word_delay = delay;
        self
    }

    pub fn fail_for(&self, glyph: &str) {
        self.failing_glyphs.lock().unwrap().insert(glyph.to_string());
    }

    pub fn recover(&self, glyph: &str) {
        self.failing_glyphs.lock().unwrap().remove(glyph);
    }

    pub fn word_calls(&self) -> usize {
        self.word_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGateway for ScriptedGateway {
    async fn fetch_item_enrichment(&self, key: &str, kind: CollectionKind) -> Result<Value, GatewayError> {
        Ok(json!({ "key": key, "kind": kind.as_str() }))
    }

    async fn fetch_stroke_render(&self, _glyph: &str) -> Result<Vec<StrokePath>, GatewayError> {
        Err(GatewayError::MalformedResponse("no strokes scripted".to_string()))
    }

    async fn fetch_canonical_list(&self, kind: CollectionKind) -> Result<Vec<LearnableItem>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match kind {
            CollectionKind::Kanji => Ok(self
                .canonical_kanji
                .lock()
                .unwrap()
                .iter()
                .cloned()
                .map(Learnable::into_item)
                .collect()),
            CollectionKind::Katakana => Ok(self
                .canonical_katakana
                .lock()
                .unwrap()
                .iter()
                .cloned()
                .map(Learnable::into_item)
                .collect()),
            CollectionKind::Words => Err(GatewayError::Unsupported(kind)),
        }
    }

    async fn fetch_words_containing(&self, glyph: &str) -> Result<Vec<Vocabulary>, GatewayError> {
        self.word_calls.fetch_add(1, Ordering::SeqCst);
        if !self.word_delay.is_zero() {
            tokio::time::sleep(self.word_delay).await;
        }
        if self.failing_glyphs.lock().unwrap().contains(glyph) {
            return Err(GatewayError::Timeout {
                url: format!("scripted://words/{glyph}"),
            });
        }
        Ok((0..self.words_per_glyph)
            .map(|i| Vocabulary {
                word: format!("{glyph}語{i}"),
                reading: format!("reading-{i}"),
                meaning: format!("word {i} with {glyph}"),
                jlpt: Some("N5".to_string()),
                source_kanji: String::new(),
                level: 9,
            })
            .collect())
    }

    async fn identify_from_description(&self, description: &str) -> Result<Identification, GatewayError> {
        if description.contains("Drawing with 1 strokes") {
            Ok(Identification {
                glyph: "一".to_string(),
                alternatives: vec!["二".to_string()],
                confidence: 90,
            })
        } else {
            Err(GatewayError::MalformedResponse("unrecognized drawing".to_string()))
        }
    }
}
