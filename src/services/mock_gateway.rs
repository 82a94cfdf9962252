use async_trait::async_trait;
use serde_json::{json, Value};

use crate::progress::defaults::katakana_table;
use crate::progress::{Learnable, LearnableItem};
use crate::services::gateway::{ContentGateway, GatewayError, Identification, StrokePath};
use crate::store::keys::CollectionKind;
use crate::store::operations::kanji::Kanji;
use crate::store::operations::vocabulary::Vocabulary;

const MOCK_GRADE_ONE: &[&str] = &["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];

/// Deterministic offline gateway for development (`GATEWAY_MOCK=true`).
#[derive(Debug, Default, Clone)]
pub struct MockContentGateway;

#[async_trait]
impl ContentGateway for MockContentGateway {
    async fn fetch_item_enrichment(&self, key: &str, kind: CollectionKind) -> Result<Value, GatewayError> {
        Ok(match kind {
            CollectionKind::Katakana => json!({
                "pronunciation": format!("mock pronunciation of {key}"),
                "examples": [],
            }),
            _ => json!({
                "meaning": format!("mock meaning of {key}"),
                "readings": [],
                "examples": [],
                "jlptLevel": "N5",
            }),
        })
    }

    async fn fetch_stroke_render(&self, glyph: &str) -> Result<Vec<StrokePath>, GatewayError> {
        let strokes = glyph.chars().count().max(1) as u32;
        Ok((1..=strokes)
            .map(|order| StrokePath {
                order,
                path: format!("M10 {y} L99 {y}", y = order * 20),
            })
            .collect())
    }

    async fn fetch_canonical_list(&self, kind: CollectionKind) -> Result<Vec<LearnableItem>, GatewayError> {
        match kind {
            CollectionKind::Kanji => Ok(MOCK_GRADE_ONE
                .iter()
                .map(|glyph| Kanji::new(glyph, "").into_item())
                .collect()),
            CollectionKind::Katakana => Ok(katakana_table().into_iter().map(Learnable::into_item).collect()),
            CollectionKind::Words => Err(GatewayError::Unsupported(kind)),
        }
    }

    async fn fetch_words_containing(&self, glyph: &str) -> Result<Vec<Vocabulary>, GatewayError> {
        Ok(["日", "人", "月"]
            .iter()
            .map(|suffix| Vocabulary {
                word: format!("{glyph}{suffix}"),
                reading: String::new(),
                meaning: format!("mock word with {glyph}"),
                jlpt: Some("N5".to_string()),
                source_kanji: String::new(),
                level: 0,
            })
            .collect())
    }

    async fn identify_from_description(&self, description: &str) -> Result<Identification, GatewayError> {
        let glyph = if description.contains("Drawing with 1 strokes") {
            "一"
        } else if description.contains("Drawing with 2 strokes") {
            "二"
        } else {
            "三"
        };
        Ok(Identification {
            glyph: glyph.to_string(),
            alternatives: vec!["十".to_string()],
            confidence: 50,
        })
    }
}
