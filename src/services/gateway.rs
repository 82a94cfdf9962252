use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::MAX_CONFIDENCE;
use crate::progress::LearnableItem;
use crate::services::llm_provider::LlmError;
use crate::store::keys::CollectionKind;
use crate::store::operations::kana::Kana;
use crate::store::operations::kanji::Kanji;
use crate::store::operations::vocabulary::Vocabulary;

/// Everything the core asks of the outside world. Stateless; every call may
/// fail and every failure is recoverable for the caller.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Free-form explanation object; its fields depend on `kind`.
    async fn fetch_item_enrichment(&self, key: &str, kind: CollectionKind) -> Result<Value, GatewayError>;

    async fn fetch_stroke_render(&self, glyph: &str) -> Result<Vec<StrokePath>, GatewayError>;

    async fn fetch_canonical_list(&self, kind: CollectionKind) -> Result<Vec<LearnableItem>, GatewayError>;

    /// Candidate words, unleveled and not yet tagged with a source kanji.
    async fn fetch_words_containing(&self, glyph: &str) -> Result<Vec<Vocabulary>, GatewayError>;

    async fn identify_from_description(&self, description: &str) -> Result<Identification, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokePath {
    pub order: u32,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub glyph: String,
    pub alternatives: Vec<String>,
    /// 0..=100
    pub confidence: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("content gateway is disabled")]
    Disabled,
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("network error calling {url}: {message}")]
    Network { url: String, message: String },
    #[error("upstream {url} answered with status {status}")]
    Upstream { url: String, status: u16 },
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
    #[error("no canonical list for collection {0}")]
    Unsupported(CollectionKind),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Llm(LlmError::Timeout))
    }

    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout { url: url.to_string() }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

fn parse_json(content: &str) -> Result<Value, GatewayError> {
    serde_json::from_str(content).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

/// Models wrap lists inconsistently: `{ "words": [...] }`, `{ "strokes": [...] }`
/// or a bare array.
fn find_array<'a>(value: &'a Value, fields: &[&str]) -> Option<&'a Vec<Value>> {
    if let Some(array) = value.as_array() {
        return Some(array);
    }
    let obj = value.as_object()?;
    for field in fields {
        if let Some(array) = obj.get(*field).and_then(Value::as_array) {
            return Some(array);
        }
    }
    obj.values().find_map(Value::as_array)
}

fn string_field(value: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match value.get(*field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn parse_enrichment(content: &str) -> Result<Value, GatewayError> {
    let value = parse_json(content)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(GatewayError::MalformedResponse("enrichment is not an object".to_string()))
    }
}

pub fn parse_words(content: &str) -> Result<Vec<Vocabulary>, GatewayError> {
    let value = parse_json(content)?;
    let entries = find_array(&value, &["words", "items"])
        .ok_or_else(|| GatewayError::MalformedResponse("no word list in response".to_string()))?;

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let word = string_field(entry, &["word", "japanese", "text"])?;
            Some(Vocabulary {
                word,
                reading: string_field(entry, &["reading", "hiragana", "kana"]).unwrap_or_default(),
                meaning: string_field(entry, &["meaning", "english"]).unwrap_or_default(),
                jlpt: string_field(entry, &["jlpt", "jlptLevel", "level"]),
                source_kanji: String::new(),
                level: 0,
            })
        })
        .collect())
}

pub fn parse_stroke_paths(content: &str) -> Result<Vec<StrokePath>, GatewayError> {
    let value = parse_json(content)?;
    let entries = find_array(&value, &["strokes", "paths"])
        .ok_or_else(|| GatewayError::MalformedResponse("no stroke list in response".to_string()))?;

    let paths: Vec<StrokePath> = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(path) => Some(path.clone()),
            other => string_field(other, &["path", "d", "svg"]),
        })
        .enumerate()
        .map(|(index, path)| StrokePath {
            order: index as u32 + 1,
            path,
        })
        .collect();

    if paths.is_empty() {
        return Err(GatewayError::MalformedResponse("stroke list is empty".to_string()));
    }
    Ok(paths)
}

pub fn parse_identification(content: &str) -> Result<Identification, GatewayError> {
    let value = parse_json(content)?;
    let glyph = string_field(&value, &["kanji", "character", "mostLikely", "most_likely"])
        .ok_or_else(|| GatewayError::MalformedResponse("no recognized character".to_string()))?;

    let alternatives = find_array(&value, &["alternatives", "alternates", "alternative_kanji"])
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(s) => Some(s.clone()),
                    other => string_field(other, &["kanji", "character"]),
                })
                .filter(|alt| *alt != glyph)
                .take(3)
                .collect()
        })
        .unwrap_or_default();

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, f64::from(MAX_CONFIDENCE))
        .round() as u8;

    Ok(Identification {
        glyph,
        alternatives,
        confidence,
    })
}

/// kanjiapi.dev style: a bare array of glyph strings.
pub fn parse_kanji_list(value: &Value) -> Result<Vec<Kanji>, GatewayError> {
    let entries = value
        .as_array()
        .ok_or_else(|| GatewayError::MalformedResponse("kanji list is not an array".to_string()))?;
    Ok(entries
        .iter()
        .filter_map(Value::as_str)
        .map(|glyph| Kanji::new(glyph, ""))
        .collect())
}

/// Array of `{ "kana": "ア", "romaji": "a" }`.
pub fn parse_katakana_list(value: &Value) -> Result<Vec<Kana>, GatewayError> {
    let entries = value
        .as_array()
        .ok_or_else(|| GatewayError::MalformedResponse("katakana list is not an array".to_string()))?;
    Ok(entries
        .iter()
        .filter_map(|entry| {
            let glyph = string_field(entry, &["kana", "character"])?;
            let romaji = string_field(entry, &["romaji", "romanji"]).unwrap_or_default();
            Some(Kana::new(&glyph, &romaji))
        })
        .collect())
}
