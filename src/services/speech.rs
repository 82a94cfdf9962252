//! Device text-to-speech seam. The core never calls it; the app shell does,
//! through the helpers here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SPEECH_RATE, DEFAULT_TRANSLATION_DELAY_MS, ENGLISH_LANGUAGE_TAG, JAPANESE_LANGUAGE_TAG,
};

/// Pause between the Japanese utterance and its meaning.
pub const TRANSLATION_DELAY: Duration = Duration::from_millis(DEFAULT_TRANSLATION_DELAY_MS);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub language: String,
}

impl Voice {
    pub fn is_japanese(&self) -> bool {
        self.language.to_ascii_lowercase().starts_with("ja")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechOptions {
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    pub voice: Option<String>,
}

impl SpeechOptions {
    pub fn japanese(voice: Option<&str>) -> Self {
        Self {
            language: JAPANESE_LANGUAGE_TAG.to_string(),
            rate: DEFAULT_SPEECH_RATE,
            pitch: 1.0,
            voice: voice.map(str::to_string),
        }
    }

    pub fn english() -> Self {
        Self {
            language: ENGLISH_LANGUAGE_TAG.to_string(),
            rate: DEFAULT_SPEECH_RATE,
            pitch: 1.0,
            voice: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis is unavailable")]
    Unavailable,
    #[error("speech engine failed: {0}")]
    Engine(String),
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str, options: &SpeechOptions) -> Result<(), SpeechError>;
    async fn stop(&self) -> Result<(), SpeechError>;
    async fn is_available(&self) -> bool;
    async fn voices(&self) -> Result<Vec<Voice>, SpeechError>;
}

/// First Japanese voice in device order.
pub fn preferred_japanese_voice(voices: &[Voice]) -> Option<&Voice> {
    voices.iter().find(|voice| voice.is_japanese())
}

/// Speak `text` in Japanese, then, after `delay`, its English `meaning`.
/// Any utterance in progress is stopped first. Runs as one sequence: the
/// call returns after the last utterance was issued.
pub async fn speak_with_translation(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    meaning: Option<&str>,
    voice: Option<&str>,
    delay: Duration,
) -> Result<(), SpeechError> {
    synth.stop().await?;
    synth.speak(text, &SpeechOptions::japanese(voice)).await?;

    if let Some(meaning) = meaning.filter(|m| !m.trim().is_empty()) {
        tokio::time::sleep(delay).await;
        synth.speak(meaning, &SpeechOptions::english()).await?;
    }
    Ok(())
}
