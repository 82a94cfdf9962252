use async_trait::async_trait;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::constants::{ENRICHMENT_TEMPERATURE, RECOGNITION_TEMPERATURE, WORDS_PER_UNLOCK};
use crate::progress::defaults::katakana_table;
use crate::progress::{Learnable, LearnableItem};
use crate::services::gateway::{
    parse_enrichment, parse_identification, parse_kanji_list, parse_katakana_list,
    parse_stroke_paths, parse_words, ContentGateway, GatewayError, Identification, StrokePath,
};
use crate::services::llm_provider::{ChatMessage, LlmProvider};
use crate::store::keys::CollectionKind;
use crate::store::operations::vocabulary::Vocabulary;

const TUTOR_PERSONA: &str = "You are a Japanese language tutor. Always answer with a single JSON object.";
const RECOGNIZER_PERSONA: &str = "You are a Japanese kanji recognition expert. Analyze drawing descriptions and identify the most likely kanji. Always answer with a single JSON object.";

/// Production gateway: chat completions for generated content, plain JSON
/// endpoints for the canonical lists.
pub struct RemoteContentGateway {
    config: GatewayConfig,
    llm: LlmProvider,
}

impl RemoteContentGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            config: config.clone(),
            llm: LlmProvider::new(config),
        }
    }

    fn ensure_enabled(&self) -> Result<(), GatewayError> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(GatewayError::Disabled)
        }
    }

    async fn ask(&self, persona: &str, prompt: String, temperature: f32) -> Result<String, GatewayError> {
        self.ensure_enabled()?;
        let messages = vec![ChatMessage::system(persona), ChatMessage::user(prompt)];
        Ok(self.llm.chat(messages, temperature).await?)
    }

    async fn get_json(&self, url: &str) -> Result<Value, GatewayError> {
        self.ensure_enabled()?;
        let response = self
            .llm
            .http_client()
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::MalformedResponse(format!("{url}: {e}")))
    }
}

fn enrichment_prompt(key: &str, kind: CollectionKind) -> String {
    match kind {
        CollectionKind::Kanji => format!(
            "Describe the kanji \"{key}\". Return JSON with: meaning, onyomi, kunyomi, \
             strokeOrder (text description), examples (array of {{word, reading, meaning}}), jlptLevel."
        ),
        CollectionKind::Katakana => format!(
            "Describe the katakana \"{key}\". Return JSON with: pronunciation, \
             examples (array of {{word, reading, meaning}})."
        ),
        CollectionKind::Words => format!(
            "Describe the Japanese word or phrase \"{key}\". Return JSON with: meaning, \
             reading, examples (array of {{sentence, translation}}), jlptLevel."
        ),
    }
}

#[async_trait]
impl ContentGateway for RemoteContentGateway {
    async fn fetch_item_enrichment(&self, key: &str, kind: CollectionKind) -> Result<Value, GatewayError> {
        let content = self
            .ask(TUTOR_PERSONA, enrichment_prompt(key, kind), ENRICHMENT_TEMPERATURE)
            .await?;
        parse_enrichment(&content)
    }

    async fn fetch_stroke_render(&self, glyph: &str) -> Result<Vec<StrokePath>, GatewayError> {
        let prompt = format!(
            "Give SVG path data for each stroke of the kanji \"{glyph}\" in stroke order, \
             on a 109x109 canvas. Return JSON: {{\"strokes\": [{{\"path\": \"...\"}}]}}."
        );
        let content = self.ask(TUTOR_PERSONA, prompt, ENRICHMENT_TEMPERATURE).await?;
        parse_stroke_paths(&content)
    }

    async fn fetch_canonical_list(&self, kind: CollectionKind) -> Result<Vec<LearnableItem>, GatewayError> {
        match kind {
            CollectionKind::Kanji => {
                let body = self.get_json(&self.config.kanji_list_url).await?;
                Ok(parse_kanji_list(&body)?.into_iter().map(Learnable::into_item).collect())
            }
            CollectionKind::Katakana => {
                let fetched = match self.get_json(&self.config.katakana_list_url).await {
                    Ok(body) => parse_katakana_list(&body),
                    Err(e) => Err(e),
                };
                let list = match fetched {
                    Ok(list) if !list.is_empty() => list,
                    Ok(_) => {
                        tracing::warn!("Canonical katakana list was empty, using built-in table");
                        katakana_table()
                    }
                    Err(GatewayError::Disabled) => return Err(GatewayError::Disabled),
                    Err(error) => {
                        tracing::warn!(error = %error, "Canonical katakana fetch failed, using built-in table");
                        katakana_table()
                    }
                };
                Ok(list.into_iter().map(Learnable::into_item).collect())
            }
            CollectionKind::Words => Err(GatewayError::Unsupported(kind)),
        }
    }

    async fn fetch_words_containing(&self, glyph: &str) -> Result<Vec<Vocabulary>, GatewayError> {
        let prompt = format!(
            "Generate {WORDS_PER_UNLOCK} common Japanese words that contain the kanji \"{glyph}\". \
             Return JSON: {{\"words\": [{{\"word\", \"reading\" (hiragana), \"meaning\" (English), \"jlpt\" (N5-N1)}}]}}."
        );
        let content = self.ask(TUTOR_PERSONA, prompt, ENRICHMENT_TEMPERATURE).await?;
        parse_words(&content)
    }

    async fn identify_from_description(&self, description: &str) -> Result<Identification, GatewayError> {
        let prompt = format!(
            "Based on this stroke pattern description, identify the most likely Japanese kanji:\n\
             {description}\n\
             Return JSON: {{\"kanji\": \"...\", \"alternatives\": [up to 3 kanji], \"confidence\": 1-100}}."
        );
        let content = self.ask(RECOGNIZER_PERSONA, prompt, RECOGNITION_TEMPERATURE).await?;
        parse_identification(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config(enabled: bool) -> GatewayConfig {
        GatewayConfig {
            enabled,
            mock: false,
            api_key: "gsk_test".to_string(),
            api_url: "http://127.0.0.1:9/chat".to_string(),
            kanji_list_url: "http://127.0.0.1:9/kanji".to_string(),
            katakana_list_url: "http://127.0.0.1:9/katakana".to_string(),
            timeout_secs: 2,
            ..GatewayConfig::default()
        }
    }

    #[tokio::test]
    async fn disabled_gateway_refuses_every_call() {
        let gateway = RemoteContentGateway::new(&unreachable_config(false));
        assert!(matches!(
            gateway.fetch_words_containing("一").await,
            Err(GatewayError::Disabled)
        ));
        assert!(matches!(
            gateway.fetch_canonical_list(CollectionKind::Katakana).await,
            Err(GatewayError::Disabled)
        ));
    }

    #[tokio::test]
    async fn katakana_falls_back_to_built_in_table() {
        let gateway = RemoteContentGateway::new(&unreachable_config(true));
        let list = gateway
            .fetch_canonical_list(CollectionKind::Katakana)
            .await
            .unwrap();
        assert_eq!(list.len(), katakana_table().len());
    }

    #[tokio::test]
    async fn kanji_list_failure_is_surfaced() {
        let gateway = RemoteContentGateway::new(&unreachable_config(true));
        let result = gateway.fetch_canonical_list(CollectionKind::Kanji).await;
        assert!(matches!(
            result,
            Err(GatewayError::Network { .. }) | Err(GatewayError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn words_have_no_canonical_list() {
        let gateway = RemoteContentGateway::new(&unreachable_config(true));
        assert!(matches!(
            gateway.fetch_canonical_list(CollectionKind::Words).await,
            Err(GatewayError::Unsupported(CollectionKind::Words))
        ));
    }

    #[test]
    fn prompts_name_the_item() {
        assert!(enrichment_prompt("ア", CollectionKind::Katakana).contains("katakana \"ア\""));
        assert!(enrichment_prompt("一人", CollectionKind::Words).contains("\"一人\""));
    }
}
