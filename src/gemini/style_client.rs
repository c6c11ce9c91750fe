use std::sync::Arc;

use crate::{
    config::RevealConfig,
    gemini::{backend::GenerationBackend, prompts},
    models::{Content, GenerateContentRequest, GenerationConfig, Part, ThinkingConfig},
};
use rand::seq::SliceRandom;

const SUGGESTION_TEMPERATURE: f32 = 0.9;
const SUGGESTION_MAX_TOKENS: u32 = 60;

/// Best-effort style suggestions. Never fails: any problem with the remote
/// call yields a random curated style instead.
#[derive(Clone)]
pub struct StyleClient {
    backend: Arc<dyn GenerationBackend>,
    config: Arc<RevealConfig>,
}

impl StyleClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: Arc<RevealConfig>) -> Self {
        Self { backend, config }
    }

    pub async fn suggest(&self, text: &str) -> String {
        let model_id = self.config.text_model.as_str();
        let request = build_suggestion_request(text);

        match self.backend.generate_content(model_id, &request).await {
            Ok(response) => match response
                .first_text()
                .map(|text| text.trim_matches(|c| c == '"' || c == '\'').trim())
                .filter(|text| !text.is_empty())
            {
                Some(style) => {
                    log::debug!("Style suggestion from {}: {}", model_id, style);
                    style.to_string()
                }
                None => {
                    log::warn!("Style suggestion came back empty, using a fallback style");
                    random_fallback_style().to_string()
                }
            },
            Err(e) => {
                log::warn!("Style suggestion failed, using a fallback style: {}", e);
                random_fallback_style().to_string()
            }
        }
    }
}

pub fn random_fallback_style() -> &'static str {
    prompts::FALLBACK_STYLES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Cinematic golden hour light")
}

fn build_suggestion_request(text: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(prompts::style_suggestion_prompt(text))],
        }],
        generation_config: Some(GenerationConfig {
            temperature: Some(SUGGESTION_TEMPERATURE),
            max_output_tokens: Some(SUGGESTION_MAX_TOKENS),
            thinking_config: Some(ThinkingConfig { thinking_budget: 0 }),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RevealError;
    use crate::gemini::testing::{overloaded, parts_response, text_response, ScriptedBackend};

    fn client(backend: Arc<ScriptedBackend>) -> StyleClient {
        StyleClient::new(backend, Arc::new(RevealConfig::new()))
    }

    #[tokio::test]
    async fn returns_trimmed_suggestion() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_content(Ok(text_response("  \"Rusted steel in a foundry\"\n")));

        let style = client(backend.clone()).suggest("HELLO").await;

        assert_eq!(style, "Rusted steel in a foundry");
        let (model, request) = backend.content_requests.lock().unwrap()[0].clone();
        assert_eq!(model, RevealConfig::new().text_model);
        let generation = request.generation_config.unwrap();
        assert_eq!(generation.max_output_tokens, Some(SUGGESTION_MAX_TOKENS));
        assert!(generation.image_config.is_none());
    }

    #[tokio::test]
    async fn remote_failure_falls_back_without_retry() {
        for failure in [
            overloaded(),
            RevealError::HttpStatus {
                status: 401,
                body: "API key not valid".into(),
            },
        ] {
            let backend = Arc::new(ScriptedBackend::new());
            backend.push_content(Err(failure));

            let style = client(backend.clone()).suggest("HELLO").await;

            assert!(prompts::FALLBACK_STYLES.contains(&style.as_str()));
            assert_eq!(backend.content_calls(), 1);
        }
    }

    #[tokio::test]
    async fn empty_or_non_text_response_falls_back() {
        let backend = Arc::new(ScriptedBackend::new());
        backend
            .push_content(Ok(text_response("   ")))
            .push_content(Ok(parts_response(vec![Part::inline(&[1], "image/png")])));
        let client = client(backend);

        for _ in 0..2 {
            let style = client.suggest("HELLO").await;
            assert!(prompts::FALLBACK_STYLES.contains(&style.as_str()));
        }
    }
}
