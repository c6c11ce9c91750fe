use std::sync::Arc;

use crate::{
    config::RevealConfig,
    error::{RevealError, Result},
    gemini::{backend::GenerationBackend, prompts, retry},
    models::{
        Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        GenerationRequest, ImageConfig, ImageResult, Part, DEFAULT_IMAGE_MEDIA_TYPE,
    },
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

pub const IMAGE_ASPECT_RATIO: &str = "16:9";
pub const IMAGE_SIZE: &str = "1K";
const RESPONSE_MODALITIES: &[&str] = &["TEXT", "IMAGE"];

#[derive(Clone)]
pub struct ImageClient {
    backend: Arc<dyn GenerationBackend>,
    config: Arc<RevealConfig>,
}

impl ImageClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: Arc<RevealConfig>) -> Self {
        Self { backend, config }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<ImageResult> {
        let model_id = self.config.image_model.as_str();
        let payload = build_image_request(request);

        log::info!(
            "Generating image with model: {} (reference image: {})",
            model_id,
            request.reference_image().is_some()
        );

        let response = retry::retry_with_backoff(
            "image generation",
            self.config.retry,
            retry::transient_only,
            || self.backend.generate_content(model_id, &payload),
        )
        .await?;

        let image = extract_image(&response)?;
        log::info!(
            "Image generated: {} bytes of {}",
            image.bytes.len(),
            image.media_type
        );
        Ok(image)
    }
}

/// With a reference image the binary part goes first, then the instruction.
pub(crate) fn build_image_request(request: &GenerationRequest) -> GenerateContentRequest {
    let typography = request.typography_instruction();
    let parts = match request.reference_image() {
        Some(reference) => vec![
            Part::inline(reference.bytes(), reference.media_type()),
            Part::text(prompts::image_prompt_with_reference(
                request.text(),
                request.style(),
                typography,
            )),
        ],
        None => vec![Part::text(prompts::image_prompt(
            request.text(),
            request.style(),
            typography,
        ))],
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(
                RESPONSE_MODALITIES.iter().map(|m| m.to_string()).collect(),
            ),
            image_config: Some(ImageConfig {
                aspect_ratio: IMAGE_ASPECT_RATIO.to_string(),
                image_size: IMAGE_SIZE.to_string(),
            }),
            ..Default::default()
        }),
    }
}

/// First part carrying inline binary data wins; the payload is fully decoded
/// before anything is returned.
pub(crate) fn extract_image(response: &GenerateContentResponse) -> Result<ImageResult> {
    let inline = response
        .parts()
        .find(|part| part.is_inline())
        .and_then(|part| part.inline_data.as_ref())
        .ok_or(RevealError::NoImageProduced)?;

    let bytes = BASE64
        .decode(inline.data.as_bytes())
        .map_err(|e| RevealError::ResponseError(format!("image payload is not valid base64: {}", e)))?;

    let media_type = inline
        .mime_type
        .as_deref()
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MEDIA_TYPE)
        .to_string();

    Ok(ImageResult { bytes, media_type })
}
