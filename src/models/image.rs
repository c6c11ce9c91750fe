use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{RevealError, Result};
use crate::gemini::prompts::DEFAULT_TYPOGRAPHY_INSTRUCTION;

pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/png";

/// Style reference supplied by the caller; its bytes go to the model first.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    bytes: Vec<u8>,
    media_type: String,
}

impl ReferenceImage {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    /// Parses `data:<media-type>;base64,<payload>`.
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let rest = data_url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| RevealError::InputError("reference image is not a data URL".into()))?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            RevealError::InputError("reference image data URL has no payload".into())
        })?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| {
                RevealError::InputError("reference image data URL must be base64 encoded".into())
            })?
            .trim();

        let bytes = BASE64.decode(payload.trim()).map_err(|e| {
            RevealError::InputError(format!("reference image payload is not valid base64: {}", e))
        })?;
        if bytes.is_empty() {
            return Err(RevealError::InputError("reference image is empty".into()));
        }

        let media_type = if media_type.is_empty() {
            DEFAULT_IMAGE_MEDIA_TYPE
        } else {
            media_type
        };
        Ok(Self::new(bytes, media_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    text: String,
    style: String,
    typography_instruction: String,
    reference_image: Option<ReferenceImage>,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: String::new(),
            typography_instruction: String::new(),
            reference_image: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_typography(mut self, instruction: impl Into<String>) -> Self {
        self.typography_instruction = instruction.into();
        self
    }

    pub fn with_reference_image(mut self, image: ReferenceImage) -> Self {
        self.reference_image = Some(image);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// The caller's instruction, or the standard one when left blank.
    pub fn typography_instruction(&self) -> &str {
        let instruction = self.typography_instruction.trim();
        if instruction.is_empty() {
            DEFAULT_TYPOGRAPHY_INSTRUCTION
        } else {
            instruction
        }
    }

    pub fn reference_image(&self) -> Option<&ReferenceImage> {
        self.reference_image.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl ImageResult {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, BASE64.encode(&self.bytes))
    }

    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}
