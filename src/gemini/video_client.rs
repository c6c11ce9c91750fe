use std::io::Cursor;
use std::sync::Arc;

use crate::{
    config::RevealConfig,
    error::{RevealError, Result},
    gemini::{backend::GenerationBackend, fetcher, poller, prompts, retry},
    models::{EncodedImage, PredictVideoRequest, VideoAsset, VideoInstance, VideoParameters},
};
use image::{ImageFormat, RgbImage};

pub const START_FRAME_WIDTH: u32 = 1280;
pub const START_FRAME_HEIGHT: u32 = 720;
pub const VIDEO_RESOLUTION: &str = "720p";
pub const VIDEO_ASPECT_RATIO: &str = "16:9";

#[derive(Clone)]
pub struct VideoClient {
    backend: Arc<dyn GenerationBackend>,
    config: Arc<RevealConfig>,
}

impl VideoClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: Arc<RevealConfig>) -> Self {
        Self { backend, config }
    }

    /// Generates a reveal that starts on a black frame and ends on `image_bytes`.
    ///
    /// Submission is retried on transient failures. A retried submission may
    /// leave a duplicate job on the service. No idempotency key is sent.
    pub async fn generate(
        &self,
        text: &str,
        image_bytes: &[u8],
        image_media_type: &str,
        style: &str,
    ) -> Result<VideoAsset> {
        if image_bytes.is_empty() {
            return Err(RevealError::InputError(
                "an image is required to generate a video".into(),
            ));
        }

        let model_id = self.config.video_model.as_str();
        let request = PredictVideoRequest {
            instances: vec![VideoInstance {
                prompt: prompts::video_prompt(text, style),
                image: EncodedImage::from_bytes(&black_start_frame()?, "image/png"),
                last_frame: Some(EncodedImage::from_bytes(image_bytes, image_media_type)),
            }],
            parameters: VideoParameters {
                sample_count: 1,
                resolution: VIDEO_RESOLUTION.to_string(),
                aspect_ratio: VIDEO_ASPECT_RATIO.to_string(),
            },
        };

        log::info!("Submitting video job to model: {}", model_id);
        let operation = retry::retry_with_backoff(
            "video submission",
            self.config.retry,
            retry::transient_only,
            || self.backend.submit_video(model_id, &request),
        )
        .await?;
        log::info!("Video job accepted as {}", operation.name);

        let operation = poller::poll_until_done(
            self.backend.as_ref(),
            operation,
            self.config.poll,
            retry::transient_only,
        )
        .await?;

        if let Some(error) = operation.error {
            let message = error
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "internal error during video generation".to_string());
            log::error!("Video job {} failed: {}", operation.name, message);
            return Err(RevealError::OperationFailed(message));
        }

        match operation.result_uri {
            Some(uri) => {
                fetcher::fetch_video_asset(
                    self.backend.as_ref(),
                    &uri,
                    &self.config.media_dir,
                    self.config.download_retry,
                )
                .await
            }
            None => Err(RevealError::OperationFailed(
                "unable to generate video, please try again".into(),
            )),
        }
    }
}

/// Solid black 1280x720 PNG used as the first frame of every reveal.
pub fn black_start_frame() -> Result<Vec<u8>> {
    let frame = RgbImage::new(START_FRAME_WIDTH, START_FRAME_HEIGHT);
    let mut encoded = Cursor::new(Vec::new());
    frame.write_to(&mut encoded, ImageFormat::Png)?;
    Ok(encoded.into_inner())
}
