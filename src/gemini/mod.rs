pub mod backend;
pub mod fetcher;
pub mod http;
pub mod image_client;
pub mod poller;
pub mod prompts;
pub mod retry;
pub mod style_client;
pub mod video_client;

#[cfg(test)]
pub(crate) mod testing;

use crate::{
    config::RevealConfig,
    error::Result,
    logger,
    models::{AnimatedImage, GenerationRequest, ImageResult, VideoAsset},
    transcode::{self, FfmpegVideoSource},
};
use std::sync::Arc;

pub use backend::GenerationBackend;
pub use http::HttpBackend;
pub use image_client::ImageClient;
pub use style_client::StyleClient;
pub use video_client::VideoClient;

/// Everything one generation session produced. The caller owns the video
/// file and releases it when it is no longer shown.
#[derive(Debug, Clone)]
pub struct Reveal {
    pub image: ImageResult,
    pub video: VideoAsset,
}

#[derive(Clone)]
pub struct RevealClient {
    image_client: ImageClient,
    video_client: VideoClient,
    style_client: StyleClient,
    config: Arc<RevealConfig>,
}

impl RevealClient {
    pub fn new(config: RevealConfig) -> Result<Self> {
        let config = Arc::new(config);
        let backend: Arc<dyn GenerationBackend> = Arc::new(HttpBackend::new(config.clone())?);
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: Arc<RevealConfig>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            image_client: ImageClient::new(backend.clone(), config.clone()),
            video_client: VideoClient::new(backend.clone(), config.clone()),
            style_client: StyleClient::new(backend, config.clone()),
            config,
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn video(&self) -> &VideoClient {
        &self.video_client
    }

    pub fn style(&self) -> &StyleClient {
        &self.style_client
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    pub async fn suggest_style(&self, text: &str) -> String {
        self.style_client.suggest(text).await
    }

    /// Image first, then the video seeded by it.
    pub async fn generate_reveal(&self, request: &GenerationRequest) -> Result<Reveal> {
        let _timer = logger::timer("reveal session");

        let image = self.image_client.generate(request).await?;
        let video = self
            .video_client
            .generate(request.text(), &image.bytes, &image.media_type, request.style())
            .await?;

        Ok(Reveal { image, video })
    }

    /// Re-encodes a downloaded video as an animated GIF using ffmpeg.
    pub async fn transcode_to_gif(&self, video: &VideoAsset) -> Result<AnimatedImage> {
        let mut source = FfmpegVideoSource::from_asset(video);
        transcode::transcode_to_gif(&mut source, &self.config.transcode).await
    }
}
