use crate::error::Result;
use async_trait::async_trait;
use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

/// A decodable video the transcoder can seek through and sample.
#[async_trait]
pub trait VideoSource: Send {
    async fn metadata(&mut self) -> Result<VideoMetadata>;

    /// Resolves once the source is positioned at `timestamp_secs`.
    async fn seek(&mut self, timestamp_secs: f64) -> Result<()>;

    /// Renders the frame at the current position scaled to `width` x `height`.
    async fn draw_frame(&mut self, width: u32, height: u32) -> Result<RgbaImage>;
}
