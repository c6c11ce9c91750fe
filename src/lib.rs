//! # revealgen
//!
//! Text in, cinematic reveal out: a generative still image, an image-seeded
//! video job that is polled to completion, and an optional GIF re-encode of
//! the downloaded video.
//!
//! ```no_run
//! use revealgen::{GenerationRequest, RevealClient, RevealConfig};
//!
//! # async fn run() -> revealgen::Result<()> {
//! let client = RevealClient::new(RevealConfig::from_env())?;
//! let style = client.suggest_style("HELLO").await;
//! let reveal = client
//!     .generate_reveal(&GenerationRequest::new("HELLO").with_style(style))
//!     .await?;
//! let gif = client.transcode_to_gif(&reveal.video).await?;
//! gif.write_to("hello.gif").await?;
//! reveal.video.release().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod transcode;

pub use config::{PollPolicy, RetryPolicy, RevealConfig, TranscodeConfig};
pub use error::{Result, RevealError};
pub use gemini::{
    GenerationBackend, HttpBackend, ImageClient, Reveal, RevealClient, StyleClient, VideoClient,
};
pub use models::{
    AnimatedImage, GenerationRequest, ImageResult, OperationError, ReferenceImage, VideoAsset,
    VideoOperation,
};
pub use transcode::{transcode_to_gif, FfmpegVideoSource, GifAccumulator, VideoSource};
