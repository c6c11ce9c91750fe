use std::path::Path;

use crate::{
    config::RetryPolicy,
    error::Result,
    gemini::{backend::GenerationBackend, retry},
    models::{VideoAsset, DEFAULT_VIDEO_MEDIA_TYPE},
};

/// Downloads a finished video and stores it as a playable local asset.
///
/// The locator is logged without the credential; the backend adds the key
/// only when it sends the request.
pub async fn fetch_video_asset(
    backend: &dyn GenerationBackend,
    locator: &str,
    media_dir: &Path,
    policy: RetryPolicy,
) -> Result<VideoAsset> {
    log::info!("Downloading generated video from {}", locator);

    let bytes = retry::retry_with_backoff("video download", policy, retry::always, move || {
        backend.download(locator)
    })
    .await?;

    let asset = VideoAsset::materialize(media_dir, &bytes, DEFAULT_VIDEO_MEDIA_TYPE).await?;
    log::info!(
        "Stored video {} ({} bytes) at {}",
        asset.id(),
        asset.size(),
        asset.path().display()
    );
    Ok(asset)
}
