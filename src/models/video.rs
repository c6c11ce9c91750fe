use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;
use crate::models::common::OperationResponse;

pub const DEFAULT_VIDEO_MEDIA_TYPE: &str = "video/mp4";
pub const GIF_MEDIA_TYPE: &str = "image/gif";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// Snapshot of a server-side video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    pub error: Option<OperationError>,
    pub result_uri: Option<String>,
}

impl VideoOperation {
    pub fn pending(name: impl Into<String>) -> Self {
        VideoOperation {
            name: name.into(),
            done: false,
            error: None,
            result_uri: None,
        }
    }

    pub fn succeeded(name: impl Into<String>, uri: impl Into<String>) -> Self {
        VideoOperation {
            name: name.into(),
            done: true,
            error: None,
            result_uri: Some(uri.into()),
        }
    }

    pub fn failed(name: impl Into<String>, message: Option<String>) -> Self {
        VideoOperation {
            name: name.into(),
            done: true,
            error: Some(OperationError {
                code: None,
                message,
            }),
            result_uri: None,
        }
    }
}

impl From<OperationResponse> for VideoOperation {
    fn from(response: OperationResponse) -> Self {
        let result_uri = response.video_uri().map(String::from);
        VideoOperation {
            name: response.name,
            done: response.done,
            error: response.error.map(|err| OperationError {
                code: err.code,
                message: err.message,
            }),
            result_uri,
        }
    }
}

/// A finished video held as a file in the media directory.
///
/// The file stays on disk until [`VideoAsset::release`] is called; dropping the
/// handle leaves it in place so the caller decides when it is no longer shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    id: Uuid,
    path: PathBuf,
    media_type: String,
    size: u64,
}

impl VideoAsset {
    pub async fn materialize(
        media_dir: &Path,
        bytes: &[u8],
        media_type: impl Into<String>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(media_dir).await?;

        let id = Uuid::new_v4();
        let path = media_dir.join(format!("{}.mp4", id));
        tokio::fs::write(&path, bytes).await?;

        Ok(VideoAsset {
            id,
            path,
            media_type: media_type.into(),
            size: bytes.len() as u64,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Locally addressable URL for players; not valid once released.
    pub fn locator(&self) -> String {
        format!("file://{}", self.path.display())
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    pub async fn release(self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Encoded animated GIF, ready to save or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
}

impl AnimatedImage {
    pub fn media_type(&self) -> &'static str {
        GIF_MEDIA_TYPE
    }

    pub fn extension(&self) -> &'static str {
        "gif"
    }

    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, &self.bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::OperationResponse;
    use serde_json::json;

    #[test]
    fn failed_operation_keeps_server_message() {
        let response: OperationResponse = serde_json::from_value(json!({
            "name": "operations/1",
            "done": true,
            "error": {"code": 3, "message": "prompt rejected"}
        }))
        .unwrap();

        let op = VideoOperation::from(response);
        assert!(op.done);
        assert_eq!(op.result_uri, None);
        assert_eq!(
            op.error.and_then(|e| e.message).as_deref(),
            Some("prompt rejected")
        );
    }

    #[test]
    fn pending_operation_has_no_result() {
        let response: OperationResponse =
            serde_json::from_value(json!({"name": "operations/2"})).unwrap();
        assert_eq!(VideoOperation::from(response), VideoOperation::pending("operations/2"));
    }

    #[tokio::test]
    async fn asset_lives_until_released() {
        let dir = tempfile::tempdir().unwrap();
        let asset = VideoAsset::materialize(dir.path(), b"mp4-bytes", DEFAULT_VIDEO_MEDIA_TYPE)
            .await
            .unwrap();

        assert!(asset.path().starts_with(dir.path()));
        assert!(asset.locator().starts_with("file://"));
        assert_eq!(asset.size(), 9);
        assert_eq!(asset.read_bytes().await.unwrap(), b"mp4-bytes");

        let path = asset.path().to_path_buf();
        let copy = asset.clone();
        drop(copy);
        assert!(path.exists());

        asset.release().await.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn animated_image_declares_gif() {
        let gif = AnimatedImage {
            bytes: b"GIF89a".to_vec(),
            width: 2,
            height: 2,
            frame_count: 1,
        };
        assert_eq!(gif.media_type(), "image/gif");
        assert_eq!(gif.extension(), "gif");
    }
}
