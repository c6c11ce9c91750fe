use std::path::{Path, PathBuf};

use crate::{
    error::{RevealError, Result},
    models::VideoAsset,
    transcode::source::{VideoMetadata, VideoSource},
};
use async_trait::async_trait;
use image::RgbaImage;
use serde::Deserialize;
use tokio::process::Command;

/// Video source backed by the `ffprobe` and `ffmpeg` executables.
///
/// Seeking only records the position; each draw decodes one frame there.
/// Child processes are killed when the future driving them is dropped, so an
/// abandoned draw does not leave a decoder running.
#[derive(Debug, Clone)]
pub struct FfmpegVideoSource {
    path: PathBuf,
    position_secs: f64,
    ffprobe: Vec<String>,
    ffmpeg: Vec<String>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl FfmpegVideoSource {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            position_secs: 0.0,
            ffprobe: vec!["ffprobe".to_string()],
            ffmpeg: vec!["ffmpeg".to_string()],
        }
    }

    pub fn from_asset(asset: &VideoAsset) -> Self {
        Self::open(asset.path())
    }

    /// Program plus leading arguments used in place of `ffprobe`.
    pub fn with_ffprobe_command<S: AsRef<str>>(mut self, command: &[S]) -> Self {
        self.ffprobe = command.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Program plus leading arguments used in place of `ffmpeg`.
    pub fn with_ffmpeg_command<S: AsRef<str>>(mut self, command: &[S]) -> Self {
        self.ffmpeg = command.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tool(command: &[String]) -> Result<Command> {
    let (program, leading) = command
        .split_first()
        .ok_or_else(|| RevealError::ConfigError("empty tool command".into()))?;
    let mut cmd = Command::new(program);
    cmd.args(leading).kill_on_drop(true);
    Ok(cmd)
}

#[async_trait]
impl VideoSource for FfmpegVideoSource {
    async fn metadata(&mut self) -> Result<VideoMetadata> {
        let out = tool(&self.ffprobe)?
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(&self.path)
            .output()
            .await
            .map_err(|e| RevealError::TranscodeError(format!("failed to run ffprobe: {}", e)))?;
        if !out.status.success() {
            return Err(RevealError::TranscodeError(format!(
                "ffprobe failed for '{}': {}",
                self.path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        parse_probe_output(&out.stdout)
    }

    async fn seek(&mut self, timestamp_secs: f64) -> Result<()> {
        self.position_secs = timestamp_secs.max(0.0);
        Ok(())
    }

    async fn draw_frame(&mut self, width: u32, height: u32) -> Result<RgbaImage> {
        let out = tool(&self.ffmpeg)?
            .args(["-v", "error", "-ss", &format!("{:.3}", self.position_secs)])
            .arg("-i")
            .arg(&self.path)
            .args([
                "-frames:v",
                "1",
                "-vf",
                &format!("scale={}:{}", width, height),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .output()
            .await
            .map_err(|e| RevealError::TranscodeError(format!("failed to run ffmpeg: {}", e)))?;
        if !out.status.success() {
            return Err(RevealError::TranscodeError(format!(
                "ffmpeg could not decode '{}' at {:.3}s: {}",
                self.path.display(),
                self.position_secs,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let expected = width as usize * height as usize * 4;
        if out.stdout.len() < expected {
            return Err(RevealError::TranscodeError(format!(
                "decoded frame at {:.3}s has {} bytes, expected {}",
                self.position_secs,
                out.stdout.len(),
                expected
            )));
        }

        let mut pixels = out.stdout;
        pixels.truncate(expected);
        RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            RevealError::TranscodeError("decoded frame does not match its dimensions".into())
        })
    }
}

/// The video stream's own duration wins over the container's; an audio track
/// can make the container longer than the last decodable video frame.
fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| RevealError::TranscodeError(format!("ffprobe json parse failed: {}", e)))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| RevealError::TranscodeError("no video stream found".into()))?;

    let width = video
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| RevealError::TranscodeError("missing video width".into()))?;
    let height = video
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| RevealError::TranscodeError("missing video height".into()))?;

    let usable = |d: Option<&str>| {
        d.and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
    };
    let duration_secs = usable(video.duration.as_deref())
        .or_else(|| usable(parsed.format.as_ref().and_then(|f| f.duration.as_deref())))
        .ok_or_else(|| RevealError::TranscodeError("video has no usable duration".into()))?;

    Ok(VideoMetadata {
        width,
        height,
        duration_secs,
    })
}
