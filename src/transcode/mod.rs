//! Client-side video to GIF transcoding.
//!
//! Frames are sampled at a fixed rate, in increasing timestamp order, and fed
//! one by one into a [`GifAccumulator`]. Any failure aborts the whole run.

pub mod encoder;
pub mod ffmpeg;
pub mod quantize;
pub mod source;

pub use encoder::GifAccumulator;
pub use ffmpeg::FfmpegVideoSource;
pub use quantize::IndexedFrame;
pub use source::{VideoMetadata, VideoSource};

use crate::{
    config::TranscodeConfig,
    error::{RevealError, Result},
    logger,
    models::AnimatedImage,
};
use image::{imageops, RgbaImage};

/// Scales to `target_width`, keeping aspect ratio, with an even height.
pub fn output_dimensions(source_width: u32, source_height: u32, target_width: u32) -> (u32, u32) {
    if source_width == 0 || source_height == 0 || target_width == 0 {
        return (target_width.max(2), 2);
    }
    let scaled = (target_width as f64 * source_height as f64 / source_width as f64).round() as u32;
    let mut height = scaled.max(2);
    if height % 2 != 0 {
        height += 1;
    }
    (target_width, height)
}

/// Sample times in seconds: `floor(duration * fps)` of them, `1 / fps` apart.
pub fn sample_timestamps(duration_secs: f64, frames_per_second: u32) -> Vec<f64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 || frames_per_second == 0 {
        return Vec::new();
    }
    let count = (duration_secs * frames_per_second as f64 + 1e-9).floor() as usize;
    (0..count)
        .map(|index| index as f64 / frames_per_second as f64)
        .collect()
}

pub async fn transcode_to_gif<S>(source: &mut S, config: &TranscodeConfig) -> Result<AnimatedImage>
where
    S: VideoSource + ?Sized,
{
    let _timer = logger::timer("gif transcode");

    let metadata = source
        .metadata()
        .await
        .map_err(|e| describe("could not load video metadata", e))?;
    let (width, height) = output_dimensions(metadata.width, metadata.height, config.target_width);
    let timestamps = sample_timestamps(metadata.duration_secs, config.frames_per_second);
    if timestamps.is_empty() {
        return Err(RevealError::TranscodeError(format!(
            "video is too short to sample ({:.2}s)",
            metadata.duration_secs
        )));
    }

    log::info!(
        "Transcoding {:.2}s of {}x{} video into {} frames at {}x{}",
        metadata.duration_secs,
        metadata.width,
        metadata.height,
        timestamps.len(),
        width,
        height
    );

    let delay = config.frame_delay_centis();
    let mut gif = GifAccumulator::new(width, height)?;
    let mut last_frame: Option<RgbaImage> = None;

    for (index, &timestamp) in timestamps.iter().enumerate() {
        tokio::task::yield_now().await;

        let settled = match tokio::time::timeout(config.seek_timeout, source.seek(timestamp)).await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => return Err(describe(&format!("seek to {:.2}s failed", timestamp), e)),
            Err(_) => {
                log::warn!(
                    "Seek to {:.2}s did not settle within {}ms, reusing previous frame",
                    timestamp,
                    config.seek_timeout.as_millis()
                );
                false
            }
        };

        let frame = match (settled, last_frame.take()) {
            (false, Some(previous)) => previous,
            (_, previous) => {
                match tokio::time::timeout(config.decode_timeout, source.draw_frame(width, height))
                    .await
                {
                    Ok(Ok(drawn)) => fit(drawn, width, height),
                    Ok(Err(e)) => {
                        return Err(describe(&format!("could not draw frame {}", index), e))
                    }
                    Err(_) => match previous {
                        Some(previous) => {
                            log::warn!(
                                "Frame at {:.2}s did not decode within {}ms, reusing previous frame",
                                timestamp,
                                config.decode_timeout.as_millis()
                            );
                            previous
                        }
                        None => {
                            return Err(RevealError::TranscodeError(format!(
                                "frame {} did not decode within {}ms",
                                index,
                                config.decode_timeout.as_millis()
                            )))
                        }
                    },
                }
            }
        };

        gif.push_rgba(frame.as_raw(), delay, config.max_colors, config.sample_factor)
            .map_err(|e| describe(&format!("could not encode frame {}", index), e))?;
        last_frame = Some(frame);
    }

    let image = gif.finish()?;
    log::info!(
        "GIF ready: {} frames, {} bytes",
        image.frame_count,
        image.bytes.len()
    );
    Ok(image)
}

fn fit(frame: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        imageops::resize(&frame, width, height, imageops::FilterType::Triangle)
    }
}

fn describe(context: &str, err: RevealError) -> RevealError {
    match err {
        RevealError::TranscodeError(msg) => {
            RevealError::TranscodeError(format!("{}: {}", context, msg))
        }
        other => RevealError::TranscodeError(format!("{}: {}", context, other)),
    }
}
