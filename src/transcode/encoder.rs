use std::borrow::Cow;

use crate::{
    error::{RevealError, Result},
    models::AnimatedImage,
    transcode::quantize::{self, IndexedFrame},
};
use gif::{Encoder, Frame, Repeat};

/// Incremental GIF writer. Frames are appended in call order and the
/// container is only complete after [`GifAccumulator::finish`].
pub struct GifAccumulator {
    encoder: Encoder<Vec<u8>>,
    width: u16,
    height: u16,
    frames: usize,
}

impl GifAccumulator {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let to_u16 = |value: u32, what: &str| {
            u16::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| RevealError::TranscodeError(format!("invalid GIF {}: {}", what, value)))
        };
        let width = to_u16(width, "width")?;
        let height = to_u16(height, "height")?;

        let mut encoder = Encoder::new(Vec::new(), width, height, &[])?;
        encoder.set_repeat(Repeat::Infinite)?;

        Ok(Self {
            encoder,
            width,
            height,
            frames: 0,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Appends an already indexed frame with its local palette.
    pub fn push_indexed(&mut self, frame: &IndexedFrame, delay_centis: u16) -> Result<()> {
        let expected = self.width as usize * self.height as usize;
        if frame.indices.len() != expected {
            return Err(RevealError::TranscodeError(format!(
                "frame has {} pixels, expected {}",
                frame.indices.len(),
                expected
            )));
        }

        let gif_frame = Frame {
            width: self.width,
            height: self.height,
            delay: delay_centis,
            palette: Some(frame.palette.clone()),
            buffer: Cow::Borrowed(&frame.indices),
            ..Frame::default()
        };
        self.encoder.write_frame(&gif_frame)?;
        self.frames += 1;
        Ok(())
    }

    /// Quantizes an RGBA frame and appends it.
    pub fn push_rgba(
        &mut self,
        rgba: &[u8],
        delay_centis: u16,
        max_colors: usize,
        sample_factor: i32,
    ) -> Result<()> {
        let indexed = quantize::index_frame(rgba, max_colors, sample_factor)?;
        self.push_indexed(&indexed, delay_centis)
    }

    pub fn finish(self) -> Result<AnimatedImage> {
        if self.frames == 0 {
            return Err(RevealError::TranscodeError(
                "no frames were written to the GIF".into(),
            ));
        }
        let (width, height, frame_count) = (self.width, self.height, self.frames);
        let bytes = self.encoder.into_inner()?;
        Ok(AnimatedImage {
            bytes,
            width: width as u32,
            height: height as u32,
            frame_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
        rgba.iter().copied().cycle().take(width * height * 4).collect()
    }

    #[test]
    fn writes_looping_gif_with_every_frame() {
        let mut gif = GifAccumulator::new(8, 6).unwrap();
        for shade in [0u8, 120, 250] {
            gif.push_rgba(&solid(8, 6, [shade, shade, 255 - shade, 255]), 10, 256, 10)
                .unwrap();
        }
        assert_eq!(gif.frame_count(), 3);

        let image = gif.finish().unwrap();
        assert!(image.bytes.starts_with(b"GIF89a"));
        assert_eq!((image.width, image.height, image.frame_count), (8, 6, 3));

        let mut decoder = gif::DecodeOptions::new()
            .read_info(std::io::Cursor::new(&image.bytes))
            .unwrap();
        let mut delays = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            delays.push(frame.delay);
        }
        assert_eq!(delays, vec![10, 10, 10]);
    }

    #[test]
    fn rejects_mismatched_frames_and_empty_output() {
        let mut gif = GifAccumulator::new(4, 4).unwrap();
        let small = IndexedFrame {
            palette: vec![0, 0, 0, 255, 255, 255],
            indices: vec![0; 3],
        };
        assert!(gif.push_indexed(&small, 10).is_err());
        assert!(gif.finish().is_err());

        assert!(GifAccumulator::new(0, 4).is_err());
        assert!(GifAccumulator::new(70_000, 4).is_err());
    }
}
