use crate::error::{RevealError, Result};
use color_quant::NeuQuant;

pub const MAX_PALETTE_COLORS: usize = 256;

/// A frame reduced to a palette plus one palette index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    /// Packed RGB triples, at most 256 of them.
    pub palette: Vec<u8>,
    pub indices: Vec<u8>,
}

impl IndexedFrame {
    pub fn color_count(&self) -> usize {
        self.palette.len() / 3
    }
}

/// Builds a palette of at most `max_colors` entries for an RGBA buffer.
pub fn quantize(rgba: &[u8], max_colors: usize, sample_factor: i32) -> Result<NeuQuant> {
    if rgba.is_empty() || rgba.len() % 4 != 0 {
        return Err(RevealError::TranscodeError(format!(
            "frame buffer of {} bytes is not RGBA",
            rgba.len()
        )));
    }
    let colors = max_colors.clamp(2, MAX_PALETTE_COLORS);
    Ok(NeuQuant::new(sample_factor.clamp(1, 30), colors, rgba))
}

/// Maps every pixel to its nearest palette entry.
pub fn apply_palette(rgba: &[u8], quantizer: &NeuQuant) -> Vec<u8> {
    rgba.chunks_exact(4)
        .map(|pixel| quantizer.index_of(pixel) as u8)
        .collect()
}

pub fn index_frame(rgba: &[u8], max_colors: usize, sample_factor: i32) -> Result<IndexedFrame> {
    let quantizer = quantize(rgba, max_colors, sample_factor)?;
    let indices = apply_palette(rgba, &quantizer);
    Ok(IndexedFrame {
        palette: quantizer.color_map_rgb(),
        indices,
    })
}
