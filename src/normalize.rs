//! Sample normalization for raw PNG rows.
//!
//! The parser hands over unfiltered rows with 16-bit samples already cut to
//! their high byte ([`png::Transformations::STRIP_16`]). The rest is done
//! here, before the histogram sees a row:
//!
//! - 1, 2 and 4 bit samples are unpacked to one byte each, keeping their
//!   value (a 1-bit image yields 0 and 1, not 0 and 255)
//! - alpha samples are dropped

use png::{BitDepth, ColorType};

/// Shape of decoded and normalized rows for one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLayout {
    color_type: ColorType,
    bits: u8,
}

impl RowLayout {
    /// Layout of rows decoded with `STRIP_16` from an image with this
    /// color type and header bit depth.
    pub fn new(color_type: ColorType, bit_depth: BitDepth) -> Self {
        let bits = match bit_depth {
            BitDepth::Sixteen => 8,
            other => other as u8,
        };
        Self { color_type, bits }
    }

    /// Samples per pixel in the decoded row.
    pub fn raw_samples(&self) -> usize {
        self.color_type.samples()
    }

    /// Samples per pixel after alpha has been stripped.
    pub fn channels(&self) -> u8 {
        match self.color_type {
            ColorType::Grayscale | ColorType::GrayscaleAlpha | ColorType::Indexed => 1,
            ColorType::Rgb | ColorType::Rgba => 3,
        }
    }

    /// Bits per sample after unpacking.
    pub fn bit_depth(&self) -> u8 {
        match self.bits {
            1 | 2 | 4 | 8 => 8,
            other => other,
        }
    }

    pub fn is_palette(&self) -> bool {
        self.color_type == ColorType::Indexed
    }

    /// Bytes one decoded row of `pixels` pixels occupies.
    pub fn row_bytes(&self, pixels: usize) -> usize {
        (pixels * self.raw_samples() * self.bits as usize).div_ceil(8)
    }

    fn passthrough(&self) -> bool {
        self.bits == 8 && self.raw_samples() == self.channels() as usize
    }
}

/// Converts decoded rows into normalized rows, reusing one row-sized buffer.
#[derive(Debug)]
pub struct RowNormalizer {
    layout: RowLayout,
    buffer: Vec<u8>,
}

impl RowNormalizer {
    pub fn new(layout: RowLayout) -> Self {
        Self {
            layout,
            buffer: Vec::new(),
        }
    }

    pub fn layout(&self) -> RowLayout {
        self.layout
    }

    /// Normalizes the first `pixels` pixels of `raw`.
    ///
    /// 8-bit rows without alpha are returned as-is. Pixels missing from a
    /// short row are left out rather than padded.
    pub fn normalize<'a>(&'a mut self, raw: &'a [u8], pixels: usize) -> &'a [u8] {
        let layout = self.layout;
        if layout.passthrough() {
            let end = raw.len().min(pixels * layout.raw_samples());
            return &raw[..end];
        }

        self.buffer.clear();
        let channels = layout.channels() as usize;
        match layout.bits {
            8 => {
                // alpha is always the last sample of a pixel
                for pixel in raw.chunks_exact(layout.raw_samples()).take(pixels) {
                    self.buffer.extend_from_slice(&pixel[..channels]);
                }
            }
            bits @ (1 | 2 | 4) => {
                let per_byte = 8 / bits as usize;
                let mask = (1u8 << bits) - 1;
                let available = (raw.len() * per_byte).min(pixels);
                self.buffer.extend((0..available).map(|idx| {
                    let shift = 8 - bits as usize * (idx % per_byte + 1);
                    (raw[idx / per_byte] >> shift) & mask
                }));
            }
            _ => {}
        }
        &self.buffer
    }
}
