//! Hand-rolled PNG writer for test fixtures.
//!
//! Mainstream encoders cannot emit every layout the analyzer has to cope
//! with (Adam7, sub-byte palettes, 16-bit gray with alpha), so fixtures are
//! assembled chunk by chunk here. Scanlines always use filter type 0.

#![allow(dead_code)]

pub const GRAY: u8 = 0;
pub const RGB: u8 = 2;
pub const INDEXED: u8 = 3;
pub const GRAY_ALPHA: u8 = 4;
pub const RGBA: u8 = 6;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Adam7 (start column, start row, column step, row step) per pass.
const ADAM7: [(u32, u32, u32, u32); 7] = [
    (0, 0, 8, 8),
    (4, 0, 8, 8),
    (0, 4, 4, 8),
    (2, 0, 4, 4),
    (0, 2, 2, 4),
    (1, 0, 2, 2),
    (0, 1, 1, 2),
];

#[derive(Clone, Debug)]
pub struct PngFixture {
    pub width: u32,
    pub height: u32,
    pub color_type: u8,
    pub bit_depth: u8,
    pub interlaced: bool,
    pub palette: Option<Vec<[u8; 3]>>,
}

impl PngFixture {
    pub fn new(width: u32, height: u32, color_type: u8, bit_depth: u8) -> Self {
        Self {
            width,
            height,
            color_type,
            bit_depth,
            interlaced: false,
            palette: None,
        }
    }

    pub fn interlaced(mut self) -> Self {
        self.interlaced = true;
        self
    }

    pub fn palette(mut self, entries: Vec<[u8; 3]>) -> Self {
        self.palette = Some(entries);
        self
    }

    fn samples_per_pixel(&self) -> usize {
        match self.color_type {
            GRAY | INDEXED => 1,
            GRAY_ALPHA => 2,
            RGB => 3,
            RGBA => 4,
            other => panic!("bad color type {other}"),
        }
    }

    /// Encodes the image; `pixel(x, y)` returns the samples of one pixel at
    /// the fixture's bit depth.
    pub fn encode(&self, pixel: impl Fn(u32, u32) -> Vec<u16>) -> Vec<u8> {
        let mut raw = Vec::new();
        if self.interlaced {
            for &(x0, y0, dx, dy) in &ADAM7 {
                let xs: Vec<u32> = (x0..self.width).step_by(dx as usize).collect();
                if xs.is_empty() {
                    continue;
                }
                for y in (y0..self.height).step_by(dy as usize) {
                    self.push_row(&mut raw, xs.iter().map(|&x| pixel(x, y)));
                }
            }
        } else {
            for y in 0..self.height {
                self.push_row(&mut raw, (0..self.width).map(|x| pixel(x, y)));
            }
        }
        let idat = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);

        let mut png = self.header();
        if let Some(entries) = &self.palette {
            let plte: Vec<u8> = entries.iter().flatten().copied().collect();
            push_chunk(&mut png, b"PLTE", &plte);
        }
        push_chunk(&mut png, b"IDAT", &idat);
        push_chunk(&mut png, b"IEND", &[]);
        png
    }

    /// Signature, IHDR and IEND only.
    pub fn header_only(&self) -> Vec<u8> {
        let mut png = self.header();
        push_chunk(&mut png, b"IEND", &[]);
        png
    }

    fn header(&self) -> Vec<u8> {
        let mut ihdr = Vec::with_capacity(13);
        ihdr.extend_from_slice(&self.width.to_be_bytes());
        ihdr.extend_from_slice(&self.height.to_be_bytes());
        ihdr.extend_from_slice(&[
            self.bit_depth,
            self.color_type,
            0,
            0,
            self.interlaced as u8,
        ]);

        let mut png = SIGNATURE.to_vec();
        push_chunk(&mut png, b"IHDR", &ihdr);
        png
    }

    fn push_row(&self, raw: &mut Vec<u8>, pixels: impl Iterator<Item = Vec<u16>>) {
        raw.push(0);
        let bits = self.bit_depth as usize;
        let mut acc = 0u8;
        let mut filled = 0usize;
        for samples in pixels {
            assert_eq!(samples.len(), self.samples_per_pixel());
            for sample in samples {
                match bits {
                    16 => raw.extend_from_slice(&sample.to_be_bytes()),
                    8 => raw.push(sample as u8),
                    _ => {
                        acc |= (sample as u8) << (8 - bits - filled);
                        filled += bits;
                        if filled == 8 {
                            raw.push(acc);
                            acc = 0;
                            filled = 0;
                        }
                    }
                }
            }
        }
        if filled > 0 {
            raw.push(acc);
        }
    }
}

pub fn push_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deterministic gray pattern touching many levels.
pub fn gray_pattern(x: u32, y: u32) -> u8 {
    ((x * 37 + y * 11 + (x * y) % 7) % 256) as u8
}

/// Byte offset of the first chunk of the given kind.
pub fn find_chunk(png: &[u8], kind: &[u8; 4]) -> Option<usize> {
    let mut pos = SIGNATURE.len();
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        if &png[pos + 4..pos + 8] == kind {
            return Some(pos);
        }
        pos += 12 + len;
    }
    None
}
