//! # heightmap_histogram
//!
//! Streaming analysis of PNG heightmaps: reports the image dimensions and a
//! 256-level grayscale histogram without ever holding the decoded image in
//! memory. Only one scanline (plus the inflate window of the PNG parser) is
//! alive at any time, so a 16384 x 16384 map costs the same few kilobytes
//! as a thumbnail.
//!
//! ## Gray levels
//!
//! - Grayscale images use the sample value directly.
//! - RGB images use a fixed-point luma, see [`rgb_to_gray`].
//! - Paletted images map each index through a [`GrayPalette`]. A 16-color
//!   palette with any colored entry is read as 16 height bands in palette
//!   order instead.
//!
//! Sub-byte samples are unpacked without rescaling, 16-bit samples keep their
//! high byte and alpha is ignored. Interlaced (Adam7) images are supported
//! for single-channel color types.
//!
//! ## Quick Start
//!
//! ```ignore
//! use heightmap_histogram::analyze;
//!
//! let report = analyze(&png_bytes);
//! if report.is_ok() {
//!     println!("{}x{}, sea level: {}", report.width, report.height, report.histogram[0]);
//! } else {
//!     eprintln!("rejected: {}", report.error);
//! }
//! ```
//!
//! The `Result` flavoured entry point is [`decode_histogram`]; [`classify`]
//! turns a decoded heightmap into resolution, shape and terrain buckets.

use thiserror::Error;

pub mod classify;
pub mod decoder;
pub mod interlace;
pub mod luma;
pub mod normalize;
pub mod palette;
pub mod report;

pub use classify::{classify, Classification, Resolution, Shape, TerrainType};
pub use decoder::{
    analyze, analyze_with, decode_histogram, AnalyzeOptions, DecodePhase, DecodeState, ImageHeader,
    DEFAULT_CHUNK_SIZE,
};
pub use luma::rgb_to_gray;
pub use palette::GrayPalette;
pub use report::{Heightmap, HeightmapReport, Histogram, HISTOGRAM_SIZE};

/// Errors that can occur while analyzing a heightmap.
///
/// The `Display` text of each variant is what ends up in
/// [`HeightmapReport::error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeightmapError {
    /// The analysis options are unusable (zero slice size, pixel limit
    /// beyond what a histogram bucket can count)
    #[error("Invalid arguments.")]
    InvalidArguments,

    /// Input is too short or does not start with the PNG signature
    #[error("File is not a PNG image.")]
    NotPng,

    /// The PNG parser could not allocate its working buffers within limits
    #[error("Failed to create PNG read struct.")]
    ParserAllocation,

    /// Color type, bit depth or interlacing combination is not supported
    #[error("{0}")]
    UnsupportedFormat(&'static str),

    /// Pixel count exceeds the configured limit
    #[error("Image is too large.")]
    TooLarge { width: u32, height: u32 },

    /// The PNG stream is corrupt, truncated or fails a checksum
    #[error("Corrupt PNG stream: {0}")]
    Stream(String),
}

impl From<png::DecodingError> for HeightmapError {
    fn from(err: png::DecodingError) -> Self {
        match err {
            png::DecodingError::LimitsExceeded => HeightmapError::ParserAllocation,
            other => HeightmapError::Stream(other.to_string()),
        }
    }
}

/// Result type for heightmap operations.
pub type Result<T> = core::result::Result<T, HeightmapError>;

/// Largest pixel count accepted by default (16384 x 16384).
pub const MAX_PIXELS: u64 = 16384 * 16384;
