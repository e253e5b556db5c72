use std::io::{self, Read};

use log::{debug, trace, warn};
use png::{BitDepth, ColorType, Decoder, InterlaceInfo, Transformations};

use crate::interlace::{pass_width, PassSequence};
use crate::normalize::{RowLayout, RowNormalizer};
use crate::{
    rgb_to_gray, GrayPalette, Heightmap, HeightmapError, HeightmapReport, Histogram, Result,
    MAX_PIXELS,
};

/// Input slice handed to the PNG parser per read.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// First four bytes of every PNG file.
const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

/// Options for heightmap analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Bytes fed to the PNG parser per read. Bounds the parser's input
    /// buffering; any non-zero value yields the same result.
    pub chunk_size: usize,

    /// Largest accepted `width * height`. Images above it are rejected
    /// before any pixel data is inflated. Must fit in a `u32` so no
    /// histogram bucket can overflow.
    pub max_pixels: u64,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_pixels: MAX_PIXELS,
        }
    }
}

impl AnalyzeOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.max_pixels > u32::MAX as u64 {
            return Err(HeightmapError::InvalidArguments);
        }
        Ok(())
    }
}

/// Where a [`DecodeState`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodePhase {
    /// Nothing parsed yet
    Initial,
    /// Header accepted, no scanline seen
    HeaderParsed,
    /// At least one scanline accumulated
    Decoding,
    /// All rows accumulated, result taken
    Done,
    /// An error was recorded; every further callback is a no-op
    Failed,
}

/// Header facts the metadata handler works from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
    pub bit_depth: BitDepth,
    pub interlaced: bool,
}

impl ImageHeader {
    pub fn layout(&self) -> RowLayout {
        RowLayout::new(self.color_type, self.bit_depth)
    }
}

impl From<&png::Info<'_>> for ImageHeader {
    fn from(info: &png::Info<'_>) -> Self {
        Self {
            width: info.width,
            height: info.height,
            color_type: info.color_type,
            bit_depth: info.bit_depth,
            interlaced: info.interlaced,
        }
    }
}

/// Mutable state of one analysis.
///
/// The PNG parser drives it through three callbacks: [`on_header`] once the
/// IHDR chunk is known, [`on_palette`] once the PLTE chunk is known and
/// [`on_scanline`] for every normalized row. Rows are counted and dropped;
/// the image itself is never stored.
///
/// [`on_header`]: DecodeState::on_header
/// [`on_palette`]: DecodeState::on_palette
/// [`on_scanline`]: DecodeState::on_scanline
#[derive(Clone, Debug)]
pub struct DecodeState {
    width: u32,
    height: u32,
    channels: u8,
    is_interlaced: bool,
    has_palette: bool,
    gray_palette: GrayPalette,
    histogram: Histogram,
    error: Option<HeightmapError>,
    phase: DecodePhase,
    max_pixels: u64,
}

impl Default for DecodeState {
    fn default() -> Self {
        Self::new(MAX_PIXELS)
    }
}

impl DecodeState {
    pub fn new(max_pixels: u64) -> Self {
        Self {
            width: 0,
            height: 0,
            channels: 0,
            is_interlaced: false,
            has_palette: false,
            gray_palette: GrayPalette::default(),
            histogram: Histogram::default(),
            error: None,
            phase: DecodePhase::Initial,
            max_pixels,
        }
    }

    pub fn phase(&self) -> DecodePhase {
        self.phase
    }

    pub fn error(&self) -> Option<&HeightmapError> {
        self.error.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn gray_palette(&self) -> &GrayPalette {
        &self.gray_palette
    }

    /// Records an error. The first error wins.
    pub fn fail(&mut self, err: HeightmapError) {
        if self.error.is_none() {
            debug!("heightmap: {err}");
            self.error = Some(err);
        }
        self.phase = DecodePhase::Failed;
    }

    /// Validates the header and records the image geometry.
    ///
    /// Checks run in order and stop at the first failure: normalized sample
    /// layout, interlacing, pixel count.
    pub fn on_header(&mut self, header: &ImageHeader) {
        if self.is_failed() {
            return;
        }

        let layout = header.layout();
        let channels = layout.channels();
        if !matches!(channels, 1 | 3) || layout.bit_depth() != 8 {
            self.fail(HeightmapError::UnsupportedFormat(
                "PNG uses unsupported channels or bit depth.",
            ));
            return;
        }
        if header.interlaced && channels != 1 {
            self.fail(HeightmapError::UnsupportedFormat(
                "Interlaced PNGs with more than one channel are not supported.",
            ));
            return;
        }

        self.width = header.width;
        self.height = header.height;

        if header.width as u64 * header.height as u64 > self.max_pixels {
            self.fail(HeightmapError::TooLarge {
                width: header.width,
                height: header.height,
            });
            return;
        }

        self.is_interlaced = header.interlaced;
        self.has_palette = layout.is_palette();
        self.channels = channels;
        self.phase = DecodePhase::HeaderParsed;

        debug!(
            "heightmap: {}x{} {:?} {}-bit{}",
            header.width,
            header.height,
            header.color_type,
            header.bit_depth as u8,
            if header.interlaced { " interlaced" } else { "" }
        );
    }

    /// Builds the gray lookup from raw PLTE data. Ignored for images that
    /// are not paletted.
    pub fn on_palette(&mut self, plte: &[u8]) {
        if self.is_failed() || !self.has_palette {
            return;
        }
        self.gray_palette = GrayPalette::from_plte(plte);
        trace!(
            "heightmap: {} palette entries{}",
            self.gray_palette.len(),
            if self.gray_palette.is_height_levels() {
                ", read as height levels"
            } else {
                ""
            }
        );
    }

    /// Adds one normalized row to the histogram.
    ///
    /// `row` holds `channels` bytes per pixel. `None` means the pass has no
    /// data for this row. `pass` is the Adam7 pass (0-6) and is only looked
    /// at for interlaced images; any other value makes the call a no-op.
    pub fn on_scanline(&mut self, row: Option<&[u8]>, pass: u8) {
        if self.is_failed() || self.channels == 0 {
            return;
        }
        let Some(row) = row else {
            return;
        };

        let pixels = if self.is_interlaced {
            match pass_width(pass, self.width) {
                Some(pixels) => pixels,
                None => return,
            }
        } else {
            self.width
        };
        self.phase = DecodePhase::Decoding;

        let channels = self.channels as usize;
        for pixel in row.chunks_exact(channels).take(pixels as usize) {
            let level = if self.has_palette {
                self.gray_palette.get(pixel[0])
            } else if channels == 3 {
                rgb_to_gray(pixel[0], pixel[1], pixel[2])
            } else {
                pixel[0]
            };
            self.histogram.record(level);
        }
    }

    /// Ends the analysis, yielding the heightmap or the recorded error.
    pub fn finish(&mut self) -> Result<Heightmap> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.phase = DecodePhase::Done;
        Ok(Heightmap {
            width: self.width,
            height: self.height,
            histogram: self.histogram,
        })
    }
}

/// Hands out the input in slices of at most `chunk_size` bytes.
pub(crate) struct SliceReader<'a> {
    remaining: &'a [u8],
    chunk_size: usize,
    slices: usize,
}

impl<'a> SliceReader<'a> {
    pub(crate) fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            remaining: data,
            chunk_size,
            slices: 0,
        }
    }
}

impl Read for SliceReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.chunk_size).min(self.remaining.len());
        let (slice, rest) = self.remaining.split_at(len);
        buf[..len].copy_from_slice(slice);
        self.remaining = rest;
        if len > 0 {
            self.slices += 1;
            trace!(
                "heightmap: slice {} ({len} bytes, {} left)",
                self.slices,
                rest.len()
            );
        }
        Ok(len)
    }
}

/// Analyzes a PNG heightmap with default options.
///
/// Never panics and never fails outright: problems end up in
/// [`HeightmapReport::error`].
///
/// # Example
///
/// ```rust
/// use heightmap_histogram::analyze;
///
/// let report = analyze(b"GIF89a");
/// assert_eq!(report.error, "File is not a PNG image.");
/// ```
#[must_use = "this returns the analysis report"]
pub fn analyze(png: &[u8]) -> HeightmapReport {
    analyze_with(png, &AnalyzeOptions::default())
}

/// Analyzes a PNG heightmap with explicit options.
#[must_use = "this returns the analysis report"]
pub fn analyze_with(png: &[u8], options: &AnalyzeOptions) -> HeightmapReport {
    decode_histogram(png, options).into()
}

/// Streams `png` through the parser and returns its dimensions and gray
/// level histogram.
///
/// Working memory is one raw row, one normalized row and the parser's
/// inflate state, independent of the image height.
///
/// # Errors
///
/// - [`HeightmapError::InvalidArguments`] for unusable `options`
/// - [`HeightmapError::NotPng`] when the PNG signature is missing
/// - [`HeightmapError::UnsupportedFormat`] for interlaced RGB images
/// - [`HeightmapError::TooLarge`] above `options.max_pixels`
/// - [`HeightmapError::ParserAllocation`] when the parser hits its memory limit
/// - [`HeightmapError::Stream`] for corrupt, truncated or checksum-failing data
pub fn decode_histogram(png: &[u8], options: &AnalyzeOptions) -> Result<Heightmap> {
    options.validate()?;
    if png.len() < PNG_MAGIC.len() || png[..PNG_MAGIC.len()] != PNG_MAGIC {
        warn!("heightmap: input is not a PNG ({} bytes)", png.len());
        return Err(HeightmapError::NotPng);
    }

    let mut state = DecodeState::new(options.max_pixels);
    if let Err(err) = drive(png, options.chunk_size, &mut state) {
        state.fail(err);
    }

    let result = state.finish();
    match &result {
        Ok(map) => debug!(
            "heightmap: {}x{} analyzed, {} pixels counted",
            map.width,
            map.height,
            map.histogram.total()
        ),
        Err(err) => warn!("heightmap: rejected: {err}"),
    }
    result
}

/// Pulls the image through `state`. The parser and its buffers are dropped
/// on return, whichever way it returns.
fn drive(png: &[u8], chunk_size: usize, state: &mut DecodeState) -> Result<()> {
    let mut decoder = Decoder::new(SliceReader::new(png, chunk_size));
    decoder.set_transformations(Transformations::STRIP_16);

    let header = ImageHeader::from(decoder.read_header_info()?);
    state.on_header(&header);
    if state.is_failed() {
        return Ok(());
    }

    let mut reader = decoder.read_info()?;
    match reader.info().palette.as_deref() {
        Some(plte) => state.on_palette(plte),
        None if header.color_type == ColorType::Indexed => {
            return Err(HeightmapError::Stream(
                "missing PLTE chunk before image data".to_string(),
            ));
        }
        None => {}
    }

    let layout = header.layout();
    let mut normalizer = RowNormalizer::new(layout);
    let mut passes = PassSequence::new(header.width, header.height, header.interlaced);
    while let Some(row) = reader.next_interlaced_row()? {
        let pass = passes.next().ok_or_else(|| {
            HeightmapError::Stream("more rows than the header declares".to_string())
        })?;
        if matches!(row.interlace(), InterlaceInfo::Adam7(_)) != header.interlaced {
            return Err(HeightmapError::Stream(
                "row interlacing does not match the header".to_string(),
            ));
        }
        let pixels = if header.interlaced {
            pass_width(pass, header.width).unwrap_or(0)
        } else {
            header.width
        } as usize;
        check_row_length(row.data(), layout.row_bytes(pixels), pass)?;
        let normalized = normalizer.normalize(row.data(), pixels);
        state.on_scanline(Some(normalized), pass);
    }
    if passes.next().is_some() {
        return Err(HeightmapError::Stream("image data ended early".to_string()));
    }

    reader.finish()?;
    Ok(())
}

/// Rejects a row whose length disagrees with the Adam7 geometry it is
/// counted against.
fn check_row_length(row: &[u8], expected: usize, pass: u8) -> Result<()> {
    if row.len() != expected {
        return Err(HeightmapError::Stream(format!(
            "pass {} row is {} bytes, expected {expected}",
            pass + 1,
            row.len()
        )));
    }
    Ok(())
}
