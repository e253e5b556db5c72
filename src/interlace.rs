//! Adam7 pass geometry.
//!
//! The histogram only cares how many pixels each row carries, not where they
//! land in the final image, so this module never maps rows back to image
//! coordinates.

/// Number of Adam7 passes.
pub const ADAM7_PASSES: u8 = 7;

/// Number of pixels in one row of `pass` (0-based) for an image `width`
/// pixels wide, or `None` for a pass index past 6.
#[inline]
pub fn pass_width(pass: u8, width: u32) -> Option<u32> {
    let w = width as u64;
    let size = match pass {
        0 => (w + 7) / 8,
        1 => (w + 3) / 8,
        2 => (w + 3) / 4,
        3 => (w + 1) / 4,
        4 => (w + 1) / 2,
        5 => w / 2,
        6 => w,
        _ => return None,
    };
    Some(size as u32)
}

/// Number of rows in `pass` (0-based) for an image `height` pixels tall.
#[inline]
pub fn pass_height(pass: u8, height: u32) -> Option<u32> {
    let h = height as u64;
    let size = match pass {
        0 | 1 => (h + 7) / 8,
        2 => (h + 3) / 8,
        3 => (h + 3) / 4,
        4 => (h + 1) / 4,
        5 => (h + 1) / 2,
        6 => h / 2,
        _ => return None,
    };
    Some(size as u32)
}

/// Yields the pass index of every row the decoder emits, in stream order.
///
/// The parser does not report the pass number of a row, so the decode
/// driver walks this sequence alongside the parser's rows and rejects any
/// row that does not fit it.
///
/// Passes with no pixels (zero width or zero rows) are skipped, as they are
/// absent from the compressed stream. A non-interlaced image is a single
/// pass 0 holding `height` full rows.
#[derive(Clone, Debug)]
pub struct PassSequence {
    width: u32,
    height: u32,
    interlaced: bool,
    pass: u8,
    row: u32,
}

impl PassSequence {
    pub fn new(width: u32, height: u32, interlaced: bool) -> Self {
        Self {
            width,
            height,
            interlaced,
            pass: 0,
            row: 0,
        }
    }

    fn rows_in_pass(&self, pass: u8) -> u32 {
        if !self.interlaced {
            return if pass == 0 { self.height } else { 0 };
        }
        match (pass_width(pass, self.width), pass_height(pass, self.height)) {
            (Some(0), _) | (_, Some(0)) => 0,
            (Some(_), Some(rows)) => rows,
            _ => 0,
        }
    }
}

impl Iterator for PassSequence {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        while self.pass < ADAM7_PASSES {
            if self.row < self.rows_in_pass(self.pass) {
                self.row += 1;
                return Some(self.pass);
            }
            self.pass += 1;
            self.row = 0;
        }
        None
    }
}
