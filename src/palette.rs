//! Palette to gray-level lookup.
//!
//! Paletted heightmaps come in two flavours. Most store gray (or nearly gray)
//! colors and are mapped through the regular luma conversion. A palette of
//! exactly 16 entries with any colored entry is instead read as a list of
//! height bands: the first entry is sea level, every next entry is one band
//! higher, regardless of the actual colors.

use crate::luma::rgb_to_gray;

/// Largest palette a PNG can carry.
pub const PALETTE_MAX: usize = 256;

/// Palette size that triggers the height-band interpretation.
const HEIGHT_LEVEL_PALETTE_SIZE: usize = 16;

/// Gray level for every palette index of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrayPalette {
    levels: [u8; PALETTE_MAX],
    len: usize,
    height_levels: bool,
}

impl Default for GrayPalette {
    fn default() -> Self {
        Self {
            levels: [0; PALETTE_MAX],
            len: 0,
            height_levels: false,
        }
    }
}

impl GrayPalette {
    /// Builds the lookup from raw `PLTE` chunk data (packed RGB triples).
    ///
    /// A trailing partial triple and entries past 256 are ignored.
    pub fn from_plte(plte: &[u8]) -> Self {
        let entries = plte
            .chunks_exact(3)
            .take(PALETTE_MAX)
            .map(|rgb| [rgb[0], rgb[1], rgb[2]]);
        Self::build(entries, (plte.len() / 3).min(PALETTE_MAX))
    }

    /// Builds the lookup from RGB entries. Entries past 256 are ignored.
    pub fn from_rgb(entries: &[[u8; 3]]) -> Self {
        Self::build(
            entries.iter().copied().take(PALETTE_MAX),
            entries.len().min(PALETTE_MAX),
        )
    }

    fn build(entries: impl Iterator<Item = [u8; 3]>, len: usize) -> Self {
        let mut palette = Self {
            len,
            ..Self::default()
        };
        let candidate = len == HEIGHT_LEVEL_PALETTE_SIZE;
        let mut all_gray = true;

        for (idx, [r, g, b]) in entries.enumerate() {
            // once a 16-entry palette shows color, the levels are overwritten anyway
            if candidate && !all_gray {
                break;
            }
            all_gray &= r == g && r == b;
            palette.levels[idx] = rgb_to_gray(r, g, b);
        }

        if candidate && !all_gray {
            for idx in 0..len {
                palette.levels[idx] = (256 * idx / len) as u8;
            }
            palette.height_levels = true;
        }

        palette
    }

    /// Gray level for a palette index. Indices past the palette map to 0.
    #[inline]
    pub fn get(&self, index: u8) -> u8 {
        self.levels[index as usize]
    }

    /// Number of entries read from the palette.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the palette was read as 16 height bands instead of colors.
    pub fn is_height_levels(&self) -> bool {
        self.height_levels
    }

    pub fn as_array(&self) -> &[u8; PALETTE_MAX] {
        &self.levels
    }
}
