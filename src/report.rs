//! Analysis results.

use core::ops::Index;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::Result;

/// Number of gray levels, one bucket each.
pub const HISTOGRAM_SIZE: usize = 256;

/// Pixel count per gray level. Index 0 is black (sea level in a heightmap).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Histogram {
    buckets: [u32; HISTOGRAM_SIZE],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            buckets: [0; HISTOGRAM_SIZE],
        }
    }
}

impl core::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // only the populated levels, 256 zeros are unreadable in test output
        f.debug_map()
            .entries(
                self.buckets
                    .iter()
                    .enumerate()
                    .filter(|(_, count)| **count > 0),
            )
            .finish()
    }
}

impl Histogram {
    #[inline]
    pub(crate) fn record(&mut self, level: u8) {
        self.buckets[level as usize] += 1;
    }

    pub fn get(&self, level: u8) -> u32 {
        self.buckets[level as usize]
    }

    /// Sum of all buckets.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|&count| count as u64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.buckets.iter().copied()
    }

    pub fn as_array(&self) -> &[u32; HISTOGRAM_SIZE] {
        &self.buckets
    }
}

impl From<[u32; HISTOGRAM_SIZE]> for Histogram {
    fn from(buckets: [u32; HISTOGRAM_SIZE]) -> Self {
        Self { buckets }
    }
}

impl Index<usize> for Histogram {
    type Output = u32;

    fn index(&self, level: usize) -> &u32 {
        &self.buckets[level]
    }
}

impl Serialize for Histogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.buckets.iter())
    }
}

/// A successfully analyzed heightmap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Heightmap {
    pub width: u32,
    pub height: u32,
    pub histogram: Histogram,
}

impl Heightmap {
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Outcome of [`analyze`](crate::analyze), flattened into one record.
///
/// An empty `error` means success. When `error` is set, `width`, `height`
/// and `histogram` are zeroed and must be ignored.
///
/// Serializes as a map with the keys `error`, `width`, `height` and
/// `histogram` (a sequence of 256 counts).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeightmapReport {
    pub error: String,
    pub width: u32,
    pub height: u32,
    pub histogram: Histogram,
}

impl HeightmapReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }

    /// Splits the record back into the successful heightmap or the message.
    pub fn into_result(self) -> core::result::Result<Heightmap, String> {
        if self.is_ok() {
            Ok(Heightmap {
                width: self.width,
                height: self.height,
                histogram: self.histogram,
            })
        } else {
            Err(self.error)
        }
    }
}

impl From<Result<Heightmap>> for HeightmapReport {
    fn from(result: Result<Heightmap>) -> Self {
        match result {
            Ok(map) => Self {
                error: String::new(),
                width: map.width,
                height: map.height,
                histogram: map.histogram,
            },
            Err(err) => Self {
                error: err.to_string(),
                ..Self::default()
            },
        }
    }
}

impl Serialize for HeightmapReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HeightmapReport", 4)?;
        state.serialize_field("error", &self.error)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("histogram", &self.histogram)?;
        state.end()
    }
}
