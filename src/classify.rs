//! Coarse heightmap classification from the histogram.
//!
//! Buckets a heightmap by surface area, aspect ratio and how many distinct
//! elevation bands cover a meaningful share of the land.

use serde::Serialize;

use crate::Heightmap;

/// Surface area bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// Below 256 x 256 pixels
    Low,
    /// Below 1024 x 1024 pixels
    Normal,
    High,
}

/// Aspect ratio bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// Long side less than 1.2 times the short side
    Square,
    /// Long side less than 2.5 times the short side
    Rectangle,
    Narrow,
}

/// Spread between the lowest and highest common elevation band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerrainType {
    VeryFlat,
    Flat,
    Hilly,
    Mountainous,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub resolution: Resolution,
    pub shape: Shape,
    #[serde(rename = "terrain-type")]
    pub terrain_type: TerrainType,
}

/// Number of elevation bands the 255 land levels are folded into.
const BANDS: usize = 16;

/// Classifies a decoded heightmap.
pub fn classify(heightmap: &Heightmap) -> Classification {
    Classification {
        resolution: resolution(heightmap.pixel_count()),
        shape: shape(heightmap.width, heightmap.height),
        terrain_type: terrain_type(heightmap),
    }
}

fn resolution(surface: u64) -> Resolution {
    if surface < 256 * 256 {
        Resolution::Low
    } else if surface < 1024 * 1024 {
        Resolution::Normal
    } else {
        Resolution::High
    }
}

fn shape(width: u32, height: u32) -> Shape {
    let (long, short) = (width.max(height), width.min(height));
    if short == 0 {
        return Shape::Square;
    }
    let aspect_ratio = long as f64 / short as f64;
    if aspect_ratio < 1.2 {
        Shape::Square
    } else if aspect_ratio < 2.5 {
        Shape::Rectangle
    } else {
        Shape::Narrow
    }
}

fn terrain_type(heightmap: &Heightmap) -> TerrainType {
    let histogram = &heightmap.histogram;
    let land = heightmap
        .pixel_count()
        .saturating_sub(histogram.get(0) as u64);
    if land == 0 {
        return TerrainType::VeryFlat;
    }

    // sea level (0) does not count towards any band
    let mut bands = [0u64; BANDS];
    for (level, count) in histogram.iter().enumerate().skip(1) {
        bands[level / BANDS] += count as u64;
    }

    // a band is common once it covers at least 1% of the land
    let mut common = bands
        .iter()
        .enumerate()
        .filter(|(_, count)| **count * 100 >= land)
        .map(|(band, _)| band);
    let Some(lowest) = common.next() else {
        return TerrainType::VeryFlat;
    };
    let highest = common.last().unwrap_or(lowest);

    match highest - lowest {
        diff if diff > 9 => TerrainType::Mountainous,
        diff if diff > 4 => TerrainType::Hilly,
        diff if diff > 1 => TerrainType::Flat,
        _ => TerrainType::VeryFlat,
    }
}
