//! Fixed-point RGB to grayscale conversion.
//!
//! The weights are the ITU-R BT.601 luma coefficients scaled by 65536
//! (0.299, 0.587, 0.114), truncated the same way the OpenTTD heightmap
//! loader does it, so histograms line up with what the game sees.

const WEIGHT_RED: u32 = 19595;
const WEIGHT_GREEN: u32 = 38470;
const WEIGHT_BLUE: u32 = 7471;

/// Converts an 8-bit RGB triple to an 8-bit gray level.
///
/// The three weights sum to 65536, so white maps to 255 and the result
/// always fits in a `u8`.
#[inline]
pub fn rgb_to_gray(red: u8, green: u8, blue: u8) -> u8 {
    ((red as u32 * WEIGHT_RED + green as u32 * WEIGHT_GREEN + blue as u32 * WEIGHT_BLUE) >> 16)
        as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_unity() {
        assert_eq!(WEIGHT_RED + WEIGHT_GREEN + WEIGHT_BLUE, 1 << 16);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(rgb_to_gray(0, 0, 0), 0);
        assert_eq!(rgb_to_gray(255, 255, 255), 255);
    }

    #[test]
    fn test_primaries() {
        assert_eq!(rgb_to_gray(255, 0, 0), 76);
        assert_eq!(rgb_to_gray(0, 255, 0), 149);
        assert_eq!(rgb_to_gray(0, 0, 255), 29);
    }

    #[test]
    fn test_gray_is_identity() {
        for v in 0..=255u8 {
            assert_eq!(rgb_to_gray(v, v, v), v, "gray {v} must map to itself");
        }
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        // (1, 1, 0) is 0.886 before truncation
        assert_eq!(rgb_to_gray(1, 1, 0), 0);
        // 140.75
        assert_eq!(rgb_to_gray(100, 150, 200), 140);
    }
}
