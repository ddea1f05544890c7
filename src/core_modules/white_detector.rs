// THEORY:
// Deciding "is this cell white?" with fixed thresholds breaks as soon as the light
// source has a tint: a white sticker under a warm bulb reads as pale orange, and a
// fixed saturation cutoff either misses it or swallows real yellows. The detector
// instead anchors on the frame itself.
//
// Algorithm:
// 1.  For each normalized sample compute HSV saturation and the max channel
//     difference max(|r-g|, |r-b|, |g-b|).
// 2.  Take the minimum of each across the frame. The least saturated cell is the
//     frame's best guess at neutral, whatever the color cast.
// 3.  A cell is white when both its saturation and its channel difference are within a
//     margin (default 20) of those minimums, and its saturation is at most an absolute
//     ceiling (default 50).
//
// The ceiling keeps a frame with no neutral cell at all (e.g. every sticker red) from
// being reported as all white; without it the minimums would simply anchor on the
// red. Frames whose stickers are all low-saturation are still a known weak spot of
// this heuristic and are not special-cased.

use crate::core_modules::pixel::pixel::Pixel;
use serde::{Deserialize, Serialize};

/// Tunables for adaptive white detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteDetectorConfig {
    /// Allowed saturation above the frame minimum (percentage points).
    pub saturation_margin: f64,
    /// Allowed max-channel-difference above the frame minimum.
    pub difference_margin: f64,
    /// Absolute saturation above which a cell is never white.
    ///
    /// This is the one fixed threshold in the detector. The margins alone anchor on
    /// the least saturated cell, so a face with no white sticker (e.g. all red) would
    /// be reported as all white; the ceiling keeps such a face in its own color.
    /// Lowering it protects saturated faces further but starts rejecting whites under
    /// a strong color cast. Raising it toward 100 restores pure relative detection.
    pub saturation_ceiling: f64,
}

impl Default for WhiteDetectorConfig {
    fn default() -> Self {
        Self {
            saturation_margin: 20.0,
            difference_margin: 20.0,
            saturation_ceiling: 50.0,
        }
    }
}

/// Marks which samples are white, relative to the least saturated sample of the frame.
pub fn find_white_cells<const N: usize>(
    samples: &[Pixel; N],
    config: &WhiteDetectorConfig,
) -> [bool; N] {
    let saturations = samples.map(|sample| sample.hsv().saturation);
    let differences = samples.map(|sample| sample.max_channel_difference() as f64);

    let min_saturation = saturations.iter().copied().fold(f64::INFINITY, f64::min);
    let min_difference = differences.iter().copied().fold(f64::INFINITY, f64::min);

    std::array::from_fn(|i| {
        saturations[i] <= min_saturation + config.saturation_margin
            && differences[i] <= min_difference + config.difference_margin
            && saturations[i] <= config.saturation_ceiling
    })
}
