// THEORY:
// The sampler turns a neighborhood of raw camera pixels into one representative color
// per grid cell. It is the scanner's spatial pooling step: averaging many pixels
// cancels sensor noise, and summarizing nine cells instead of millions of pixels keeps
// the rest of the pipeline trivial.
//
// Key architectural principles:
// 1.  **Radial, not rectangular**: The candidate set is a filled disk of integer
//     offsets (dx² + dy² <= r²). Sticker faces are roughly square but their corners are
//     where bevels and neighboring stickers creep in, so the disk avoids them.
// 2.  **Gaussian falloff**: Each offset carries a weight exp(-d² / 2σ²) with
//     σ = r · sigma_ratio. Points near the center dominate the average; edge points,
//     which are more likely to straddle a grid line, contribute less.
// 3.  **Shadow trimming**: Kept samples are sorted by brightness and the darkest
//     `trim_fraction` (floor of count × fraction) are discarded before aggregating.
//     Gutters and cube bevels are always darker than the sticker, so this is a
//     one-sided trim.
// 4.  **Never fails**: Offsets falling outside the frame are skipped silently. If
//     nothing survives (cell entirely off-frame, radius <= 0) the result is a fixed
//     neutral gray.
//
// The disk depends only on the radius, so it is built once per frame and reused for
// all nine cells. Its points are enumerated per cell inside the window where the disk
// overlaps the frame, so an absurd radius costs at most one pass over the frame.

use crate::core_modules::pixel::pixel::{Brightness, Pixel};
use crate::core_modules::pixel_buffer::PixelBuffer;
use serde::{Deserialize, Serialize};

/// Tunables for the frame sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Fraction of the darkest samples discarded before averaging.
    pub trim_fraction: f64,
    /// Gaussian σ as a fraction of the sampling radius.
    pub sigma_ratio: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            trim_fraction: 0.2,
            sigma_ratio: 0.5,
        }
    }
}

/// The pixel coordinate at the center of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCenter {
    pub x: i64,
    pub y: i64,
}

impl CellCenter {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for CellCenter {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
struct WeightedSample {
    pixel: Pixel,
    weight: f64,
    brightness: Brightness,
}

/// A weighted sampling disk for one radius.
#[derive(Debug, Clone, Copy)]
pub struct SampleDisk {
    radius: f64,
    sigma: f64,
}

impl SampleDisk {
    /// Builds the disk for `radius`. A non-positive or non-finite radius gives an
    /// empty disk, which always samples to the neutral gray fallback.
    pub fn new(radius: f64, sigma_ratio: f64) -> Self {
        let radius = if radius.is_finite() && radius > 0.0 { radius } else { 0.0 };
        Self {
            radius,
            sigma: radius * sigma_ratio,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0
    }

    fn weight(&self, distance_squared: f64) -> f64 {
        // A non-positive sigma disables the falloff.
        if self.sigma > 0.0 {
            (-distance_squared / (2.0 * self.sigma * self.sigma)).exp()
        } else {
            1.0
        }
    }

    /// In-frame points of the disk around `center` as `(x, y, weight)`.
    ///
    /// Only the window where the disk's bounding square overlaps a `width` × `height`
    /// frame is visited, so the cost is bounded by the frame size for any radius.
    fn points_within(
        &self,
        width: u32,
        height: u32,
        center: CellCenter,
    ) -> impl Iterator<Item = (i64, i64, f64)> {
        let disk = *self;
        let reach = disk.radius.floor();
        let radius_squared = disk.radius * disk.radius;
        let (cx, cy) = (center.x as f64, center.y as f64);

        // Float bounds saturate on the cast back, so extreme centers cannot overflow.
        let clip = |c: f64, extent: u32| {
            if disk.is_empty() || extent == 0 {
                return None;
            }
            let low = (c - reach).max(0.0);
            let high = (c + reach).min(extent as f64 - 1.0);
            (low <= high).then(|| (low.ceil() as i64, high.floor() as i64))
        };
        let (x_low, x_high) = clip(cx, width).unwrap_or((1, 0));
        let (y_low, y_high) = clip(cy, height).unwrap_or((1, 0));

        (y_low..=y_high).flat_map(move |y| {
            (x_low..=x_high).filter_map(move |x| {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let distance_squared = dx * dx + dy * dy;
                (distance_squared <= radius_squared).then(|| (x, y, disk.weight(distance_squared)))
            })
        })
    }

    /// Summarizes the neighborhood around `center` as one weighted, shadow-trimmed color.
    pub fn sample(&self, buffer: &PixelBuffer, center: CellCenter, trim_fraction: f64) -> Pixel {
        // --- 1. Collect in-bounds samples ---
        let mut samples: Vec<WeightedSample> = self
            .points_within(buffer.width(), buffer.height(), center)
            .filter_map(|(x, y, weight)| {
                buffer.pixel_at(x, y).map(|pixel| WeightedSample {
                    pixel,
                    weight,
                    brightness: pixel.brightness(),
                })
            })
            .collect();

        // --- 2. Drop the darkest fraction ---
        samples.sort_by(|a, b| a.brightness.total_cmp(&b.brightness));
        let trim_count = (samples.len() as f64 * trim_fraction.clamp(0.0, 1.0)).floor() as usize;
        let trimmed = trim_count.min(samples.len());
        let kept = &samples[trimmed..];

        // --- 3. Weighted mean ---
        let mut red = 0.0;
        let mut green = 0.0;
        let mut blue = 0.0;
        let mut total_weight = 0.0;
        for sample in kept {
            red += sample.pixel.red as f64 * sample.weight;
            green += sample.pixel.green as f64 * sample.weight;
            blue += sample.pixel.blue as f64 * sample.weight;
            total_weight += sample.weight;
        }

        if total_weight <= 0.0 {
            return Pixel::NEUTRAL_GRAY;
        }

        let channel = |sum: f64| (sum / total_weight).round().clamp(0.0, 255.0) as u8;
        Pixel::new(channel(red), channel(green), channel(blue))
    }
}

/// Samples a single cell. Prefer building one `SampleDisk` when sampling many cells.
pub fn sample_cell(
    buffer: &PixelBuffer,
    center: CellCenter,
    radius: f64,
    config: &SamplerConfig,
) -> Pixel {
    SampleDisk::new(radius, config.sigma_ratio).sample(buffer, center, config.trim_fraction)
}
