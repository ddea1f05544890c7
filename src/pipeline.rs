// THEORY:
// The `pipeline` module is the top-level API of the scanner. It strings the stages
// together in a strictly forward flow and hands the caller nine colors in grid order:
//
//   frame ─▶ GridManager (9 raw samples)
//         ─▶ white balance (9 normalized samples + scale)
//         ─▶ white detector (9-cell mask)
//         ─▶ classifier (non-white cells)
//         ─▶ Pattern
//
// Key architectural principles:
// 1.  **Pure**: Scanning holds no state between frames and uses no clock or RNG. The
//     same frame and geometry always give the same pattern.
// 2.  **Infallible core**: Nothing past `PixelBuffer` construction can fail.
//     Off-frame samples, degenerate radii and black frames all degrade to defined
//     fallbacks, and every cell is always assigned one of the six colors.
// 3.  **Two entry points**: `classify_pattern` takes explicit cell centers and radius
//     with default tuning. `CubeScanner` derives the geometry from the frame size,
//     applies its own `ScannerConfig`, and returns a full `ScanReport` for diagnostics.

use crate::core_modules::canonical::CanonicalColor;
use crate::core_modules::classifier::ColorClassifier;
use crate::core_modules::grid_manager::{CELL_COUNT, GridConfig, GridGeometry, GridManager};
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::sampler::{CellCenter, SamplerConfig};
use crate::core_modules::smart_pixel::smart_pixel::ScoreWeights;
use crate::core_modules::white_balance;
use crate::core_modules::white_detector::{WhiteDetectorConfig, find_white_cells};
use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

pub use crate::pattern::{DetectedPattern, Pattern};

/// Configuration for the scanner, allowing for tunable behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub sampler: SamplerConfig,
    pub grid: GridConfig,
    pub white: WhiteDetectorConfig,
    pub weights: ScoreWeights,
}

impl ScannerConfig {
    /// Reads a JSON config. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json_str(&text)?)
    }
}

/// Everything the scanner learned about one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCellSample {
    /// Row-major position, 0..=8.
    pub index: usize,
    /// Sampler output before white balance.
    pub raw: Pixel,
    /// The color after white balance; this is what was classified.
    pub normalized: Pixel,
    pub is_white: bool,
    pub color: CanonicalColor,
}

/// The detailed result of scanning one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub cells: [GridCellSample; CELL_COUNT],
    /// The global white-balance factor that was applied.
    pub white_balance_scale: f64,
}

impl ScanReport {
    pub fn pattern(&self) -> DetectedPattern {
        Pattern(self.cells.each_ref().map(|cell| cell.color))
    }
}

/// The main, top-level struct for the color scanner.
#[derive(Debug, Clone)]
pub struct CubeScanner {
    config: ScannerConfig,
    classifier: ColorClassifier,
}

impl Default for CubeScanner {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl CubeScanner {
    pub fn new(config: ScannerConfig) -> Self {
        let classifier = ColorClassifier::new(config.weights.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// The cell centers and radius this scanner uses for a frame of the given size.
    pub fn geometry_for(&self, width: u32, height: u32) -> GridGeometry {
        GridGeometry::for_frame(width, height, &self.config.grid)
    }

    /// Scans a frame using the centered guide-square geometry.
    pub fn scan(&self, buffer: &PixelBuffer) -> ScanReport {
        let geometry = self.geometry_for(buffer.width(), buffer.height());
        self.scan_with_geometry(buffer, &geometry.centers, geometry.radius)
    }

    /// Scans a frame at caller-supplied cell centers.
    pub fn scan_with_geometry(
        &self,
        buffer: &PixelBuffer,
        centers: &[CellCenter; CELL_COUNT],
        radius: f64,
    ) -> ScanReport {
        // Stage 1: Sampling
        let raw = GridManager::new(*centers, radius, &self.config.sampler).sample_frame(buffer);

        // Stage 2: White balance
        let (normalized, white_balance_scale) = white_balance::normalize(&raw);
        debug!(scale = white_balance_scale, "white balance applied");

        // Stage 3: White detection
        let white_mask = find_white_cells(&normalized, &self.config.white);
        debug!(?white_mask, "white cells");

        // Stage 4: Classification
        let cells = std::array::from_fn(|index| {
            let is_white = white_mask[index];
            let color = if is_white {
                CanonicalColor::White
            } else {
                self.classifier.classify(normalized[index])
            };
            trace!(
                index,
                raw = %raw[index].to_hex(),
                normalized = %normalized[index].to_hex(),
                %color,
                "cell classified"
            );
            GridCellSample {
                index,
                raw: raw[index],
                normalized: normalized[index],
                is_white,
                color,
            }
        });

        ScanReport { cells, white_balance_scale }
    }

    pub fn classify(&self, buffer: &PixelBuffer) -> DetectedPattern {
        self.scan(buffer).pattern()
    }
}

/// Classifies the nine cells at `cell_centers` with default tuning.
///
/// Always returns nine colors in the order of `cell_centers`.
pub fn classify_pattern(
    buffer: &PixelBuffer,
    cell_centers: &[CellCenter; CELL_COUNT],
    sample_radius: f64,
) -> DetectedPattern {
    CubeScanner::default()
        .scan_with_geometry(buffer, cell_centers, sample_radius)
        .pattern()
}

/// Builds a frame from raw RGBA bytes and classifies it with the centered geometry.
pub fn classify_rgba_frame(
    width: u32,
    height: u32,
    data: Vec<u8>,
) -> Result<DetectedPattern, ScanError> {
    let buffer = PixelBuffer::from_rgba(width, height, data)?;
    Ok(CubeScanner::default().classify(&buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::canonical::CanonicalColor::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const WIDTH: u32 = 300;
    const HEIGHT: u32 = 300;
    const CELL: u32 = 100;

    /// A 300x300 frame of nine 100px cells, one color each, with cell centers and radius.
    fn grid_frame(colors: [Pixel; CELL_COUNT]) -> (PixelBuffer, [CellCenter; CELL_COUNT], f64) {
        grid_frame_with(colors, |_, _, pixel| pixel)
    }

    fn grid_frame_with(
        colors: [Pixel; CELL_COUNT],
        mut paint: impl FnMut(u32, u32, Pixel) -> Pixel,
    ) -> (PixelBuffer, [CellCenter; CELL_COUNT], f64) {
        let mut data = Vec::with_capacity((WIDTH * HEIGHT * 3) as usize);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let cell = (y / CELL * 3 + x / CELL) as usize;
                let pixel = paint(x, y, colors[cell]);
                data.extend_from_slice(&[pixel.red, pixel.green, pixel.blue]);
            }
        }
        let buffer = PixelBuffer::from_rgb(WIDTH, HEIGHT, data).unwrap();
        let centers = std::array::from_fn(|i| {
            CellCenter::new((CELL / 2 + CELL * (i as u32 % 3)) as i64, (CELL / 2 + CELL * (i as u32 / 3)) as i64)
        });
        (buffer, centers, 30.0)
    }

    fn rgb_of(pattern: [CanonicalColor; CELL_COUNT]) -> [Pixel; CELL_COUNT] {
        pattern.map(CanonicalColor::rgb)
    }

    const MIXED: [CanonicalColor; CELL_COUNT] =
        [Red, Blue, Green, Yellow, White, Orange, Green, White, Red];

    #[test]
    fn uniform_red_frame_is_all_red() {
        let (buffer, centers, radius) = grid_frame([Pixel::new(255, 0, 0); CELL_COUNT]);
        assert_eq!(classify_pattern(&buffer, &centers, radius), Pattern([Red; CELL_COUNT]));
    }

    #[test]
    fn uniform_blue_and_green_frames() {
        for color in [Blue, Green] {
            let (buffer, centers, radius) = grid_frame([color.rgb(); CELL_COUNT]);
            assert_eq!(classify_pattern(&buffer, &centers, radius), Pattern([color; CELL_COUNT]));
        }
    }

    #[test]
    fn uniform_orange_frame_saturates_to_yellow() {
        // 765 / 395 lifts the green channel 140 -> 271, clamped to 255.
        let (buffer, centers, radius) = grid_frame([Orange.rgb(); CELL_COUNT]);
        let report = CubeScanner::default().scan_with_geometry(&buffer, &centers, radius);
        assert!((report.white_balance_scale - 765.0 / 395.0).abs() < 1e-12);
        assert!(report.cells.iter().all(|cell| cell.normalized == Pixel::new(255, 255, 0)));
        assert_eq!(
            classify_pattern(&buffer, &centers, radius).hex_codes(),
            ["#ffff00"; CELL_COUNT]
        );
    }

    #[test]
    fn uniform_white_frame_is_all_white() {
        let (buffer, centers, radius) = grid_frame([Pixel::new(255, 255, 255); CELL_COUNT]);
        assert_eq!(
            classify_pattern(&buffer, &centers, radius).hex_codes(),
            ["#ffffff"; CELL_COUNT]
        );
    }

    #[test]
    fn mixed_canonical_pattern_round_trips() {
        let (buffer, centers, radius) = grid_frame(rgb_of(MIXED));
        assert_eq!(classify_pattern(&buffer, &centers, radius), Pattern(MIXED));
    }

    #[test]
    fn every_color_round_trips_beside_a_white_face() {
        for color in CanonicalColor::ALL {
            let mut cells = [color; CELL_COUNT];
            cells[4] = White;
            let (buffer, centers, radius) = grid_frame(rgb_of(cells));
            assert_eq!(classify_pattern(&buffer, &centers, radius), Pattern(cells), "{}", color.name());
        }
    }

    #[test]
    fn noise_does_not_change_classification() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let (buffer, centers, radius) = grid_frame_with(rgb_of(MIXED), |_, _, pixel| {
            let mut jitter = |channel: u8| (channel as i16 + rng.gen_range(-15..=15)).clamp(0, 255) as u8;
            Pixel::new(jitter(pixel.red), jitter(pixel.green), jitter(pixel.blue))
        });
        assert_eq!(classify_pattern(&buffer, &centers, radius), Pattern(MIXED));
    }

    #[test]
    fn black_gutters_are_rejected() {
        // Black bands along each cell's left edge: 5% of every cell.
        let (buffer, centers, radius) = grid_frame_with(rgb_of(MIXED), |x, _, pixel| {
            if x % CELL < 5 { Pixel::new(0, 0, 0) } else { pixel }
        });
        // The bands sit outside the sampling disk, so also put a black streak through
        // the middle of each disk covering roughly 5% of it.
        let (streaked, _, _) = grid_frame_with(rgb_of(MIXED), |x, y, pixel| {
            let (cx, cy) = (x % CELL, y % CELL);
            if (49..=51).contains(&cx) && cy.abs_diff(50) <= 30 { Pixel::new(0, 0, 0) } else { pixel }
        });
        assert_eq!(classify_pattern(&buffer, &centers, radius), Pattern(MIXED));
        assert_eq!(classify_pattern(&streaked, &centers, radius), Pattern(MIXED));
    }

    #[test]
    fn exposure_changes_are_normalized_away() {
        for factor in [0.45, 0.7, 0.9] {
            let dimmed = rgb_of(MIXED).map(|pixel| pixel.scaled(factor));
            let (buffer, centers, radius) = grid_frame(dimmed);
            assert_eq!(classify_pattern(&buffer, &centers, radius), Pattern(MIXED), "factor {factor}");
        }
    }

    #[test]
    fn report_exposes_every_stage() {
        let dimmed = rgb_of(MIXED).map(|pixel| pixel.scaled(0.5));
        let (buffer, centers, radius) = grid_frame(dimmed);
        let report = CubeScanner::default().scan_with_geometry(&buffer, &centers, radius);

        assert!((report.white_balance_scale - 765.0 / 384.0).abs() < 1e-9);
        for (index, cell) in report.cells.iter().enumerate() {
            assert_eq!(cell.index, index);
            assert_eq!(cell.is_white, MIXED[index] == White);
            assert_eq!(cell.color, MIXED[index]);
        }
        assert_eq!(report.cells[4].raw, Pixel::new(128, 128, 128));
        assert_eq!(report.cells[4].normalized, Pixel::new(255, 255, 255));
    }

    #[test]
    fn scanner_uses_centered_guide_square() {
        // 750x750 frame: guide square 300px at offset 225, cells 100px.
        let mut data = Vec::with_capacity(750 * 750 * 4);
        for y in 0..750u32 {
            for x in 0..750u32 {
                let pixel = if (225..525).contains(&x) && (225..525).contains(&y) {
                    MIXED[(((y - 225) / 100) * 3 + (x - 225) / 100) as usize].rgb()
                } else {
                    Pixel::new(20, 20, 20)
                };
                data.extend_from_slice(&[pixel.red, pixel.green, pixel.blue, 255]);
            }
        }
        assert_eq!(classify_rgba_frame(750, 750, data).unwrap(), Pattern(MIXED));
    }

    #[test]
    fn rgba_frame_with_wrong_length_is_rejected() {
        assert!(matches!(
            classify_rgba_frame(10, 10, vec![0; 399]),
            Err(ScanError::BufferSize { .. })
        ));
    }

    #[test]
    fn off_frame_geometry_degrades_to_gray_and_still_classifies() {
        let (buffer, _, _) = grid_frame(rgb_of(MIXED));
        let centers = [CellCenter::new(-1000, -1000); CELL_COUNT];
        let report = CubeScanner::default().scan_with_geometry(&buffer, &centers, 30.0);
        assert!(report.cells.iter().all(|cell| cell.raw == Pixel::NEUTRAL_GRAY));
        assert!(report.pattern().colors().iter().all(|c| CanonicalColor::ALL.contains(c)));
    }

    #[test]
    fn huge_radius_pools_the_whole_frame() {
        let (buffer, centers, _) = grid_frame([Pixel::new(255, 0, 0); CELL_COUNT]);
        assert_eq!(classify_pattern(&buffer, &centers, 1e12), Pattern([Red; CELL_COUNT]));
    }

    #[test]
    fn config_loads_partial_json() {
        let config = ScannerConfig::from_json_str(r#"{ "white": { "saturation_ceiling": 35.0 } }"#).unwrap();
        assert_eq!(config.white.saturation_ceiling, 35.0);
        assert_eq!(config.white.saturation_margin, 20.0);
        assert_eq!(config.sampler, SamplerConfig::default());
        assert_eq!(config.weights, ScoreWeights::default());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn output_is_deterministic_and_in_vocabulary(
            bytes in proptest::collection::vec(any::<u8>(), (24 * 24 * 3) as usize),
            radius in 0.0f64..6.0,
            raw_centers in proptest::array::uniform9((-4i64..28, -4i64..28)),
        ) {
            let buffer = PixelBuffer::from_rgb(24, 24, bytes).unwrap();
            let centers = raw_centers.map(CellCenter::from);
            let first = classify_pattern(&buffer, &centers, radius);
            let second = classify_pattern(&buffer, &centers, radius);
            prop_assert_eq!(first, second);
            for code in first.hex_codes() {
                prop_assert!(CanonicalColor::ALL.iter().any(|c| c.hex() == code));
            }
        }

        #[test]
        fn cell_order_follows_center_order(permutation in Just((0..CELL_COUNT).collect::<Vec<_>>()).prop_shuffle()) {
            let (buffer, centers, radius) = grid_frame(rgb_of(MIXED));
            let shuffled: [CellCenter; CELL_COUNT] = std::array::from_fn(|i| centers[permutation[i]]);
            let expected: [CanonicalColor; CELL_COUNT] = std::array::from_fn(|i| MIXED[permutation[i]]);
            prop_assert_eq!(classify_pattern(&buffer, &shuffled, radius), Pattern(expected));
        }
    }
}
