// THEORY:
// A white-patch auto white balance over the nine cell samples. Under real lighting the
// white face of a cube is rarely captured as pure white; it comes out gray when
// under-exposed or tinted by the light source. Scaling every sample by a single global
// factor, chosen so the brightest cell's channel sum reaches 765 (255 · 3), pulls the
// whole frame back towards the exposure the reference colors assume.
//
// The factor is global, so the relative balance between cells is preserved. Channels
// that would overflow are clamped at 255. An all-black frame has no reference and is
// left untouched (factor 1).

use crate::core_modules::pixel::pixel::Pixel;

const FULL_WHITE_SUM: f64 = 765.0;

/// The scale factor that maps the brightest sample's channel sum to 765.
pub fn white_balance_scale(samples: &[Pixel]) -> f64 {
    let max_brightness = samples.iter().map(Pixel::sum).max().unwrap_or(0);
    if max_brightness == 0 {
        1.0
    } else {
        FULL_WHITE_SUM / max_brightness as f64
    }
}

/// Rescales all samples against the brightest one. Returns the normalized samples
/// together with the factor that was applied.
pub fn normalize<const N: usize>(samples: &[Pixel; N]) -> ([Pixel; N], f64) {
    let scale = white_balance_scale(samples);
    (samples.map(|sample| sample.scaled(scale)), scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightest_gray_becomes_white() {
        let samples = [Pixel::new(170, 170, 170), Pixel::new(100, 0, 0), Pixel::new(0, 50, 100)];
        let (normalized, scale) = normalize(&samples);
        assert!((scale - 1.5).abs() < 1e-12);
        assert_eq!(normalized[0], Pixel::new(255, 255, 255));
        assert_eq!(normalized[1], Pixel::new(150, 0, 0));
        assert_eq!(normalized[2], Pixel::new(0, 75, 150));
    }

    #[test]
    fn all_black_frame_is_left_alone() {
        let samples = [Pixel::new(0, 0, 0); 9];
        let (normalized, scale) = normalize(&samples);
        assert_eq!(scale, 1.0);
        assert_eq!(normalized, samples);
    }

    #[test]
    fn overflowing_channels_clamp() {
        // Saturated orange: sum 395, scale ~1.94, green 140 -> 271 -> 255.
        let samples = [Pixel::new(255, 140, 0)];
        let (normalized, _) = normalize(&samples);
        assert_eq!(normalized[0], Pixel::new(255, 255, 0));
    }

    #[test]
    fn already_white_frame_is_a_no_op() {
        let samples = [Pixel::new(255, 255, 255), Pixel::new(255, 0, 0), Pixel::new(0, 0, 255)];
        let (normalized, scale) = normalize(&samples);
        assert_eq!(scale, 1.0);
        assert_eq!(normalized, samples);
    }
}
