// THEORY:
// The `SmartPixel` module provides the comparative half of color analysis. It wraps a
// "dumb" `Pixel` and answers one question: how similar is this color to another one?
//
// Key architectural principles:
// 1.  **Comparative Analysis**: A `SmartPixel` is meaningless on its own; its value is
//     in `similarity`, which always takes a second color (in practice a game
//     reference color).
// 2.  **Two lenses at once**: RGB distance alone confuses colors that differ mostly in
//     brightness, and hue alone is unstable near gray. The score blends both:
//     - rgb:        441 - euclidean distance (441 ≈ black-to-white distance)
//     - hue:        180 - circular hue difference
//     - saturation: 100 - |Δs|
//     - value:      100 - |Δv|
//     Each term is floored at 0 so it measures closeness, and the weighted sum is
//     higher for better matches.
// 3.  **Optimization**: HSV is computed once in the constructor. The classifier builds
//     its five reference `SmartPixel`s once and compares every detected cell against
//     them.

pub mod smart_pixel {
    use crate::core_modules::pixel::pixel::{Hsv, Pixel};
    use serde::{Deserialize, Serialize};

    pub type Score = f64;

    const RGB_SPAN: f64 = 441.0;
    const HUE_SPAN: f64 = 180.0;
    const PERCENT_SPAN: f64 = 100.0;

    /// Relative weight of each similarity term.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ScoreWeights {
        pub hue: f64,
        pub rgb: f64,
        pub saturation: f64,
        pub value: f64,
    }

    impl Default for ScoreWeights {
        fn default() -> Self {
            Self {
                hue: 0.4,
                rgb: 0.3,
                saturation: 0.2,
                value: 0.1,
            }
        }
    }

    /// Circular distance between two hues in degrees, in [0, 180].
    pub fn hue_difference(a: f64, b: f64) -> f64 {
        let difference = (a - b).abs();
        if difference > 180.0 { 360.0 - difference } else { difference }
    }

    /// A color wrapped with its cached HSV for repeated comparisons.
    #[derive(Debug, Clone, Copy)]
    pub struct SmartPixel {
        /// The raw color being analyzed.
        pub pixel: Pixel,
        /// HSV of `pixel`, cached.
        hsv: Hsv,
    }

    impl SmartPixel {
        pub fn new(pixel: Pixel) -> Self {
            Self { hsv: pixel.hsv(), pixel }
        }

        pub fn hsv(&self) -> &Hsv {
            &self.hsv
        }

        /// Composite closeness score; higher is more similar.
        pub fn similarity(&self, other: &SmartPixel, weights: &ScoreWeights) -> Score {
            let rgb_score = (RGB_SPAN - self.pixel.rgb_distance(&other.pixel)).max(0.0);
            let hue_score = (HUE_SPAN - hue_difference(self.hsv.hue, other.hsv.hue)).max(0.0);
            let saturation_difference = (self.hsv.saturation - other.hsv.saturation).abs();
            let saturation_score = (PERCENT_SPAN - saturation_difference).max(0.0);
            let value_score = (PERCENT_SPAN - (self.hsv.value - other.hsv.value).abs()).max(0.0);

            weights.hue * hue_score
                + weights.rgb * rgb_score
                + weights.saturation * saturation_score
                + weights.value * value_score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::smart_pixel::*;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn hue_difference_wraps_at_360() {
        assert_eq!(hue_difference(10.0, 350.0), 20.0);
        assert_eq!(hue_difference(350.0, 10.0), 20.0);
        assert_eq!(hue_difference(0.0, 180.0), 180.0);
        assert_eq!(hue_difference(90.0, 30.0), 60.0);
    }

    #[test]
    fn identical_colors_score_the_maximum() {
        let weights = ScoreWeights::default();
        let red = SmartPixel::new(Pixel::new(255, 0, 0));
        // 0.4·180 + 0.3·441 + 0.2·100 + 0.1·100
        let expected = 72.0 + 132.3 + 20.0 + 10.0;
        assert!((red.similarity(&red, &weights) - expected).abs() < 1e-9);
    }

    #[test]
    fn closer_colors_score_higher() {
        let weights = ScoreWeights::default();
        let reference = SmartPixel::new(Pixel::new(0, 0, 255));
        let near = SmartPixel::new(Pixel::new(20, 30, 230));
        let far = SmartPixel::new(Pixel::new(230, 30, 20));
        assert!(near.similarity(&reference, &weights) > far.similarity(&reference, &weights));
    }

    #[test]
    fn terms_never_go_negative() {
        let weights = ScoreWeights { hue: 0.0, rgb: 1.0, saturation: 0.0, value: 0.0 };
        let black = SmartPixel::new(Pixel::new(0, 0, 0));
        let white = SmartPixel::new(Pixel::new(255, 255, 255));
        // Distance 441.67 > 441, floored at 0.
        assert_eq!(black.similarity(&white, &weights), 0.0);
    }
}
