// THEORY (1D Color Heuristics):
// The `Pixel` module is the most fundamental unit of the scanner. It is a "dumb"
// data container for a single RGB color plus the handful of 1-dimensional heuristics
// the rest of the pipeline needs: metrics computed from this color alone, with no
// knowledge of neighbors or of the frame it came from. Anything that needs a second
// color (similarity scoring) lives in `SmartPixel`.
//
// Heuristic families (all single-color):
// - Brightness:   mean of R,G,B (used by the sampler to trim shadows) and the raw
//                 channel sum (used by white balance, range 0..765)
// - Neutrality:   max channel difference, max(|r-g|, |r-b|, |g-b|)
// - HSV:          hue in whole degrees [0, 360), saturation and value in [0, 100]
//
// Key principles:
// 1) Single-color scope: heuristics never read neighbors or history.
// 2) Channels stay gamma-encoded 0..255 integers. No linearization is applied; the
//    reference colors of the game are defined in the same encoded space.
// 3) HSV is derived, never stored. It is cheap and recomputed whenever needed.

pub mod pixel {
    use serde::{Deserialize, Serialize};

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Brightness = f64;
    pub type Sum = u32;
    pub type Hue = f64;
    pub type Saturation = f64;
    pub type Value = f64;

    /// An RGB color with integer channels in [0, 255]. No alpha.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    /// A color in HSV space: hue in degrees [0, 360), saturation and value in [0, 100].
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Hsv {
        pub hue: Hue,
        pub saturation: Saturation,
        pub value: Value,
    }

    impl Pixel {
        /// The neutral gray returned when a region yields no usable samples.
        pub const NEUTRAL_GRAY: Pixel = Pixel::new(128, 128, 128);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// =================================Heuristics==================================

        /// Unweighted mean of the three channels (0.0..=255.0).
        pub fn brightness(&self) -> Brightness {
            (self.red as f64 + self.green as f64 + self.blue as f64) / 3.0
        }

        /// Raw channel sum (0..=765).
        pub fn sum(&self) -> Sum {
            self.red as Sum + self.green as Sum + self.blue as Sum
        }

        /// Largest pairwise channel difference. 0 for any perfect gray.
        pub fn max_channel_difference(&self) -> Channel {
            let rg = self.red.abs_diff(self.green);
            let rb = self.red.abs_diff(self.blue);
            let gb = self.green.abs_diff(self.blue);
            rg.max(rb).max(gb)
        }

        /// Euclidean distance in RGB space. Bounded by ~441.67 (black to white).
        pub fn rgb_distance(&self, other: &Pixel) -> f64 {
            let dr = self.red as f64 - other.red as f64;
            let dg = self.green as f64 - other.green as f64;
            let db = self.blue as f64 - other.blue as f64;
            (dr * dr + dg * dg + db * db).sqrt()
        }

        /// Standard six-sector HSV conversion.
        ///
        /// - Value is the max channel; saturation is chroma / max (0 for black).
        /// - Hue is rounded to whole degrees, so the hue gates in the classifier
        ///   compare against integers and their inclusive bounds behave predictably.
        pub fn hsv(&self) -> Hsv {
            let red = self.red as f64 / 255.0;
            let green = self.green as f64 / 255.0;
            let blue = self.blue as f64 / 255.0;

            let maximum_channel = red.max(green.max(blue));
            let minimum_channel = red.min(green.min(blue));
            let chroma = maximum_channel - minimum_channel;

            let sector = if chroma == 0.0 {
                0.0
            } else if maximum_channel == red {
                ((green - blue) / chroma) % 6.0
            } else if maximum_channel == green {
                (blue - red) / chroma + 2.0
            } else {
                (red - green) / chroma + 4.0
            };

            let mut hue = (sector * 60.0).round();
            if hue < 0.0 {
                hue += 360.0;
            }

            let saturation = if maximum_channel == 0.0 {
                0.0
            } else {
                chroma / maximum_channel
            };

            Hsv {
                hue,
                saturation: saturation * 100.0,
                value: maximum_channel * 100.0,
            }
        }

        /// Multiplies every channel by `factor`, rounding and clamping to 255.
        pub fn scaled(&self, factor: f64) -> Pixel {
            let scale =
                |channel: Channel| (channel as f64 * factor).round().clamp(0.0, 255.0) as Channel;
            Pixel::new(scale(self.red), scale(self.green), scale(self.blue))
        }

        /// Lowercase `#rrggbb` form.
        pub fn to_hex(&self) -> String {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }
    }

    impl From<[Byte; 3]> for Pixel {
        fn from(bytes: [Byte; 3]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<Pixel> for [Byte; 3] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue]
        }
    }
}
