// THEORY:
// The six game colors are a closed set, so they are an enum. Each variant carries its
// reference RGB and hex code, and the five chromatic ones carry their hue gate as
// plain data. The classifier reads the table; it never special-cases a color by name.
//
// Hue gates encode which part of the hue wheel a color may plausibly come from:
// - Red, Orange and Yellow sit next to each other and drift into one another under
//   warm light, so their gates are hard (-100) and include a saturation floor.
// - Green and Blue are far apart on the wheel and only need a soft nudge (-50).

use crate::core_modules::pixel::pixel::{Hsv, Pixel};
use crate::error::ScanError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The hue interval a gate accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HueBand {
    /// Accepts `hue < below || hue > above`. Used for red, which straddles 0°.
    Wrapping { below: f64, above: f64 },
    /// Accepts `low <= hue <= high`.
    Inclusive { low: f64, high: f64 },
}

impl HueBand {
    pub fn contains(&self, hue: f64) -> bool {
        match *self {
            HueBand::Wrapping { below, above } => hue < below || hue > above,
            HueBand::Inclusive { low, high } => hue >= low && hue <= high,
        }
    }
}

/// A penalty applied to a candidate when the detected color falls outside its band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueGate {
    pub band: HueBand,
    /// Saturation must be strictly greater than this, when set.
    pub min_saturation: Option<f64>,
    pub penalty: f64,
}

impl HueGate {
    pub fn admits(&self, hsv: &Hsv) -> bool {
        self.band.contains(hsv.hue)
            && self.min_saturation.is_none_or(|floor| hsv.saturation > floor)
    }

    /// 0 when the gate admits the color, otherwise the (positive) penalty to subtract.
    pub fn penalty_for(&self, hsv: &Hsv) -> f64 {
        if self.admits(hsv) { 0.0 } else { self.penalty }
    }
}

/// One of the six fixed game colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalColor {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    White,
}

impl CanonicalColor {
    /// All six colors, in the game's palette order.
    pub const ALL: [CanonicalColor; 6] = [
        CanonicalColor::Red,
        CanonicalColor::Blue,
        CanonicalColor::Green,
        CanonicalColor::Yellow,
        CanonicalColor::Orange,
        CanonicalColor::White,
    ];

    /// The classifier's candidates. Order is the tie-break order.
    pub const CHROMATIC: [CanonicalColor; 5] = [
        CanonicalColor::Red,
        CanonicalColor::Blue,
        CanonicalColor::Green,
        CanonicalColor::Yellow,
        CanonicalColor::Orange,
    ];

    pub const fn rgb(self) -> Pixel {
        match self {
            CanonicalColor::Red => Pixel::new(255, 0, 0),
            CanonicalColor::Blue => Pixel::new(0, 0, 255),
            CanonicalColor::Green => Pixel::new(0, 255, 0),
            CanonicalColor::Yellow => Pixel::new(255, 255, 0),
            CanonicalColor::Orange => Pixel::new(255, 140, 0),
            CanonicalColor::White => Pixel::new(255, 255, 255),
        }
    }

    pub const fn hex(self) -> &'static str {
        match self {
            CanonicalColor::Red => "#ff0000",
            CanonicalColor::Blue => "#0000ff",
            CanonicalColor::Green => "#00ff00",
            CanonicalColor::Yellow => "#ffff00",
            CanonicalColor::Orange => "#ff8c00",
            CanonicalColor::White => "#ffffff",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CanonicalColor::Red => "Red",
            CanonicalColor::Blue => "Blue",
            CanonicalColor::Green => "Green",
            CanonicalColor::Yellow => "Yellow",
            CanonicalColor::Orange => "Orange",
            CanonicalColor::White => "White",
        }
    }

    /// The hue gate for chromatic colors; white has none.
    pub const fn hue_gate(self) -> Option<HueGate> {
        match self {
            CanonicalColor::Red => Some(HueGate {
                band: HueBand::Wrapping { below: 20.0, above: 340.0 },
                min_saturation: Some(25.0),
                penalty: 100.0,
            }),
            CanonicalColor::Orange => Some(HueGate {
                band: HueBand::Inclusive { low: 20.0, high: 35.0 },
                min_saturation: Some(25.0),
                penalty: 100.0,
            }),
            CanonicalColor::Yellow => Some(HueGate {
                band: HueBand::Inclusive { low: 36.0, high: 70.0 },
                min_saturation: Some(15.0),
                penalty: 100.0,
            }),
            CanonicalColor::Green => Some(HueGate {
                band: HueBand::Inclusive { low: 80.0, high: 170.0 },
                min_saturation: None,
                penalty: 50.0,
            }),
            CanonicalColor::Blue => Some(HueGate {
                band: HueBand::Inclusive { low: 180.0, high: 260.0 },
                min_saturation: None,
                penalty: 50.0,
            }),
            CanonicalColor::White => None,
        }
    }

    /// Parses `#rrggbb` or `rrggbb`, case-insensitively. Only the six game codes are accepted.
    pub fn from_hex(code: &str) -> Result<Self, ScanError> {
        let digits = code.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ScanError::InvalidColor(code.to_string()));
        }
        let normalized = format!("#{}", digits.to_ascii_lowercase());
        Self::ALL
            .into_iter()
            .find(|color| color.hex() == normalized)
            .ok_or_else(|| ScanError::InvalidColor(code.to_string()))
    }
}

impl fmt::Display for CanonicalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

impl FromStr for CanonicalColor {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for CanonicalColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

impl<'de> Deserialize<'de> for CanonicalColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_hex(&code).map_err(serde::de::Error::custom)
    }
}
