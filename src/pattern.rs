// THEORY:
// A `Pattern` is the 3×3 arrangement of game colors, row-major. The same type is used
// for the target the game generates and for what the scanner detects, so the two can
// be compared directly.
//
// Matching is positional and deliberately generous: two colors match when every RGB
// channel differs by less than 120. That tolerance is wide enough that Orange and
// Yellow (green channels 140 vs 255) count as the same color, which keeps the game
// forgiving for the pair the camera confuses most.

use crate::core_modules::canonical::CanonicalColor;
use crate::core_modules::grid_manager::CELL_COUNT;
use crate::error::ScanError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-channel difference below which two colors are considered a match.
pub const CHANNEL_TOLERANCE: u8 = 120;

/// Nine game colors in row-major grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern(pub [CanonicalColor; CELL_COUNT]);

/// The scanner's output artifact.
pub type DetectedPattern = Pattern;

/// Whether two colors are within the per-channel tolerance of each other.
pub fn colors_match(a: CanonicalColor, b: CanonicalColor) -> bool {
    let (a, b) = (a.rgb(), b.rgb());
    a.red.abs_diff(b.red) < CHANNEL_TOLERANCE
        && a.green.abs_diff(b.green) < CHANNEL_TOLERANCE
        && a.blue.abs_diff(b.blue) < CHANNEL_TOLERANCE
}

impl Pattern {
    /// A target pattern with each cell drawn uniformly from all six colors.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Pattern(std::array::from_fn(|_| {
            *CanonicalColor::ALL
                .choose(&mut *rng)
                .unwrap_or(&CanonicalColor::White)
        }))
    }

    pub fn colors(&self) -> &[CanonicalColor; CELL_COUNT] {
        &self.0
    }

    /// The hex codes in grid order.
    pub fn hex_codes(&self) -> [&'static str; CELL_COUNT] {
        self.0.map(CanonicalColor::hex)
    }

    /// Positional comparison with per-channel tolerance.
    pub fn matches(&self, other: &Pattern) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| colors_match(*a, *b))
    }

    /// Grid indices whose colors do not match.
    pub fn mismatches(&self, other: &Pattern) -> Vec<usize> {
        self.0
            .iter()
            .zip(other.0.iter())
            .enumerate()
            .filter(|(_, (a, b))| !colors_match(**a, **b))
            .map(|(index, _)| index)
            .collect()
    }

    /// Parses nine hex codes, e.g. from a comma or whitespace separated list.
    pub fn from_hex_codes<'a, I>(codes: I) -> Result<Self, ScanError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let colors = codes
            .into_iter()
            .map(CanonicalColor::from_hex)
            .collect::<Result<Vec<_>, _>>()?;
        let count = colors.len();
        let colors: [CanonicalColor; CELL_COUNT] =
            colors.try_into().map_err(|_| ScanError::PatternLength(count))?;
        Ok(Pattern(colors))
    }
}

impl FromStr for Pattern {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codes = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|code| !code.is_empty());
        Self::from_hex_codes(codes)
    }
}

impl fmt::Display for Pattern {
    /// Three rows of color names.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.0.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            let names: Vec<String> = cells.iter().map(|c| format!("{:<6}", c.name())).collect();
            write!(f, "{}", names.join(" ").trim_end())?;
        }
        Ok(())
    }
}
