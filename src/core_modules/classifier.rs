// THEORY:
// The classifier maps one normalized, known-not-white cell color to the best of the
// five chromatic game colors. It is the last stage of the pipeline and is stateless:
// the reference colors and weights are fixed when it is built.
//
// Algorithm:
// 1.  Score the detected color against every chromatic reference with the composite
//     `SmartPixel::similarity`.
// 2.  Subtract the candidate's hue-gate penalty when the detected hue/saturation is
//     outside that candidate's band (-100 for red/orange/yellow, -50 for green/blue).
// 3.  Pick the highest post-penalty score. Ties keep the earliest candidate in the
//     order Red, Blue, Green, Yellow, Orange.
//
// There is no "unknown" outcome. A weak match is still a match; the gates only
// reorder candidates, they never remove them.

use crate::core_modules::canonical::CanonicalColor;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::smart_pixel::smart_pixel::{Score, ScoreWeights, SmartPixel};

/// How one candidate fared against a detected color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub color: CanonicalColor,
    /// Composite similarity before gating.
    pub similarity: Score,
    /// Gate penalty subtracted (0 when the gate admits the color).
    pub penalty: Score,
}

impl CandidateScore {
    pub fn score(&self) -> Score {
        self.similarity - self.penalty
    }
}

/// Scores detected colors against the five chromatic references.
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    weights: ScoreWeights,
    references: [SmartPixel; 5],
}

impl Default for ColorClassifier {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl ColorClassifier {
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            references: CanonicalColor::CHROMATIC.map(|color| SmartPixel::new(color.rgb())),
        }
    }

    /// Every candidate's score, in tie-break order.
    pub fn score_candidates(&self, pixel: Pixel) -> [CandidateScore; 5] {
        let detected = SmartPixel::new(pixel);
        let mut scores = [CandidateScore {
            color: CanonicalColor::Red,
            similarity: 0.0,
            penalty: 0.0,
        }; 5];

        for (slot, (color, reference)) in scores
            .iter_mut()
            .zip(CanonicalColor::CHROMATIC.into_iter().zip(self.references.iter()))
        {
            let penalty = color.hue_gate().map_or(0.0, |gate| gate.penalty_for(detected.hsv()));
            *slot = CandidateScore {
                color,
                similarity: detected.similarity(reference, &self.weights),
                penalty,
            };
        }
        scores
    }

    /// The best-matching chromatic color. Never returns `White`.
    pub fn classify(&self, pixel: Pixel) -> CanonicalColor {
        let scores = self.score_candidates(pixel);
        let mut best = scores[0];
        for candidate in &scores[1..] {
            if candidate.score() > best.score() {
                best = *candidate;
            }
        }
        best.color
    }
}

/// Classifies a non-white color with the default weights.
pub fn classify_non_white(pixel: Pixel) -> CanonicalColor {
    ColorClassifier::default().classify(pixel)
}
