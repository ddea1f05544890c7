// THEORY:
// This file is the main entry point for the `cuberush_vision` library crate. It
// defines the public API consumed by the game: hand the scanner a captured frame and
// get back nine game colors in grid order.
//
// The primary exports are `classify_pattern` and `CubeScanner` (single frames),
// `BatchScanner` (many frames) and `Pattern` (targets, detections and their
// comparison). The per-stage modules under `core_modules` stay public for callers
// that want to tune or inspect individual stages, but the pipeline is the intended
// interface.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pattern;
pub mod pipeline;

pub use core_modules::canonical::CanonicalColor;
pub use core_modules::pixel::pixel::Pixel;
pub use core_modules::pixel_buffer::PixelBuffer;
pub use core_modules::sampler::CellCenter;
pub use error::ScanError;
pub use parallel_pipeline::BatchScanner;
pub use pattern::{DetectedPattern, Pattern};
pub use pipeline::{CubeScanner, ScanReport, ScannerConfig, classify_pattern};
