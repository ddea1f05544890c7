use thiserror::Error;

/// Errors raised at the edges of the scanner: building frames and parsing patterns.
///
/// The color pipeline itself never fails; degenerate input degrades to fallback
/// values instead (see the sampler and white balance modules).
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Unsupported channel count {0}: expected 3 (RGB) or 4 (RGBA)")]
    UnsupportedChannels(u8),

    #[error("Frame data is {actual} bytes but {width}x{height}x{channels} requires {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Not a game color: {0:?}")]
    InvalidColor(String),

    #[error("A pattern has exactly 9 colors, got {0}")]
    PatternLength(usize),

    #[error("Batch worker failed: {0}")]
    Worker(String),
}
