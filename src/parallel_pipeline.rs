// THEORY:
// Scanning a single frame is fast and synchronous, but offline work (calibrating
// thresholds against a folder of captures, replaying a session) means scanning many
// frames at once. `BatchScanner` fans frames out over tokio's blocking pool, bounded
// by a semaphore sized to the machine's cores, and gathers the reports back in input
// order.
//
// The scanner itself is shared immutably between workers; it holds no per-frame
// state, so no locking is needed beyond the concurrency limit.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::ScanError;
use crate::pipeline::{CubeScanner, DetectedPattern, ScanReport, ScannerConfig};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Scans batches of frames concurrently.
#[derive(Clone)]
pub struct BatchScanner {
    scanner: Arc<CubeScanner>,
    limit: Arc<Semaphore>,
    workers: usize,
}

impl BatchScanner {
    /// One worker per logical CPU.
    pub fn new(config: ScannerConfig) -> Self {
        Self::with_workers(config, num_cpus::get())
    }

    pub fn with_workers(config: ScannerConfig, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            scanner: Arc::new(CubeScanner::new(config)),
            limit: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scans every frame; reports come back in the same order as `frames`.
    pub async fn scan_all(&self, frames: Vec<PixelBuffer>) -> Result<Vec<ScanReport>, ScanError> {
        debug!(frames = frames.len(), workers = self.workers, "batch scan started");

        let tasks = frames.into_iter().map(|frame| {
            let scanner = Arc::clone(&self.scanner);
            let limit = Arc::clone(&self.limit);
            async move {
                let permit = limit
                    .acquire_owned()
                    .await
                    .map_err(|e| ScanError::Worker(e.to_string()))?;
                tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    scanner.scan(&frame)
                })
                .await
                .map_err(|e| ScanError::Worker(e.to_string()))
            }
        });

        join_all(tasks).await.into_iter().collect()
    }

    /// Like `scan_all`, keeping only the detected patterns.
    pub async fn classify_all(
        &self,
        frames: Vec<PixelBuffer>,
    ) -> Result<Vec<DetectedPattern>, ScanError> {
        let reports = self.scan_all(frames).await?;
        Ok(reports.iter().map(ScanReport::pattern).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::canonical::CanonicalColor;
    use crate::pattern::Pattern;

    /// A frame whose whole guide square is one color.
    fn solid(color: CanonicalColor) -> PixelBuffer {
        PixelBuffer::filled(120, 90, color.rgb())
    }

    #[tokio::test]
    async fn preserves_input_order() {
        let colors = [
            CanonicalColor::Red,
            CanonicalColor::White,
            CanonicalColor::Blue,
            CanonicalColor::Green,
            CanonicalColor::White,
            CanonicalColor::Red,
        ];
        let frames = colors.iter().map(|c| solid(*c)).collect();
        let patterns = BatchScanner::with_workers(ScannerConfig::default(), 3)
            .classify_all(frames)
            .await
            .unwrap();

        let expected: Vec<Pattern> = colors.iter().map(|c| Pattern([*c; 9])).collect();
        assert_eq!(patterns, expected);
    }

    #[tokio::test]
    async fn single_worker_and_empty_batch() {
        let scanner = BatchScanner::with_workers(ScannerConfig::default(), 0);
        assert_eq!(scanner.workers(), 1);
        assert!(scanner.scan_all(Vec::new()).await.unwrap().is_empty());

        let reports = scanner.scan_all(vec![solid(CanonicalColor::Green)]).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].white_balance_scale, 3.0);
    }

    #[tokio::test]
    async fn matches_sequential_scanning() {
        let frames: Vec<PixelBuffer> = CanonicalColor::ALL.iter().map(|c| solid(*c)).collect();
        let sequential: Vec<ScanReport> =
            frames.iter().map(|f| CubeScanner::default().scan(f)).collect();
        let batched = BatchScanner::new(ScannerConfig::default()).scan_all(frames).await.unwrap();
        assert_eq!(batched, sequential);
    }
}
