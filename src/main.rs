// Command-line front end for the scanner: classify captured cube photos, optionally
// check them against a target pattern, or generate a new target.

use anyhow::Context;
use clap::{Parser, Subcommand};
use cuberush_vision::{BatchScanner, Pattern, PixelBuffer, ScanReport, ScannerConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "cuberush-scan",
    version,
    about = "Detect 3x3 cube face colors in captured frames"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the nine cells of each image.
    Scan {
        /// Captured frames (any format the `image` crate decodes).
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// JSON file overriding scanner tuning; missing fields keep defaults.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Target pattern to check against: nine hex codes, comma or space separated.
        #[arg(long)]
        target: Option<Pattern>,
        /// Emit full per-cell reports as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a random target pattern.
    Target {
        /// Seed for a reproducible pattern.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Serialize)]
struct FrameResult {
    image: String,
    pattern: Pattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches_target: Option<bool>,
    report: ScanReport,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Scan { images, config, target, json } => scan(images, config, target, json).await,
        Command::Target { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let pattern = Pattern::random(&mut rng);
            println!("{}", pattern.hex_codes().join(","));
            println!("{pattern}");
            Ok(())
        }
    }
}

async fn scan(
    images: Vec<PathBuf>,
    config: Option<PathBuf>,
    target: Option<Pattern>,
    json: bool,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => ScannerConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScannerConfig::default(),
    };

    let mut frames = Vec::with_capacity(images.len());
    for path in &images {
        let image = image::open(path)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        frames.push(PixelBuffer::from(image));
    }

    let scanner = BatchScanner::new(config);
    info!(frames = frames.len(), workers = scanner.workers(), "scanning");
    let reports = scanner.scan_all(frames).await?;

    let results: Vec<FrameResult> = images
        .iter()
        .zip(reports)
        .map(|(path, report)| {
            let pattern = report.pattern();
            FrameResult {
                image: path.display().to_string(),
                matches_target: target.as_ref().map(|t| t.matches(&pattern)),
                pattern,
                report,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        println!("{}", result.image);
        println!("{}", result.pattern);
        if let Some(target) = &target {
            let mismatches = target.mismatches(&result.pattern);
            if mismatches.is_empty() {
                println!("=> match");
            } else {
                println!("=> no match (cells {:?})", mismatches);
            }
        }
        println!();
    }
    Ok(())
}
