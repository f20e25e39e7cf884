//! Wayfinder Pipeline
//!
//! Drives one analysis session: reads detections for each image, derives
//! bearings and distances, writes the report, and hands per-object alerts
//! and the frame advisory to the speech dispatcher.

pub mod annotate;
pub mod config;
pub mod detector;
pub mod frame;
pub mod session;
pub mod speech;

pub use config::AppConfig;
pub use detector::{DetectError, Detector, ManifestDetector};
pub use frame::{FrameProcessor, FrameReport};
pub use session::{run, RunSummary};
pub use speech::{CommandRenderer, LogRenderer};

use std::path::PathBuf;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Path {0} not found")]
    PathNotFound(PathBuf),

    #[error("Detection failed: {0}")]
    Detect(#[from] DetectError),

    #[error("Report error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid spatial configuration: {0}")]
    Spatial(#[from] spatial::SpatialError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize logging
pub fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
