//! Application configuration
//!
//! Layered as built-in defaults, then an optional TOML file, then
//! `WAYFINDER__SECTION__KEY` environment variables.

use alerting::{DispatcherConfig, SpeechRenderer};
use navigation::AdvisorConfig;
use serde::{Deserialize, Serialize};
use spatial::SpatialConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::speech::{CommandRenderer, LogRenderer};
use crate::PipelineError;

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Images analyzed when no path is given on the command line
    pub samples_dir: PathBuf,
    /// Recorded detector output, keyed by image file name
    pub manifest_path: PathBuf,
    /// Per-detection CSV report
    pub report_path: PathBuf,
    /// Where annotated copies of the images are saved
    pub annotated_dir: PathBuf,
    /// Save annotated images
    pub annotate: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            samples_dir: PathBuf::from("data/samples"),
            manifest_path: PathBuf::from("data/samples/detections.json"),
            report_path: PathBuf::from("data/output/detection_results.csv"),
            annotated_dir: PathBuf::from("data/output/annotated_images"),
            annotate: true,
        }
    }
}

/// Speech backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// External TTS program, e.g. "espeak". Speech is only logged when unset.
    pub command: Option<String>,
    /// Arguments placed before the text, e.g. ["-s", "175"]
    pub args: Vec<String>,
}

impl SpeechConfig {
    pub fn renderer(&self) -> Arc<dyn SpeechRenderer> {
        match &self.command {
            Some(program) => Arc::new(CommandRenderer::new(program.clone(), self.args.clone())),
            None => Arc::new(LogRenderer),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Prometheus listener address, e.g. "127.0.0.1:9100"
    pub metrics_listen: Option<String>,
    pub spatial: SpatialConfig,
    pub advisor: AdvisorConfig,
    pub dispatcher: DispatcherConfig,
    pub paths: PathsConfig,
    pub speech: SpeechConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_listen: None,
            spatial: SpatialConfig::default(),
            advisor: AdvisorConfig::default(),
            dispatcher: DispatcherConfig::default(),
            paths: PathsConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration; a missing file is not an error
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix("WAYFINDER")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        // Validate early so a bad size table fails before any speech starts
        config.spatial.estimator()?;
        info!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}
