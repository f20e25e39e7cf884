//! Wayfinder - Main Entry Point

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use pipeline::{init_logging, AppConfig, ManifestDetector};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Spoken spatial guidance from object detections")]
struct Args {
    /// Image file or folder to analyze (defaults to the configured samples folder)
    path: Option<PathBuf>,
    /// Configuration file
    #[arg(long, short, default_value = "wayfinder.toml")]
    config: PathBuf,
    /// Recorded detections manifest (JSON)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Output CSV report
    #[arg(long)]
    report: Option<PathBuf>,
    /// Skip saving annotated images
    #[arg(long)]
    no_annotate: bool,
    /// External TTS program, e.g. "espeak"
    #[arg(long)]
    speech_command: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(Some(&args.config))?;
    if let Some(manifest) = args.manifest {
        config.paths.manifest_path = manifest;
    }
    if let Some(report) = args.report {
        config.paths.report_path = report;
    }
    if args.no_annotate {
        config.paths.annotate = false;
    }
    if let Some(command) = args.speech_command {
        config.speech.command = Some(command);
    }

    init_logging(&config.log_level);
    info!("=== Wayfinder v{} ===", env!("CARGO_PKG_VERSION"));

    if let Some(addr) = &config.metrics_listen {
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("invalid metrics_listen address {}", addr))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to start Prometheus exporter")?;
        info!("Serving metrics on {}", addr);
    }

    let detector = ManifestDetector::load(&config.paths.manifest_path).with_context(|| {
        format!(
            "failed to load detections from {}",
            config.paths.manifest_path.display()
        )
    })?;

    let summary = pipeline::run(
        &config,
        args.path.as_deref(),
        &detector,
        config.speech.renderer(),
    )
    .await?;

    info!(
        "Session finished: {} images, {} detections, {} stop advisories, {} announcements",
        summary.images_processed, summary.detections, summary.critical_frames, summary.speech.spoken
    );
    Ok(())
}
