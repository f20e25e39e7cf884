//! Analysis session: target discovery, per-image processing, speech lifecycle

use alerting::{AlertDispatcher, DispatchStats, SpeechRenderer};
use navigation::NavigationAdvisor;
use spatial::FrameSize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::ReportWriter;
use tracing::{info, warn};

use crate::annotate::annotate_image;
use crate::config::AppConfig;
use crate::detector::Detector;
use crate::frame::{FrameProcessor, FrameReport};
use crate::PipelineError;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Outcome of a session
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub images_processed: usize,
    pub detections: usize,
    /// Frames whose advisory told the user to stop
    pub critical_frames: usize,
    pub report_path: Option<PathBuf>,
    pub speech: DispatchStats,
}

/// Run a full session.
///
/// The speech dispatcher is drained and stopped before this returns, on
/// success and on error alike.
pub async fn run(
    config: &AppConfig,
    target: Option<&Path>,
    detector: &dyn Detector,
    renderer: Arc<dyn SpeechRenderer>,
) -> Result<RunSummary, PipelineError> {
    let processor = FrameProcessor::new(
        config.spatial.estimator()?,
        NavigationAdvisor::new(config.advisor.clone()),
    );

    let dispatcher = AlertDispatcher::spawn(config.dispatcher.clone(), renderer);
    dispatcher.speak_summary("Vision system online. Initializing analysis.");

    let result = analyze_targets(config, target, detector, &processor, &dispatcher);

    let speech = dispatcher.stop().await;
    result.map(|summary| RunSummary { speech, ..summary })
}

fn analyze_targets(
    config: &AppConfig,
    target: Option<&Path>,
    detector: &dyn Detector,
    processor: &FrameProcessor,
    dispatcher: &AlertDispatcher,
) -> Result<RunSummary, PipelineError> {
    let images = match target {
        Some(path) if path.is_file() => vec![path.to_path_buf()],
        Some(path) if path.is_dir() => list_images(path)?,
        Some(path) => {
            warn!("Error: Path {} not found.", path.display());
            dispatcher.speak_summary(&format!("Error. Path {} not found.", path.display()));
            return Err(PipelineError::PathNotFound(path.to_path_buf()));
        }
        None => list_images(&config.paths.samples_dir)?,
    };

    if images.is_empty() {
        info!("No images found to process.");
        dispatcher.speak_summary("No images found to process.");
        return Ok(RunSummary::default());
    }

    let mut writer = ReportWriter::create(&config.paths.report_path)?;
    let mut summary = RunSummary {
        report_path: Some(config.paths.report_path.clone()),
        ..Default::default()
    };

    for path in &images {
        let name = display_name(path);
        dispatcher.speak_summary(&format!("Analyzing {}", name));

        let report = process_image(config, path, detector, processor, dispatcher, &mut writer)?;
        summary.images_processed += 1;
        summary.detections += report.detections.len();
        if report.advisory.as_ref().is_some_and(|a| a.is_critical()) {
            summary.critical_frames += 1;
        }
    }

    writer.flush()?;
    dispatcher.speak_summary("Analysis complete. Reports have been saved.");
    info!(
        "Done! {} images, {} detections. Report saved to {}",
        summary.images_processed,
        summary.detections,
        config.paths.report_path.display()
    );

    Ok(summary)
}

/// Analyze one image, write its rows, and queue its speech
pub fn process_image(
    config: &AppConfig,
    path: &Path,
    detector: &dyn Detector,
    processor: &FrameProcessor,
    dispatcher: &AlertDispatcher,
    writer: &mut ReportWriter<File>,
) -> Result<FrameReport, PipelineError> {
    let name = display_name(path);
    info!("Analyzing {} ...", name);

    let frame = match image::image_dimensions(path) {
        Ok((width, height)) => FrameSize::new(width, height),
        Err(e) => {
            warn!("Could not read image dimensions for {}: {}", name, e);
            FrameSize::FALLBACK
        }
    };

    let detections = detector.detect(path)?;

    if config.paths.annotate {
        if let Err(e) = annotate_image(path, &detections, &config.paths.annotated_dir) {
            warn!("Could not save annotated copy of {}: {}", name, e);
        }
    }

    let report = processor.analyze(&name, frame, &detections);
    for record in &report.records {
        writer.write_record(record)?;
    }

    match &report.advisory {
        Some(advisory) => {
            info!("Detected {} object(s):", report.descriptions.len());
            for (i, description) in report.descriptions.iter().enumerate() {
                info!("  {}. {}", i + 1, description);
            }

            for fd in &report.detections {
                dispatcher.add_alert(&fd.label, fd.position, fd.distance);
            }

            let text = advisory.to_string();
            if advisory.is_critical() {
                warn!("Navigation Recommendation: {}", text);
            } else {
                info!("Navigation Recommendation: {}", text);
            }
            dispatcher.speak_summary(&text);
        }
        None => {
            info!("  No objects detected.");
            dispatcher.speak_summary("The scene appears to be clear.");
        }
    }

    Ok(report)
}

/// Image files directly inside `dir`, sorted by path
fn list_images(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.is_dir() {
        warn!("Image folder {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut images: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    images.sort();
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
