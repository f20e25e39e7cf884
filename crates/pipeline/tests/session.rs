//! End-to-end session tests with recorded detections and captured speech

use alerting::{SpeechError, SpeechRenderer};
use image::RgbImage;
use pipeline::{run, AppConfig, ManifestDetector, PipelineError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use storage::DetectionRecord;

#[derive(Default)]
struct CapturedSpeech {
    lines: Mutex<Vec<String>>,
}

impl CapturedSpeech {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl SpeechRenderer for CapturedSpeech {
    fn render(&self, text: &str) -> Result<(), SpeechError> {
        self.lines.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn config_for(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.paths.samples_dir = root.join("samples");
    config.paths.report_path = root.join("output").join("detection_results.csv");
    config.paths.annotated_dir = root.join("output").join("annotated_images");
    config
}

const MANIFEST: &str = r#"{
    "hallway.png": [
        {"label": "person", "confidence": 0.91, "box": [270, 0, 370, 680]},
        {"label": "chair", "confidence": 0.62, "box": [10, 380, 150, 880]}
    ],
    "kitchen.png": [
        {"label": "oven", "confidence": 0.77, "box": [500, 50, 620, 150]}
    ]
}"#;

fn write_samples(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    RgbImage::new(640, 640).save(dir.join("hallway.png")).unwrap();
    RgbImage::new(640, 640).save(dir.join("kitchen.png")).unwrap();
    RgbImage::new(320, 240).save(dir.join("porch.png")).unwrap();
}

#[tokio::test]
async fn test_full_session() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    write_samples(&config.paths.samples_dir);

    let detector = ManifestDetector::from_json(MANIFEST).unwrap();
    let speech = Arc::new(CapturedSpeech::default());

    let summary = run(&config, None, &detector, speech.clone()).await.unwrap();

    assert_eq!(summary.images_processed, 3);
    assert_eq!(summary.detections, 3);
    assert_eq!(summary.critical_frames, 0);
    assert_eq!(summary.speech.pending(), 0);

    assert_eq!(
        speech.lines(),
        vec![
            "Summary: Vision system online. Initializing analysis.",
            "Summary: Analyzing hallway.png",
            "person at straight ahead, 2.0 meters away.",
            "chair at bottom left, 1.6 meters away.",
            "Summary: The path is mostly clear, but there is chair about 1.6m away on your bottom left.",
            "Summary: Analyzing kitchen.png",
            "oven at top right, 4.0 meters away.",
            "Summary: The path ahead looks good. No immediate obstacles detected.",
            "Summary: Analyzing porch.png",
            "Summary: The scene appears to be clear.",
            "Summary: Analysis complete. Reports have been saved.",
        ]
    );

    let mut reader = csv::Reader::from_path(&config.paths.report_path).unwrap();
    let rows: Vec<DetectionRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].image_name, "hallway.png");
    assert_eq!(rows[0].distance, "2.00");
    assert_eq!(rows[2].label, "oven");
    assert_eq!(rows[2].position, "top right");

    assert!(config.paths.annotated_dir.join("hallway_0.jpg").is_file());
    assert!(config.paths.annotated_dir.join("porch_0.jpg").is_file());
}

#[tokio::test]
async fn test_stop_advisory_and_debounce_across_frames() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config_for(root.path());
    config.paths.annotate = false;

    let samples = &config.paths.samples_dir;
    std::fs::create_dir_all(samples).unwrap();
    RgbImage::new(640, 640).save(samples.join("a.png")).unwrap();
    RgbImage::new(640, 640).save(samples.join("b.png")).unwrap();

    // Same person, same bearing, in two consecutive frames
    let detector = ManifestDetector::from_json(
        r#"{
            "a.png": [{"label": "person", "confidence": 0.9, "box": [270, -360, 370, 1000]}],
            "b.png": [{"label": "person", "confidence": 0.9, "box": [270, -360, 370, 1000]}]
        }"#,
    )
    .unwrap();
    let speech = Arc::new(CapturedSpeech::default());

    let summary = run(&config, None, &detector, speech.clone()).await.unwrap();
    assert_eq!(summary.critical_frames, 2);
    assert_eq!(summary.speech.suppressed, 1);

    let lines = speech.lines();
    let alerts: Vec<&String> = lines.iter().filter(|l| l.starts_with("person")).collect();
    assert_eq!(alerts, vec!["person at straight ahead, 1.0 meters away."]);

    let stops = lines.iter().filter(|l| l.starts_with("Summary: Stop!")).count();
    assert_eq!(stops, 2);
    assert!(lines.contains(
        &"Summary: Stop! person is directly in front of you, only 1.0m away. You can turn either left or right to avoid it."
            .to_string()
    ));
}

#[tokio::test]
async fn test_missing_path_reports_error_and_drains() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    let missing = root.path().join("nope");
    let speech = Arc::new(CapturedSpeech::default());

    let result = run(&config, Some(&missing), &ManifestDetector::default(), speech.clone()).await;

    assert!(matches!(result, Err(PipelineError::PathNotFound(_))));
    assert_eq!(
        speech.lines(),
        vec![
            "Summary: Vision system online. Initializing analysis.".to_string(),
            format!("Summary: Error. Path {} not found.", missing.display()),
        ]
    );
    assert!(!config.paths.report_path.exists());
}

#[tokio::test]
async fn test_no_images_found() {
    let root = tempfile::tempdir().unwrap();
    let config = config_for(root.path());
    std::fs::create_dir_all(&config.paths.samples_dir).unwrap();
    let speech = Arc::new(CapturedSpeech::default());

    let summary = run(&config, None, &ManifestDetector::default(), speech.clone())
        .await
        .unwrap();

    assert_eq!(summary.images_processed, 0);
    assert!(summary.report_path.is_none());
    assert_eq!(
        speech.lines().last().map(String::as_str),
        Some("Summary: No images found to process.")
    );
}

#[tokio::test]
async fn test_single_file_target_with_unreadable_image() {
    let root = tempfile::tempdir().unwrap();
    let mut config = config_for(root.path());
    config.paths.annotate = false;

    // Not a decodable image: dimensions fall back to 640x640
    let target = root.path().join("broken.jpg");
    std::fs::write(&target, b"not an image").unwrap();

    let detector = ManifestDetector::from_json(
        r#"{"broken.jpg": [{"label": "bottle", "confidence": 0.5, "box": [0, 500, 100, 600]}]}"#,
    )
    .unwrap();
    let speech = Arc::new(CapturedSpeech::default());

    let summary = run(&config, Some(&target), &detector, speech.clone()).await.unwrap();
    assert_eq!(summary.images_processed, 1);

    let lines = speech.lines();
    assert!(lines.contains(&"Summary: Analyzing broken.jpg".to_string()));
    assert!(lines.contains(&"bottle at bottom left, 2.0 meters away.".to_string()));
}
