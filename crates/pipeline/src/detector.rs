//! Detector seam and recorded-detection replay

use serde::{Deserialize, Serialize};
use spatial::{BoundingBox, Detection};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Detector errors
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Failed to read detections: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed detection manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid detection for {image}: {reason}")]
    InvalidDetection { image: String, reason: String },
}

/// Produces the detections for one image, in detector order
pub trait Detector {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, DetectError>;
}

/// One recorded detection as stored in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub label: String,
    pub confidence: f32,
    /// [x1, y1, x2, y2] in source pixels
    #[serde(rename = "box")]
    pub bbox: [f64; 4],
}

impl ManifestEntry {
    fn to_detection(&self, image: &str) -> Result<Detection, DetectError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(DetectError::InvalidDetection {
                image: image.to_string(),
                reason: format!("confidence {} outside [0, 1]", self.confidence),
            });
        }
        if self.bbox.iter().any(|c| !c.is_finite()) {
            return Err(DetectError::InvalidDetection {
                image: image.to_string(),
                reason: format!("non-finite box {:?}", self.bbox),
            });
        }

        let [x1, y1, x2, y2] = self.bbox;
        Ok(Detection::new(
            BoundingBox::new(x1, y1, x2, y2),
            self.label.clone(),
            self.confidence,
        ))
    }
}

/// Replays detections recorded by an external model.
///
/// The manifest is a JSON object mapping image file names to detection
/// lists. Images that are not listed have no detections.
#[derive(Debug, Clone, Default)]
pub struct ManifestDetector {
    entries: HashMap<String, Vec<ManifestEntry>>,
}

impl ManifestDetector {
    pub fn new(entries: HashMap<String, Vec<ManifestEntry>>) -> Self {
        Self { entries }
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self, DetectError> {
        let text = fs::read_to_string(path)?;
        let detector = Self::from_json(&text)?;
        info!(
            "Loaded detections for {} images from {}",
            detector.entries.len(),
            path.display()
        );
        Ok(detector)
    }

    pub fn from_json(text: &str) -> Result<Self, DetectError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn image_count(&self) -> usize {
        self.entries.len()
    }
}

impl Detector for ManifestDetector {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, DetectError> {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.entries.get(&name) {
            Some(entries) => entries.iter().map(|e| e.to_detection(&name)).collect(),
            None => {
                debug!("No recorded detections for {}", name);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "street.jpg": [
            {"label": "person", "confidence": 0.91, "box": [270, 150, 370, 550]},
            {"label": "car", "confidence": 0.66, "box": [500, 300, 620, 380]}
        ],
        "empty.png": []
    }"#;

    #[test]
    fn test_replays_in_order() {
        let detector = ManifestDetector::from_json(MANIFEST).unwrap();
        assert_eq!(detector.image_count(), 2);

        let detections = detector.detect(Path::new("/data/samples/street.jpg")).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label, "person");
        assert_eq!(detections[0].bbox, BoundingBox::new(270.0, 150.0, 370.0, 550.0));
        assert_eq!(detections[1].label, "car");
    }

    #[test]
    fn test_unlisted_image_has_no_detections() {
        let detector = ManifestDetector::from_json(MANIFEST).unwrap();
        assert!(detector.detect(Path::new("other.jpg")).unwrap().is_empty());
        assert!(detector.detect(Path::new("empty.png")).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let detector = ManifestDetector::from_json(
            r#"{"bad.jpg": [{"label": "cat", "confidence": 1.5, "box": [0, 0, 1, 1]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            detector.detect(Path::new("bad.jpg")),
            Err(DetectError::InvalidDetection { .. })
        ));
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(matches!(
            ManifestDetector::from_json("[1, 2, 3]"),
            Err(DetectError::Manifest(_))
        ));
    }
}
