//! Per-frame analysis

use navigation::{Advisory, NavigationAdvisor};
use spatial::{generate_description, Detection, DistanceEstimator, FrameDetection, FrameSize};
use storage::DetectionRecord;

/// Everything derived from one frame's detections
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub image_name: String,
    pub frame: FrameSize,
    /// Bearing and distance per detection, in detector order
    pub detections: Vec<FrameDetection>,
    /// One sentence per detection
    pub descriptions: Vec<String>,
    /// Report rows, one per detection
    pub records: Vec<DetectionRecord>,
    /// Frame advisory; `None` when nothing was detected
    pub advisory: Option<Advisory>,
}

impl FrameReport {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Geometry plus advisor for a sequence of frames
#[derive(Debug, Clone, Default)]
pub struct FrameProcessor {
    estimator: DistanceEstimator,
    advisor: NavigationAdvisor,
}

impl FrameProcessor {
    pub fn new(estimator: DistanceEstimator, advisor: NavigationAdvisor) -> Self {
        Self { estimator, advisor }
    }

    /// Analyze one frame. Nothing is kept between calls.
    pub fn analyze(&self, image_name: &str, frame: FrameSize, detections: &[Detection]) -> FrameReport {
        let mut frame_detections = Vec::with_capacity(detections.len());
        let mut descriptions = Vec::with_capacity(detections.len());
        let mut records = Vec::with_capacity(detections.len());

        for detection in detections {
            let fd = FrameDetection::from_detection(detection, frame, &self.estimator);
            let description =
                generate_description(&fd.label, fd.position, fd.distance, detection.confidence);

            records.push(DetectionRecord {
                image_name: image_name.to_string(),
                label: fd.label.clone(),
                confidence: detection.confidence,
                x1: detection.bbox.x1,
                y1: detection.bbox.y1,
                x2: detection.bbox.x2,
                y2: detection.bbox.y2,
                position: fd.position.to_string(),
                distance: format!("{:.2}", fd.distance),
                description: description.clone(),
            });
            descriptions.push(description);
            frame_detections.push(fd);
        }

        let advisory = if frame_detections.is_empty() {
            None
        } else {
            Some(self.advisor.advise(&frame_detections))
        };

        FrameReport {
            image_name: image_name.to_string(),
            frame,
            detections: frame_detections,
            descriptions,
            records,
            advisory,
        }
    }
}
