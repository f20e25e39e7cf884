//! Spatial Heuristics
//!
//! Turns raw detector output into viewer-relative guidance:
//! - Bearing classification on a 3x3 grid (`PositionTag`)
//! - Monocular distance estimation from object-class size priors
//! - Human-readable distance and description rendering
//!
//! Distances are a rough pinhole-camera approximation driven by a per-class
//! reference height. They are not calibrated depth measurements.

pub mod config;
pub mod describe;
pub mod distance;
pub mod geometry;

pub use config::SpatialConfig;
pub use describe::{article_for, generate_description};
pub use distance::{
    estimate_distance, format_distance, DistanceEstimator, ObjectSizeTable,
    DEFAULT_FOCAL_LENGTH, DEFAULT_OBJECT_SIZE, ZERO_HEIGHT_DISTANCE,
};
pub use geometry::{
    get_position, BoundingBox, Detection, FrameDetection, FrameSize, Horizontal, PositionTag,
    Vertical,
};

use thiserror::Error;

/// Spatial error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Invalid focal length: {0}")]
    InvalidFocalLength(f64),

    #[error("Invalid reference size for '{label}': {size}")]
    InvalidObjectSize { label: String, size: f64 },

    #[error("Unknown position: {0}")]
    UnknownPosition(String),
}
