//! Monocular distance heuristics
//!
//! Uses the similar-triangles relation of a pinhole camera:
//! `distance = reference_height * focal_length / box_height`. The reference
//! height comes from a per-class prior, so the result is only as good as the
//! assumption that the object has a typical size and is fully in view.

use std::collections::HashMap;
use tracing::debug;

use crate::geometry::BoundingBox;
use crate::SpatialError;

/// Shared calibration constant (unitless in this heuristic)
pub const DEFAULT_FOCAL_LENGTH: f64 = 800.0;

/// Reference height for classes missing from the size table (meters)
pub const DEFAULT_OBJECT_SIZE: f64 = 0.5;

/// Returned instead of dividing by a zero box height (meters)
pub const ZERO_HEIGHT_DISTANCE: f64 = 100.0;

/// Smallest reportable distance after rounding (meters)
const MIN_DISTANCE: f64 = 0.01;

/// Typical real-world heights of common classes (meters)
const TYPICAL_OBJECT_SIZES: &[(&str, f64)] = &[
    ("person", 1.7),
    ("car", 1.5),
    ("chair", 1.0),
    ("bottle", 0.25),
    ("cell phone", 0.15),
    ("laptop", 0.3),
    ("door", 2.0),
    ("table", 0.75),
    ("backpack", 0.5),
    ("umbrella", 1.0),
    ("handbag", 0.3),
    ("suitcase", 0.6),
];

/// Reference height per object class with an explicit fallback
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSizeTable {
    sizes: HashMap<String, f64>,
    default_size: f64,
}

impl ObjectSizeTable {
    /// Empty table: every label resolves to `default_size`
    pub fn new(default_size: f64) -> Self {
        Self {
            sizes: HashMap::new(),
            default_size,
        }
    }

    /// Replace the fallback size used for unlisted labels
    pub fn with_default_size(mut self, default_size: f64) -> Self {
        self.default_size = default_size;
        self
    }

    /// Add or replace a class entry
    pub fn insert(&mut self, label: impl Into<String>, size: f64) -> Result<(), SpatialError> {
        let label = label.into();
        if !(size.is_finite() && size > 0.0) {
            return Err(SpatialError::InvalidObjectSize { label, size });
        }
        self.sizes.insert(label, size);
        Ok(())
    }

    /// Reference height for a label; unknown labels get the default
    pub fn size_of(&self, label: &str) -> f64 {
        self.sizes.get(label).copied().unwrap_or(self.default_size)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.sizes.contains_key(label)
    }

    pub fn default_size(&self) -> f64 {
        self.default_size
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl Default for ObjectSizeTable {
    fn default() -> Self {
        Self {
            sizes: TYPICAL_OBJECT_SIZES
                .iter()
                .map(|(label, size)| (label.to_string(), *size))
                .collect(),
            default_size: DEFAULT_OBJECT_SIZE,
        }
    }
}

/// Distance estimator over a size table and focal length
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEstimator {
    sizes: ObjectSizeTable,
    focal_length: f64,
    zero_height_distance: f64,
}

impl DistanceEstimator {
    pub fn new(sizes: ObjectSizeTable, focal_length: f64) -> Result<Self, SpatialError> {
        if !(focal_length.is_finite() && focal_length > 0.0) {
            return Err(SpatialError::InvalidFocalLength(focal_length));
        }
        Ok(Self {
            sizes,
            focal_length,
            zero_height_distance: ZERO_HEIGHT_DISTANCE,
        })
    }

    /// Override the sentinel used for zero-height boxes
    pub fn with_zero_height_distance(mut self, distance: f64) -> Self {
        self.zero_height_distance = distance;
        self
    }

    pub fn sizes(&self) -> &ObjectSizeTable {
        &self.sizes
    }

    /// Estimate distance in meters, rounded to two decimals.
    ///
    /// `frame_height` is accepted for interface compatibility; the estimate
    /// does not depend on it.
    pub fn estimate(&self, bbox: &BoundingBox, label: &str, _frame_height: f64) -> f64 {
        let box_height = bbox.height();
        if box_height == 0.0 {
            debug!("Zero-height box for '{}', using sentinel distance", label);
            return self.zero_height_distance;
        }

        let known_height = self.sizes.size_of(label);
        let distance = known_height * self.focal_length / box_height;
        round2(distance).max(MIN_DISTANCE)
    }
}

impl Default for DistanceEstimator {
    fn default() -> Self {
        Self {
            sizes: ObjectSizeTable::default(),
            focal_length: DEFAULT_FOCAL_LENGTH,
            zero_height_distance: ZERO_HEIGHT_DISTANCE,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimate distance with the default size table and focal length
pub fn estimate_distance(bbox: &BoundingBox, label: &str, frame_height: f64) -> f64 {
    DistanceEstimator::default().estimate(bbox, label, frame_height)
}

/// Render a distance as whole centimeters below 1 m, else meters to 0.1
pub fn format_distance(distance: f64) -> String {
    if distance < 1.0 {
        format!("{:.0}cm", distance * 100.0)
    } else {
        format!("{:.1}m", distance)
    }
}
