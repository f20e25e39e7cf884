//! Spatial heuristics configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::distance::{
    DistanceEstimator, ObjectSizeTable, DEFAULT_FOCAL_LENGTH, DEFAULT_OBJECT_SIZE,
    ZERO_HEIGHT_DISTANCE,
};
use crate::SpatialError;

/// Spatial configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Focal length calibration constant
    pub focal_length: f64,

    /// Distance reported for zero-height boxes (meters)
    pub zero_height_distance_m: f64,

    /// Reference height for unlisted classes (meters)
    pub default_object_size_m: f64,

    /// Extra or overriding reference heights (meters)
    pub object_sizes: BTreeMap<String, f64>,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            focal_length: DEFAULT_FOCAL_LENGTH,
            zero_height_distance_m: ZERO_HEIGHT_DISTANCE,
            default_object_size_m: DEFAULT_OBJECT_SIZE,
            object_sizes: BTreeMap::new(),
        }
    }
}

impl SpatialConfig {
    /// Build the estimator described by this configuration
    pub fn estimator(&self) -> Result<DistanceEstimator, SpatialError> {
        let default_size = self.default_object_size_m;
        if !(default_size.is_finite() && default_size > 0.0) {
            return Err(SpatialError::InvalidObjectSize {
                label: "<default>".to_string(),
                size: default_size,
            });
        }
        if !(self.zero_height_distance_m.is_finite() && self.zero_height_distance_m > 0.0) {
            return Err(SpatialError::InvalidObjectSize {
                label: "<zero-height sentinel>".to_string(),
                size: self.zero_height_distance_m,
            });
        }

        let mut sizes = ObjectSizeTable::default().with_default_size(default_size);
        for (label, size) in &self.object_sizes {
            sizes.insert(label.clone(), *size)?;
        }

        Ok(DistanceEstimator::new(sizes, self.focal_length)?
            .with_zero_height_distance(self.zero_height_distance_m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    #[test]
    fn test_default_config_matches_default_estimator() {
        let estimator = SpatialConfig::default().estimator().unwrap();
        assert_eq!(estimator, DistanceEstimator::default());
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = SpatialConfig {
            default_object_size_m: 1.0,
            zero_height_distance_m: 50.0,
            ..Default::default()
        };
        config.object_sizes.insert("bicycle".to_string(), 1.1);
        let estimator = config.estimator().unwrap();

        let flat = BoundingBox::new(0.0, 10.0, 10.0, 10.0);
        assert_eq!(estimator.estimate(&flat, "person", 480.0), 50.0);

        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 400.0);
        assert_eq!(estimator.estimate(&bbox, "kite", 480.0), 2.0);
        assert_eq!(estimator.estimate(&bbox, "bicycle", 480.0), 2.2);
        assert_eq!(estimator.estimate(&bbox, "person", 480.0), 3.4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SpatialConfig {
            default_object_size_m: -1.0,
            ..Default::default()
        };
        assert!(config.estimator().is_err());

        let mut config = SpatialConfig::default();
        config.object_sizes.insert("door".to_string(), 0.0);
        assert!(matches!(
            config.estimator(),
            Err(SpatialError::InvalidObjectSize { .. })
        ));
    }
}
