//! Bounding boxes, detections and bearing classification

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::distance::DistanceEstimator;
use crate::SpatialError;

/// Lower bucket boundary as a fraction of the frame axis
const LOWER_THIRD: f64 = 0.33;
/// Upper bucket boundary as a fraction of the frame axis
const UPPER_THIRD: f64 = 0.67;

/// Axis-aligned box in source-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a box from two corners, ordering them so x1 <= x2 and y1 <= y2
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Box centroid (cx, cy)
    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// One object instance reported by the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box
    pub bbox: BoundingBox,

    /// Object class name
    pub label: String,

    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            label: label.into(),
            confidence,
        }
    }
}

/// Source frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Substituted when the frame dimensions cannot be read
    pub const FALLBACK: FrameSize = FrameSize {
        width: 640,
        height: 640,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Vertical third of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vertical {
    Top,
    Center,
    Bottom,
}

impl Vertical {
    fn as_str(&self) -> &'static str {
        match self {
            Vertical::Top => "top",
            Vertical::Center => "center",
            Vertical::Bottom => "bottom",
        }
    }
}

/// Horizontal third of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

impl Horizontal {
    fn as_str(&self) -> &'static str {
        match self {
            Horizontal::Left => "left",
            Horizontal::Center => "center",
            Horizontal::Right => "right",
        }
    }
}

/// Coarse 3x3 bearing of an object relative to the viewer.
///
/// Renders as `"<vertical> <horizontal>"`, except the middle cell which
/// renders as `"straight ahead"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionTag {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl PositionTag {
    pub const STRAIGHT_AHEAD: PositionTag = PositionTag {
        vertical: Vertical::Center,
        horizontal: Horizontal::Center,
    };

    pub fn new(vertical: Vertical, horizontal: Horizontal) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Classify a box centroid against the frame thirds
    pub fn classify(bbox: &BoundingBox, frame_width: f64, frame_height: f64) -> Self {
        let (cx, cy) = bbox.center();

        let horizontal = if cx < frame_width * LOWER_THIRD {
            Horizontal::Left
        } else if cx > frame_width * UPPER_THIRD {
            Horizontal::Right
        } else {
            Horizontal::Center
        };

        let vertical = if cy < frame_height * LOWER_THIRD {
            Vertical::Top
        } else if cy > frame_height * UPPER_THIRD {
            Vertical::Bottom
        } else {
            Vertical::Center
        };

        Self {
            vertical,
            horizontal,
        }
    }

    pub fn is_straight_ahead(&self) -> bool {
        *self == Self::STRAIGHT_AHEAD
    }

    /// True when the rendered tag names the center on either axis
    /// ("straight ahead" included).
    pub fn mentions_center(&self) -> bool {
        self.vertical == Vertical::Center || self.horizontal == Horizontal::Center
    }

    pub fn mentions_left(&self) -> bool {
        self.horizontal == Horizontal::Left
    }

    pub fn mentions_right(&self) -> bool {
        self.horizontal == Horizontal::Right
    }
}

impl Display for PositionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_straight_ahead() {
            write!(f, "straight ahead")
        } else {
            write!(f, "{} {}", self.vertical.as_str(), self.horizontal.as_str())
        }
    }
}

impl FromStr for PositionTag {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "straight ahead" {
            return Ok(Self::STRAIGHT_AHEAD);
        }

        let unknown = || SpatialError::UnknownPosition(s.to_string());
        let (v, h) = s.split_once(' ').ok_or_else(unknown)?;

        let vertical = match v {
            "top" => Vertical::Top,
            "center" => Vertical::Center,
            "bottom" => Vertical::Bottom,
            _ => return Err(unknown()),
        };
        let horizontal = match h {
            "left" => Horizontal::Left,
            "center" => Horizontal::Center,
            "right" => Horizontal::Right,
            _ => return Err(unknown()),
        };

        let tag = Self::new(vertical, horizontal);
        // The middle cell only has one spelling
        if tag.is_straight_ahead() {
            return Err(unknown());
        }
        Ok(tag)
    }
}

/// Classify a box into a bearing for a frame of the given size
pub fn get_position(bbox: &BoundingBox, frame_width: f64, frame_height: f64) -> PositionTag {
    PositionTag::classify(bbox, frame_width, frame_height)
}

/// Per-frame view of a detection used by the navigation advisor
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDetection {
    pub label: String,
    pub position: PositionTag,
    /// Estimated distance in meters, always > 0
    pub distance: f64,
}

impl FrameDetection {
    pub fn new(label: impl Into<String>, position: PositionTag, distance: f64) -> Self {
        Self {
            label: label.into(),
            position,
            distance,
        }
    }

    /// Derive bearing and distance for a detection in one step
    pub fn from_detection(
        detection: &Detection,
        frame: FrameSize,
        estimator: &DistanceEstimator,
    ) -> Self {
        let position = get_position(
            &detection.bbox,
            f64::from(frame.width),
            f64::from(frame.height),
        );
        let distance = estimator.estimate(&detection.bbox, &detection.label, f64::from(frame.height));

        Self {
            label: detection.label.clone(),
            position,
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn centered_box(cx: f64, cy: f64) -> BoundingBox {
        BoundingBox::new(cx - 10.0, cy - 10.0, cx + 10.0, cy + 10.0)
    }

    #[test]
    fn test_box_corners_are_ordered() {
        let bbox = BoundingBox::new(50.0, 80.0, 10.0, 20.0);
        assert_eq!(bbox.x1, 10.0);
        assert_eq!(bbox.y1, 20.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 60.0);
    }

    #[test]
    fn test_position_grid() {
        let cases = [
            ((50.0, 50.0), "top left"),
            ((320.0, 50.0), "top center"),
            ((600.0, 50.0), "top right"),
            ((50.0, 320.0), "center left"),
            ((320.0, 320.0), "straight ahead"),
            ((600.0, 320.0), "center right"),
            ((50.0, 600.0), "bottom left"),
            ((320.0, 600.0), "bottom center"),
            ((600.0, 600.0), "bottom right"),
        ];

        for ((cx, cy), expected) in cases {
            let tag = get_position(&centered_box(cx, cy), 640.0, 640.0);
            assert_eq!(tag.to_string(), expected, "centroid ({}, {})", cx, cy);
        }
    }

    #[test]
    fn test_threshold_boundaries_are_center() {
        // Exactly on a boundary falls into the center bucket
        let tag = get_position(&centered_box(33.0, 67.0), 100.0, 100.0);
        assert_eq!(tag, PositionTag::STRAIGHT_AHEAD);
    }

    #[test]
    fn test_position_predicates() {
        let center_left: PositionTag = "center left".parse().unwrap();
        assert!(center_left.mentions_center());
        assert!(center_left.mentions_left());
        assert!(!center_left.mentions_right());

        assert!(PositionTag::STRAIGHT_AHEAD.mentions_center());

        let bottom_right: PositionTag = "bottom right".parse().unwrap();
        assert!(!bottom_right.mentions_center());
        assert!(bottom_right.mentions_right());
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("center center".parse::<PositionTag>().is_err());
        assert!("left".parse::<PositionTag>().is_err());
        assert!("middle left".parse::<PositionTag>().is_err());
    }

    #[test]
    fn test_frame_detection_from_detection() {
        let detection = Detection::new(BoundingBox::new(270.0, 150.0, 370.0, 550.0), "person", 0.9);
        let fd = FrameDetection::from_detection(
            &detection,
            FrameSize::new(640, 640),
            &DistanceEstimator::default(),
        );

        assert_eq!(fd.label, "person");
        assert_eq!(fd.position, PositionTag::STRAIGHT_AHEAD);
        assert_eq!(fd.distance, 3.4);
    }

    proptest! {
        #[test]
        fn prop_centroid_at_middle_is_straight_ahead(
            w in 1.0f64..4000.0,
            h in 1.0f64..4000.0,
            half_w in 0.0f64..500.0,
            half_h in 0.0f64..500.0,
        ) {
            let (cx, cy) = (0.5 * w, 0.5 * h);
            let bbox = BoundingBox::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h);
            prop_assert_eq!(get_position(&bbox, w, h).to_string(), "straight ahead");
        }

        #[test]
        fn prop_rendered_tag_round_trips(cx in 0.0f64..640.0, cy in 0.0f64..480.0) {
            let tag = get_position(&centered_box(cx, cy), 640.0, 480.0);
            let parsed: PositionTag = tag.to_string().parse().unwrap();
            prop_assert_eq!(parsed, tag);
        }
    }
}
