//! Navigation Advisor Implementation

use serde::{Deserialize, Serialize};
use spatial::{format_distance, FrameDetection, PositionTag};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Advisor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Central obstacles closer than this stop the user (meters)
    pub critical_distance_m: f64,
    /// A side is blocked by any obstacle closer than this (meters)
    pub side_clearance_m: f64,
    /// Nearest obstacle is mentioned when closer than this (meters)
    pub nearby_distance_m: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            critical_distance_m: 2.0,
            side_clearance_m: 2.0,
            nearby_distance_m: 3.0,
        }
    }
}

/// Suggested way around a critical obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steering {
    /// Both sides clear
    Either,
    Left,
    Right,
    /// Both sides blocked
    Blocked,
}

impl Steering {
    fn from_clearance(left_clear: bool, right_clear: bool) -> Self {
        match (left_clear, right_clear) {
            (true, true) => Steering::Either,
            (true, false) => Steering::Left,
            (false, true) => Steering::Right,
            (false, false) => Steering::Blocked,
        }
    }
}

impl Display for Steering {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Steering::Either => write!(f, "You can turn either left or right to avoid it."),
            Steering::Left => write!(
                f,
                "The path to your left appears clearer. Try moving left."
            ),
            Steering::Right => write!(
                f,
                "The path to your right appears clearer. Try moving right."
            ),
            Steering::Blocked => write!(
                f,
                "You are surrounded by obstacles. Please proceed with extreme caution or wait for assistance."
            ),
        }
    }
}

/// The single recommendation produced for a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Nothing detected at all
    Clear,

    /// Obstacle in the central corridor within critical distance
    Stop {
        label: String,
        distance: f64,
        steering: Steering,
    },

    /// No critical obstacle, but the nearest one is close
    Nearby {
        label: String,
        distance: f64,
        position: PositionTag,
    },

    /// Everything detected is far away
    PathGood,
}

impl Advisory {
    /// Check if the user must stop
    pub fn is_critical(&self) -> bool {
        matches!(self, Advisory::Stop { .. })
    }
}

impl Display for Advisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::Clear => write!(
                f,
                "The path ahead is completely clear. You can proceed safely."
            ),
            Advisory::Stop {
                label,
                distance,
                steering,
            } => write!(
                f,
                "Stop! {} is directly in front of you, only {} away. {}",
                label,
                format_distance(*distance),
                steering
            ),
            Advisory::Nearby {
                label,
                distance,
                position,
            } => write!(
                f,
                "The path is mostly clear, but there is {} about {} away on your {}.",
                label,
                format_distance(*distance),
                position
            ),
            Advisory::PathGood => write!(
                f,
                "The path ahead looks good. No immediate obstacles detected."
            ),
        }
    }
}

/// Hazard prioritization over one frame's detections
#[derive(Debug, Clone, Default)]
pub struct NavigationAdvisor {
    config: AdvisorConfig,
}

impl NavigationAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Produce the advisory for a frame.
    ///
    /// When several central obstacles are critical, the first one in input
    /// order is reported, not the nearest.
    pub fn advise(&self, detections: &[FrameDetection]) -> Advisory {
        if detections.is_empty() {
            return Advisory::Clear;
        }

        let critical = detections
            .iter()
            .filter(|d| d.position.mentions_center())
            .find(|d| d.distance < self.config.critical_distance_m);

        if let Some(obstacle) = critical {
            let left_clear = !detections
                .iter()
                .any(|d| d.position.mentions_left() && d.distance < self.config.side_clearance_m);
            let right_clear = !detections
                .iter()
                .any(|d| d.position.mentions_right() && d.distance < self.config.side_clearance_m);

            debug!(
                "Critical obstacle '{}' at {:.2}m (left_clear={}, right_clear={})",
                obstacle.label, obstacle.distance, left_clear, right_clear
            );

            return Advisory::Stop {
                label: obstacle.label.clone(),
                distance: obstacle.distance,
                steering: Steering::from_clearance(left_clear, right_clear),
            };
        }

        // First minimum wins on ties
        let nearest = detections.iter().fold(&detections[0], |best, d| {
            if d.distance < best.distance {
                d
            } else {
                best
            }
        });

        if nearest.distance < self.config.nearby_distance_m {
            Advisory::Nearby {
                label: nearest.label.clone(),
                distance: nearest.distance,
                position: nearest.position,
            }
        } else {
            Advisory::PathGood
        }
    }
}

/// Advisory sentence for a frame using the default thresholds
pub fn get_navigation_summary(detections: &[FrameDetection]) -> String {
    NavigationAdvisor::default().advise(detections).to_string()
}
