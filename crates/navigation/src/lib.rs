//! Navigation Advisor
//!
//! Reduces every detection in a frame to one spoken recommendation:
//! - Stop when something sits in the central corridor within reach
//! - Steer toward whichever side is free of close obstacles
//! - Otherwise mention the nearest object, or confirm the path is good

mod advisor;

pub use advisor::{get_navigation_summary, AdvisorConfig, Advisory, NavigationAdvisor, Steering};
