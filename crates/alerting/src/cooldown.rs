//! Per-key alert debouncing

use spatial::PositionTag;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Debounce bucket for object alerts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub label: String,
    pub position: PositionTag,
}

impl AlertKey {
    pub fn new(label: impl Into<String>, position: PositionTag) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

impl Display for AlertKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.label, self.position)
    }
}

/// Last admitted time per alert key.
///
/// Entries live as long as the table and are never evicted; the key space is
/// bounded by object classes times nine positions.
#[derive(Debug, Clone)]
pub struct CooldownTable {
    window: Duration,
    last_admitted: HashMap<AlertKey, Instant>,
}

impl CooldownTable {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: HashMap::new(),
        }
    }

    /// Decide whether an alert submitted at `at` may be spoken, recording it
    /// if so. Timestamps per key only move forward.
    pub fn admit(&mut self, key: &AlertKey, at: Instant) -> bool {
        if let Some(last) = self.last_admitted.get(key) {
            if at.saturating_duration_since(*last) < self.window {
                return false;
            }
        }

        let last = self.last_admitted.entry(key.clone()).or_insert(at);
        if at > *last {
            *last = at;
        }
        true
    }

    /// Last admitted time for a key
    pub fn last_admitted(&self, key: &AlertKey) -> Option<Instant> {
        self.last_admitted.get(key).copied()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.last_admitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_admitted.is_empty()
    }
}
