//! Alerting System
//!
//! Serializes spoken announcements onto one audio channel:
//! - Per-object alerts, debounced per (label, position)
//! - Navigation summaries, always delivered
//! - Drain-then-stop shutdown

mod cooldown;
mod dispatcher;
mod speech;

pub use cooldown::{AlertKey, CooldownTable};
pub use dispatcher::{alert_text, AlertDispatcher, DispatchStats, DispatcherConfig};
pub use speech::{SpeechError, SpeechRenderer};
