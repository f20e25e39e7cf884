//! Alert Dispatcher Implementation

use serde::{Deserialize, Serialize};
use spatial::PositionTag;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cooldown::{AlertKey, CooldownTable};
use crate::speech::SpeechRenderer;

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Minimum spacing between alerts for the same (label, position) (seconds)
    pub cooldown_seconds: f64,
    /// How long `stop` waits for the worker to exit after draining (seconds)
    pub join_timeout_seconds: f64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 3.0,
            join_timeout_seconds: 2.0,
        }
    }
}

impl DispatcherConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown_seconds).unwrap_or(Duration::ZERO)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.join_timeout_seconds).unwrap_or(Duration::ZERO)
    }
}

/// Unit of work for the worker, processed strictly in submission order
#[derive(Debug)]
enum SpeechRequest {
    /// Object alert, subject to cooldown
    Alert {
        key: AlertKey,
        text: String,
        submitted_at: Instant,
    },
    /// Navigation summary, never suppressed
    Summary { text: String },
    /// Acknowledged once everything queued before it has been handled
    Barrier(oneshot::Sender<()>),
    /// Terminate the worker
    Stop,
}

/// Dispatcher counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Alerts and summaries accepted for dispatch
    pub submitted: u64,
    /// Requests rendered successfully
    pub spoken: u64,
    /// Alerts dropped by the cooldown
    pub suppressed: u64,
    /// Requests whose rendering failed
    pub failed: u64,
}

impl DispatchStats {
    /// Requests not yet handled by the worker
    pub fn pending(&self) -> u64 {
        self.submitted
            .saturating_sub(self.spoken + self.suppressed + self.failed)
    }
}

/// State shared between the handle and the worker
#[derive(Debug, Default)]
struct Shared {
    speaking: AtomicBool,
    submitted: AtomicU64,
    spoken: AtomicU64,
    suppressed: AtomicU64,
    failed: AtomicU64,
}

impl Shared {
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            submitted: self.submitted.load(Ordering::Acquire),
            spoken: self.spoken.load(Ordering::Acquire),
            suppressed: self.suppressed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
        }
    }
}

/// Spoken text for an object alert
pub fn alert_text(label: &str, position: PositionTag, distance: f64) -> String {
    let distance_text = if distance >= 1.0 {
        format!("{:.1} meters", distance)
    } else {
        format!("{} centimeters", (distance * 100.0).trunc() as i64)
    };

    let text = format!("{} at {}, {} away.", label, position, distance_text);
    if distance < 1.0 {
        format!("Warning! {}", text)
    } else {
        text
    }
}

/// Handle to the background speech worker.
///
/// Submissions never wait on speech. Dropping the handle without `stop`
/// closes the queue; the worker finishes what is queued and exits.
pub struct AlertDispatcher {
    tx: mpsc::UnboundedSender<SpeechRequest>,
    worker: JoinHandle<()>,
    shared: Arc<Shared>,
    config: DispatcherConfig,
}

impl AlertDispatcher {
    /// Start the worker on the current tokio runtime
    pub fn spawn(config: DispatcherConfig, renderer: Arc<dyn SpeechRenderer>) -> Self {
        info!("Creating alert dispatcher with config: {:?}", config);

        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::default());

        let worker = Worker {
            rx,
            renderer,
            cooldown: CooldownTable::new(config.cooldown()),
            shared: Arc::clone(&shared),
        };

        Self {
            tx,
            worker: tokio::spawn(worker.run()),
            shared,
            config,
        }
    }

    /// Queue an object alert. Dropped by the worker if the same
    /// (label, position) was admitted less than one cooldown before this call.
    pub fn add_alert(&self, label: &str, position: PositionTag, distance: f64) {
        let request = SpeechRequest::Alert {
            key: AlertKey::new(label, position),
            text: alert_text(label, position, distance),
            submitted_at: Instant::now(),
        };
        self.submit(request);
    }

    /// Queue a navigation summary
    pub fn speak_summary(&self, text: &str) {
        self.submit(SpeechRequest::Summary {
            text: format!("Summary: {}", text),
        });
    }

    fn submit(&self, request: SpeechRequest) {
        self.shared.submitted.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(request).is_err() {
            self.shared.submitted.fetch_sub(1, Ordering::AcqRel);
            warn!("Alert dispatcher worker is gone, dropping request");
        }
    }

    /// Wait until everything submitted so far has been handled
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(SpeechRequest::Barrier(ack_tx)).is_err() {
            return;
        }
        // A closed ack means the worker exited; nothing is left to wait for
        let _ = ack_rx.await;
    }

    /// Check if the worker is currently rendering speech
    pub fn is_speaking(&self) -> bool {
        self.shared.speaking.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> DispatchStats {
        self.shared.snapshot()
    }

    /// Drain the queue, then stop the worker.
    ///
    /// Every request submitted before this call is delivered first. A worker
    /// that does not exit within the join timeout is abandoned with a warning.
    pub async fn stop(self) -> DispatchStats {
        info!("Stopping alert dispatcher");
        self.flush().await;

        let _ = self.tx.send(SpeechRequest::Stop);
        match timeout(self.config.join_timeout(), self.worker).await {
            Ok(Ok(())) => debug!("Alert dispatcher worker joined"),
            Ok(Err(e)) => warn!("Alert dispatcher worker failed: {}", e),
            Err(_) => warn!(
                "Alert dispatcher worker did not stop within {:?}",
                self.config.join_timeout()
            ),
        }

        let stats = self.shared.snapshot();
        info!(
            "Alert dispatcher stopped (spoken={}, suppressed={}, failed={})",
            stats.spoken, stats.suppressed, stats.failed
        );
        stats
    }
}

/// The single consumer of the speech queue
struct Worker {
    rx: mpsc::UnboundedReceiver<SpeechRequest>,
    renderer: Arc<dyn SpeechRenderer>,
    cooldown: CooldownTable,
    shared: Arc<Shared>,
}

impl Worker {
    async fn run(mut self) {
        debug!("Alert dispatcher worker started");

        while let Some(request) = self.rx.recv().await {
            match request {
                SpeechRequest::Alert {
                    key,
                    text,
                    submitted_at,
                } => {
                    if !self.cooldown.admit(&key, submitted_at) {
                        debug!("Alert suppressed: {} in cooldown period", key);
                        self.shared.suppressed.fetch_add(1, Ordering::AcqRel);
                        metrics::counter!("wayfinder_alerts_suppressed_total").increment(1);
                        continue;
                    }
                    speak(&self.renderer, &self.shared, text).await;
                }
                SpeechRequest::Summary { text } => {
                    speak(&self.renderer, &self.shared, text).await;
                }
                SpeechRequest::Barrier(ack) => {
                    let _ = ack.send(());
                }
                SpeechRequest::Stop => break,
            }
        }

        debug!("Alert dispatcher worker stopped");
    }
}

/// Render one request on the blocking pool, holding the speaking flag
async fn speak(renderer: &Arc<dyn SpeechRenderer>, shared: &Shared, text: String) {
    debug!("Speaking: {}", text);
    shared.speaking.store(true, Ordering::Release);

    let renderer = Arc::clone(renderer);
    let result = tokio::task::spawn_blocking(move || renderer.render(&text)).await;

    shared.speaking.store(false, Ordering::Release);

    match result {
        Ok(Ok(())) => {
            shared.spoken.fetch_add(1, Ordering::AcqRel);
            metrics::counter!("wayfinder_alerts_spoken_total").increment(1);
        }
        Ok(Err(e)) => {
            shared.failed.fetch_add(1, Ordering::AcqRel);
            warn!("Speech rendering failed: {}", e);
        }
        Err(e) => {
            shared.failed.fetch_add(1, Ordering::AcqRel);
            warn!("Speech rendering task aborted: {}", e);
        }
    }
}
