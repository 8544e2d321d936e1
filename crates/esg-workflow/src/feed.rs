//! Periodic telemetry registration.
//!
//! [`Feed`] registers one sample as soon as it starts and another every
//! interval until stopped. Each tick runs as its own task, so a slow or
//! failing registration never delays the next one and completions may
//! arrive out of order. Outcomes are fanned out on a broadcast channel.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::workflow::{FeedEntry, Workflow};

pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_secs(60);

const EVENT_CAPACITY: usize = 64;

/// Outcome of one feed tick.
#[derive(Clone, Debug)]
pub enum FeedEvent {
    Registered(FeedEntry),
    Failed(String),
}

/// Start/stop handle for the telemetry feed.
pub struct Feed {
    workflow: Workflow,
    interval: Duration,
    events: broadcast::Sender<FeedEvent>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Feed {
    pub fn new(workflow: Workflow, interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            workflow,
            interval,
            events,
            ticker: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Start ticking. Returns `false` if the feed was already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut ticker = self.ticker.lock().unwrap_or_else(|e| e.into_inner());
        if ticker.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("feed already running");
            return false;
        }
        let workflow = self.workflow.clone();
        let events = self.events.clone();
        let period = self.interval;
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tokio::spawn(tick(workflow.clone(), events.clone()));
            }
        }));
        info!(interval_secs = period.as_secs(), "telemetry feed started");
        true
    }

    /// Stop scheduling ticks. In-flight registrations still complete.
    /// Returns `false` if the feed was not running.
    pub fn stop(&self) -> bool {
        let handle = self.ticker.lock().unwrap_or_else(|e| e.into_inner()).take();
        match handle {
            Some(h) => {
                h.abort();
                info!("telemetry feed stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick(workflow: Workflow, events: broadcast::Sender<FeedEvent>) {
    let event = match workflow.push_telemetry().await {
        Ok(entry) => {
            info!(ts = %entry.sample.ts, id = %entry.id.short_hex(), "telemetry registered");
            FeedEvent::Registered(entry)
        }
        Err(e) => {
            warn!(error = %e, "telemetry registration failed");
            FeedEvent::Failed(e.to_string())
        }
    };
    // No subscribers is fine; the log line above is the record.
    let _ = events.send(event);
}
