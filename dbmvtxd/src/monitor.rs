//! Transceiver monitor thread
//!
//! Presence polling blocks, so it runs on a dedicated OS thread that calls
//! `wait_for_change` in bounded rounds and checks a stop flag between rounds.
//! Detected changes go into a bounded in-memory log that the REST API reads.

use dbmvtx_core::api::SfpEventRecord;
use dbmvtx_core::PortEvents;
use dbmvtx_hardware::xcvr::POLL_INTERVAL;
use dbmvtx_hardware::TransceiverMonitor;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Wait used when the configured one would block the thread forever
const DEFAULT_ROUND_MS: i64 = 1000;

/// Most recent transceiver events, oldest first
#[derive(Debug)]
pub(crate) struct EventLog {
    capacity: usize,
    events: Mutex<VecDeque<SfpEventRecord>>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a batch of changes, dropping the oldest entries beyond capacity
    pub fn record(&self, changes: &PortEvents, timestamp_ms: u64) {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (&port, &event) in changes {
            events.push_back(SfpEventRecord {
                timestamp_ms,
                port,
                event,
            });
        }
        while events.len() > self.capacity {
            events.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<SfpEventRecord> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Handle to the running monitor thread
pub(crate) struct MonitorHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Ask the thread to stop after its current round and wait for it
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Transceiver monitor thread panicked");
            }
        }
        info!("Transceiver monitor stopped");
    }
}

/// Start polling on a dedicated thread.
///
/// `round_ms` bounds each blocking wait and therefore how long `stop` takes.
pub(crate) fn spawn(
    mut monitor: TransceiverMonitor,
    log: Arc<EventLog>,
    round_ms: i64,
) -> std::io::Result<MonitorHandle> {
    let round_ms = if round_ms > 0 {
        round_ms
    } else {
        warn!(
            "monitor.poll_timeout_ms must be positive, got {}; using {}",
            round_ms, DEFAULT_ROUND_MS
        );
        DEFAULT_ROUND_MS
    };

    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = stop.clone();

    let thread = thread::Builder::new()
        .name("xcvr-monitor".to_string())
        .spawn(move || {
            info!(
                "Transceiver monitor started ({} ports, {}ms rounds)",
                monitor.num_ports(),
                round_ms
            );
            while !thread_stop.load(Ordering::SeqCst) {
                let (ok, events) = monitor.wait_for_change(round_ms);
                if !ok {
                    warn!("Transceiver change detection failed, retrying");
                    thread::sleep(POLL_INTERVAL);
                    continue;
                }
                if !events.is_empty() {
                    debug!("Recording {} transceiver events", events.len());
                    log.record(&events, now_ms());
                }
            }
        })?;

    Ok(MonitorHandle {
        stop,
        thread: Some(thread),
    })
}
