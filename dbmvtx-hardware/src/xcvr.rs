//! Transceiver presence and insertion/removal detection
//!
//! The monitor keeps the presence of every port from its previous poll and
//! reports only the ports whose presence changed since. The first poll
//! records a baseline and reports nothing.

use dbmvtx_core::{PortEvents, PresenceCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::inventory::Inventory;

/// Granularity of the blocking wait
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A front-panel transceiver port
#[derive(Clone)]
pub struct Sfp {
    port: usize,
    inventory: Arc<dyn Inventory>,
}

impl Sfp {
    /// Port with 0-based `port` index
    pub fn new(inventory: Arc<dyn Inventory>, port: usize) -> Self {
        Self { port, inventory }
    }

    pub fn port(&self) -> usize {
        self.port
    }

    pub fn name(&self) -> String {
        format!("Sfp{}", self.port)
    }

    /// Whether a module is plugged in; read failures count as absent
    pub fn presence(&self) -> bool {
        match self.inventory.sfp_presence(self.port) {
            Ok(present) => present,
            Err(e) => {
                warn!("Failed to read presence of port {}: {}", self.port, e);
                false
            }
        }
    }
}

impl std::fmt::Debug for Sfp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sfp").field("port", &self.port).finish()
    }
}

/// Polls transceiver presence and reports changes
pub struct TransceiverMonitor {
    sfps: Vec<Sfp>,
    last_snapshot: PortEvents,
    clock: Arc<dyn Clock>,
}

impl TransceiverMonitor {
    pub fn new(sfps: Vec<Sfp>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sfps,
            last_snapshot: PortEvents::new(),
            clock,
        }
    }

    /// Monitor for ports `0..num_ports` of an inventory
    pub fn for_inventory(
        inventory: Arc<dyn Inventory>,
        num_ports: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sfps = (0..num_ports)
            .map(|port| Sfp::new(inventory.clone(), port))
            .collect();
        Self::new(sfps, clock)
    }

    pub fn num_ports(&self) -> usize {
        self.sfps.len()
    }

    /// Presence of every port as of the last poll
    pub fn snapshot(&self) -> &PortEvents {
        &self.last_snapshot
    }

    fn sample(&self) -> PortEvents {
        self.sfps
            .iter()
            .map(|sfp| (sfp.port(), PresenceCode::from_present(sfp.presence())))
            .collect()
    }

    /// Sample every port once and return the ports that changed
    pub fn poll_once(&mut self) -> PortEvents {
        let current = self.sample();

        if self.last_snapshot.is_empty() {
            debug!("Recorded presence baseline for {} ports", current.len());
            self.last_snapshot = current;
            return PortEvents::new();
        }

        if current == self.last_snapshot {
            return PortEvents::new();
        }

        let changed: PortEvents = current
            .iter()
            .filter(|(port, code)| self.last_snapshot.get(*port) != Some(*code))
            .map(|(port, code)| (*port, *code))
            .collect();
        self.last_snapshot = current;

        for (port, code) in &changed {
            info!("Transceiver on port {} {}", port, code);
        }
        changed
    }

    /// Block until a port changes or the timeout expires.
    ///
    /// - `timeout_ms == 0` waits forever.
    /// - `timeout_ms > 0` returns `(true, {})` once the timeout elapses
    ///   without a change.
    /// - `timeout_ms < 0` returns `(false, {})` without polling.
    pub fn wait_for_change(&mut self, timeout_ms: i64) -> (bool, PortEvents) {
        if timeout_ms < 0 {
            warn!("Invalid change event timeout: {}", timeout_ms);
            return (false, PortEvents::new());
        }

        let deadline = if timeout_ms == 0 {
            None
        } else {
            match self
                .clock
                .now()
                .checked_add(Duration::from_millis(timeout_ms as u64))
            {
                Some(deadline) => Some(deadline),
                None => {
                    warn!("Change event timeout overflows the clock: {}", timeout_ms);
                    return (false, PortEvents::new());
                }
            }
        };

        loop {
            let events = self.poll_once();
            if !events.is_empty() {
                return (true, events);
            }

            let Some(deadline) = deadline else {
                self.clock.sleep(POLL_INTERVAL);
                continue;
            };

            let remaining = deadline.saturating_duration_since(self.clock.now());
            if remaining >= POLL_INTERVAL {
                self.clock.sleep(POLL_INTERVAL);
            } else {
                if !remaining.is_zero() {
                    self.clock.sleep(remaining);
                }
                return (true, PortEvents::new());
            }
        }
    }
}

impl std::fmt::Debug for TransceiverMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransceiverMonitor")
            .field("num_ports", &self.sfps.len())
            .field("last_snapshot", &self.last_snapshot)
            .finish()
    }
}
