use crossbeam_channel::{bounded, Receiver, Sender};
use fleet_core::error::FleetError;

use crate::sample::QueuedSample;

/// Fixed at 50,000 per §4.5/§5 — producers block on a full queue rather
/// than dropping samples.
pub const QUEUE_CAPACITY: usize = 50_000;

/// Producer handle onto the bounded telemetry queue. Cheaply `Clone`-able;
/// shared across every request-handling thread that submits telemetry.
#[derive(Clone)]
pub struct TelemetryQueue {
    sender: Sender<QueuedSample>,
}

impl TelemetryQueue {
    /// Construct the bounded channel, returning the producer handle and
    /// the receiver the worker thread consumes from.
    pub fn bounded() -> (Self, Receiver<QueuedSample>) {
        let (sender, receiver) = bounded(QUEUE_CAPACITY);
        (Self { sender }, receiver)
    }

    /// Block until there is room, then enqueue. Only fails once the worker
    /// side has been dropped.
    pub fn submit(&self, item: QueuedSample) -> Result<(), FleetError> {
        self.sender
            .send(item)
            .map_err(|e| FleetError::Other(format!("telemetry queue closed: {e}")))
    }
}
