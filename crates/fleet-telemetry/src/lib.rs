//! Bounded telemetry ingress, single-consumer worker, threshold
//! classification. The worker never touches the live vehicle table or the
//! audit log directly — it drives `fleet-coordinator` through the
//! `TelemetryHandler` trait.

pub mod handler;
pub mod queue;
pub mod sample;
pub mod worker;

pub use handler::TelemetryHandler;
pub use queue::{TelemetryQueue, QUEUE_CAPACITY};
pub use sample::{classify, QueuedSample, TelemetryEvent};
pub use worker::TelemetryWorker;
