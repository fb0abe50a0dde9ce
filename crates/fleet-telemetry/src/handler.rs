use fleet_core::telemetry_sample::TelemetrySample;

use crate::sample::TelemetryEvent;

/// The coordinator side of the telemetry worker. Implemented by
/// `fleet-coordinator`, which owns the live vehicle table and the
/// event-reaction table (§4.6) — kept as a trait rather than a callback
/// closure so this crate never depends on the coordinator.
pub trait TelemetryHandler: Send + Sync {
    /// Apply `sample`'s location/battery/temperature to the live vehicle
    /// under its internal state lock. Returns `false` if the vehicle no
    /// longer exists, in which case classification is skipped.
    fn apply_sample(&self, vehicle_id: &str, sample: &TelemetrySample) -> bool;

    /// React to one classified event, under the vehicle's per-vehicle
    /// mutex.
    fn on_event(&self, vehicle_id: &str, event: TelemetryEvent);
}
