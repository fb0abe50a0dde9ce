use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A single telemetry reading from a vehicle. Policies that inspect the
/// sample (notably Milan's helmet check) honour either this sample's
/// `helmet_present` or the vehicle's own `helmet_detected` field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub gps: Coordinate,
    pub battery_percent: u8,
    pub temperature_c: f64,
    pub helmet_present: bool,
}
