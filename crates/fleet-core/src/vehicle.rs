//! Vehicle entity and its kind-specific attributes.
//!
//! Redesigned per spec as a tagged variant (`VehicleKind`) rather than a
//! class hierarchy: only mopeds carry `helmet_detected`, and policies match
//! on the variant tag instead of downcasting.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::state_machine::VehicleState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Bicycle,
    Scooter,
    Moped,
}

/// A single vehicle in the fleet. `state` is mutated only through
/// `fleet-coordinator`'s per-vehicle mutex region; everything else here is
/// a plain data holder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub kind: VehicleKind,
    pub city: String,
    pub location: Coordinate,
    pub battery_percent: u8,
    pub temperature_c: f64,
    pub state: VehicleState,
    /// Only meaningful for `VehicleKind::Moped`; ignored otherwise.
    pub helmet_detected: bool,
}

impl Vehicle {
    pub fn new(
        id: impl Into<String>,
        kind: VehicleKind,
        city: impl Into<String>,
        location: Coordinate,
        battery_percent: u8,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            city: city.into(),
            location,
            battery_percent,
            temperature_c: 20.0,
            state: VehicleState::Available,
            helmet_detected: false,
        }
    }
}
