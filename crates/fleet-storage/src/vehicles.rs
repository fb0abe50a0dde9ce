//! CSV adapter for `data/vehicles.csv`.
//!
//! Header: `id,type,state,batteryPercent,temperatureC,lat,lon,city`. The
//! fixed header carries no helmet column, so `helmet_detected` does not
//! round-trip — it is transient, telemetry-derived state and comes back
//! `false` on reload.

use std::path::{Path, PathBuf};

use fleet_core::error::FleetError;
use fleet_core::geo::Coordinate;
use fleet_core::state_machine::VehicleState;
use fleet_core::vehicle::{Vehicle, VehicleKind};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::csv_util;

#[derive(Serialize, Deserialize)]
struct VehicleRow {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    state: String,
    #[serde(rename = "batteryPercent")]
    battery_percent: u8,
    #[serde(rename = "temperatureC")]
    temperature_c: f64,
    lat: f64,
    lon: f64,
    city: String,
}

fn kind_to_str(kind: VehicleKind) -> &'static str {
    match kind {
        VehicleKind::Bicycle => "Bicycle",
        VehicleKind::Scooter => "ElectricScooter",
        VehicleKind::Moped => "Moped",
    }
}

fn kind_from_str(s: &str) -> Result<VehicleKind, FleetError> {
    match s {
        "Bicycle" => Ok(VehicleKind::Bicycle),
        "ElectricScooter" => Ok(VehicleKind::Scooter),
        "Moped" => Ok(VehicleKind::Moped),
        other => Err(FleetError::Storage(format!("unknown vehicle type '{other}'"))),
    }
}

fn state_to_str(state: VehicleState) -> &'static str {
    match state {
        VehicleState::Available => "AVAILABLE",
        VehicleState::Reserved => "RESERVED",
        VehicleState::InUse => "IN_USE",
        VehicleState::Maintenance => "MAINTENANCE",
        VehicleState::EmergencyLock => "EMERGENCY_LOCK",
        VehicleState::Relocating => "RELOCATING",
    }
}

fn state_from_str(s: &str) -> Result<VehicleState, FleetError> {
    match s {
        "AVAILABLE" => Ok(VehicleState::Available),
        "RESERVED" => Ok(VehicleState::Reserved),
        "IN_USE" => Ok(VehicleState::InUse),
        "MAINTENANCE" => Ok(VehicleState::Maintenance),
        "EMERGENCY_LOCK" => Ok(VehicleState::EmergencyLock),
        "RELOCATING" => Ok(VehicleState::Relocating),
        other => Err(FleetError::Storage(format!("unknown vehicle state '{other}'"))),
    }
}

impl VehicleRow {
    fn from_vehicle(v: &Vehicle) -> Self {
        Self {
            id: v.id.clone(),
            kind: kind_to_str(v.kind).to_string(),
            state: state_to_str(v.state).to_string(),
            battery_percent: v.battery_percent,
            temperature_c: v.temperature_c,
            lat: v.location.lat,
            lon: v.location.lon,
            city: v.city.clone(),
        }
    }

    fn into_vehicle(self) -> Result<Vehicle, FleetError> {
        Ok(Vehicle {
            id: self.id,
            kind: kind_from_str(&self.kind)?,
            city: self.city,
            location: Coordinate::new(self.lat, self.lon),
            battery_percent: self.battery_percent,
            temperature_c: self.temperature_c,
            state: state_from_str(&self.state)?,
            helmet_detected: false,
        })
    }
}

/// CSV-backed store for the vehicle fleet.
pub struct VehicleStore {
    path: PathBuf,
    // Guards the read-modify-write in `save_one`. Distinct vehicles can be
    // persisted concurrently (fleet-coordinator's per-vehicle locking
    // allows it), but they all rewrite the same file, so the
    // read-all/rewrite-all has to be one atomic step, not two.
    write_lock: Mutex<()>,
}

impl VehicleStore {
    pub fn open(data_dir: &Path) -> Self {
        Self { path: data_dir.join("vehicles.csv"), write_lock: Mutex::new(()) }
    }

    pub fn load_all(&self) -> Result<Vec<Vehicle>, FleetError> {
        csv_util::read_all::<VehicleRow>(&self.path)?
            .into_iter()
            .map(VehicleRow::into_vehicle)
            .collect()
    }

    pub fn save_all(&self, vehicles: &[Vehicle]) -> Result<(), FleetError> {
        let rows: Vec<VehicleRow> = vehicles.iter().map(VehicleRow::from_vehicle).collect();
        csv_util::write_all(&self.path, &rows)
    }

    /// Insert or replace the row for `vehicle.id`, rewriting the whole file.
    pub fn save_one(&self, vehicle: &Vehicle) -> Result<(), FleetError> {
        let _guard = self.write_lock.lock();
        let mut all = self.load_all()?;
        match all.iter_mut().find(|v| v.id == vehicle.id) {
            Some(slot) => *slot = vehicle.clone(),
            None => all.push(vehicle.clone()),
        }
        self.save_all(&all)
    }

    pub fn find(&self, id: &str) -> Result<Option<Vehicle>, FleetError> {
        Ok(self.load_all()?.into_iter().find(|v| v.id == id))
    }
}
