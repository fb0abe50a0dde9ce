use std::sync::Arc;

use dashmap::DashMap;
use fleet_core::vehicle::Vehicle;
use parking_lot::Mutex;

/// The authoritative in-memory vehicle table. Each vehicle is guarded by
/// its own "internal state lock" (§5) — finer-grained than the per-vehicle
/// mutex in `locks.rs`, and the only thing direct attribute writes
/// (telemetry application, force-state) ever take. This lock may be held
/// while the per-vehicle mutex is held, never the other way around.
pub struct VehicleTable {
    vehicles: DashMap<String, Arc<Mutex<Vehicle>>>,
}

impl VehicleTable {
    pub fn new() -> Self {
        Self { vehicles: DashMap::new() }
    }

    pub fn seed(&self, vehicle: Vehicle) {
        self.vehicles.insert(vehicle.id.clone(), Arc::new(Mutex::new(vehicle)));
    }

    /// A cheap clone of the vehicle's current state.
    pub fn snapshot(&self, vehicle_id: &str) -> Option<Vehicle> {
        self.vehicles.get(vehicle_id).map(|entry| entry.lock().clone())
    }

    /// Mutate the vehicle under its internal lock, returning the
    /// closure's result, or `None` if the vehicle doesn't exist.
    pub fn mutate<R>(&self, vehicle_id: &str, f: impl FnOnce(&mut Vehicle) -> R) -> Option<R> {
        self.vehicles.get(vehicle_id).map(|entry| f(&mut entry.lock()))
    }

    pub fn all(&self) -> Vec<Vehicle> {
        self.vehicles.iter().map(|entry| entry.lock().clone()).collect()
    }
}

impl Default for VehicleTable {
    fn default() -> Self {
        Self::new()
    }
}
