use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

/// The per-vehicle mutex map: the only coarse critical section (§5). All
/// state-machine transitions and audits tied to a vehicle occur under the
/// mutex this returns. Entries are created on first use and never removed.
pub struct VehicleLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl VehicleLocks {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    /// Get or lazily create the mutex for `vehicle_id`.
    pub fn get(&self, vehicle_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(vehicle_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl Default for VehicleLocks {
    fn default() -> Self {
        Self::new()
    }
}
