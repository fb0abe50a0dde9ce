use dashmap::DashMap;
use fleet_core::state_machine::VehicleState;

/// Ephemeral `vehicle_id -> last stable VehicleState` map (§3, §4.8). A
/// vehicle's entry is only read or written by a thread already holding
/// that vehicle's mutex, so the map itself only needs to be concurrent
/// across distinct vehicles.
pub struct SnapshotTable {
    snapshots: DashMap<String, VehicleState>,
}

impl SnapshotTable {
    pub fn new() -> Self {
        Self { snapshots: DashMap::new() }
    }

    /// Record `state` as the last known-stable state for `vehicle_id`,
    /// just before a mutation.
    pub fn record(&self, vehicle_id: &str, state: VehicleState) {
        self.snapshots.insert(vehicle_id.to_string(), state);
    }

    /// Remove and return the snapshot for `vehicle_id`, if any.
    pub fn take(&self, vehicle_id: &str) -> Option<VehicleState> {
        self.snapshots.remove(vehicle_id).map(|(_, state)| state)
    }

    /// Clear the snapshot for `vehicle_id` without returning it — the
    /// operation succeeded and no rollback is needed.
    pub fn clear(&self, vehicle_id: &str) {
        self.snapshots.remove(vehicle_id);
    }

    /// Every outstanding snapshot, for the audit-failure rollback scope
    /// (§4.8), which walks all vehicles with a recorded snapshot.
    pub fn all(&self) -> Vec<(String, VehicleState)> {
        self.snapshots.iter().map(|entry| (entry.key().clone(), *entry.value())).collect()
    }
}

impl Default for SnapshotTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_take_round_trips() {
        let table = SnapshotTable::new();
        table.record("V1", VehicleState::Available);
        assert_eq!(table.take("V1"), Some(VehicleState::Available));
        assert_eq!(table.take("V1"), None);
    }

    #[test]
    fn clear_removes_without_returning() {
        let table = SnapshotTable::new();
        table.record("V1", VehicleState::Reserved);
        table.clear("V1");
        assert_eq!(table.take("V1"), None);
    }
}
