//! The vehicle state machine: legal transitions and the two mutation
//! primitives the rest of the system is allowed to use.
//!
//! `transition_to` is the only primitive that enforces the table below.
//! `force_state` bypasses it and exists solely for rollback and
//! emergency-lock paths (see `fleet-coordinator`).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleState {
    Available,
    Reserved,
    InUse,
    Maintenance,
    EmergencyLock,
    Relocating,
}

impl VehicleState {
    /// The allowed target states from this state, per the legal-transition
    /// table. Does not include `force_state` targets.
    fn allowed_targets(self) -> &'static [VehicleState] {
        use VehicleState::*;
        match self {
            Available => &[Reserved, Maintenance, EmergencyLock, Relocating],
            Reserved => &[InUse, Available, EmergencyLock],
            InUse => &[Available, Maintenance, EmergencyLock],
            Maintenance => &[Available, EmergencyLock],
            EmergencyLock => &[Maintenance, Available],
            Relocating => &[Available, Maintenance],
        }
    }

    /// True iff `self -> target` appears in the legal-transition table.
    pub fn can_transition_to(self, target: VehicleState) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Attempt the legal transition; returns the new state on success.
    pub fn transition_to(self, target: VehicleState) -> Option<VehicleState> {
        if self.can_transition_to(target) {
            Some(target)
        } else {
            None
        }
    }

    /// Bypass the transition table and land on `target` unconditionally.
    /// Conceptually routes `self -> Available -> target` when `target`
    /// isn't directly reachable from `self`; either way the vehicle ends
    /// up at `target`. Reserved for rollback and emergency-lock paths.
    pub fn force_state(self, target: VehicleState) -> VehicleState {
        target
    }
}

#[cfg(test)]
mod tests {
    use super::VehicleState::*;

    #[test]
    fn available_to_reserved_is_legal() {
        assert!(Available.can_transition_to(Reserved));
    }

    #[test]
    fn reserved_to_maintenance_is_illegal() {
        assert!(!Reserved.can_transition_to(Maintenance));
    }

    #[test]
    fn emergency_lock_unreachable_from_itself() {
        assert!(!EmergencyLock.can_transition_to(EmergencyLock));
    }

    #[test]
    fn every_non_emergency_state_can_reach_emergency_lock() {
        for s in [Available, Reserved, InUse, Maintenance, Relocating] {
            assert!(s.can_transition_to(EmergencyLock), "{s:?} should reach EmergencyLock");
        }
    }

    #[test]
    fn force_state_lands_on_target_even_if_illegal() {
        // Maintenance -> Relocating is not in the legal table.
        assert!(!Maintenance.can_transition_to(Relocating));
        assert_eq!(Maintenance.force_state(Relocating), Relocating);
    }
}
