use thiserror::Error;

use crate::state_machine::VehicleState;

#[derive(Debug, Error)]
pub enum FleetError {
    // ── Lookup errors ────────────────────────────────────────────────────────
    #[error("vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("rental not found: {0}")]
    RentalNotFound(String),

    // ── State machine errors ────────────────────────────────────────────────
    #[error("vehicle not available (current state: {state:?})")]
    NotAvailable { state: VehicleState },

    #[error("illegal transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: VehicleState,
        to: VehicleState,
    },

    // ── Rental errors ────────────────────────────────────────────────────────
    #[error("rental already ended: {0}")]
    AlreadyEnded(String),

    // ── Policy errors ────────────────────────────────────────────────────────
    #[error("policy violation: {reason}")]
    PolicyViolation { reason: String },

    // ── Audit / storage errors ──────────────────────────────────────────────
    #[error("audit write failed: {0}")]
    AuditWriteFailure(String),

    #[error("operation rolled back (cause: {cause})")]
    RolledBack { cause: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // ── General ──────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}
