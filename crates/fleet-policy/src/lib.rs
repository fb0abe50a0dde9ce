//! Per-city policy gates. Every city policy implements the same four-method
//! capability set; cities with no specific rules fall back to
//! [`DefaultPolicy`], a no-op.

mod default;
mod london;
mod milan;
mod rome;
pub mod zone;

pub use default::DefaultPolicy;
pub use london::LondonPolicy;
pub use milan::MilanPolicy;
pub use rome::RomePolicy;

use fleet_core::error::FleetError;
use fleet_core::geo::Coordinate;
use fleet_core::rental::Rental;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;
use fleet_core::vehicle::Vehicle;

/// A pluggable per-city regulatory gate, invoked at unlock, state
/// transition, trip end, and gps validation.
pub trait CityPolicy: Send + Sync {
    /// Called before a rental's vehicle is unlocked (i.e. before
    /// `RESERVED -> IN_USE`). Fails with `PolicyViolation` to block it.
    fn before_unlock(
        &self,
        vehicle: &Vehicle,
        latest_telemetry: &TelemetrySample,
        rental: &Rental,
    ) -> Result<(), FleetError>;

    /// Called at trip end to compute the policy surcharge on top of the
    /// fixed base fare. A `PolicyViolation` here is swallowed by the
    /// coordinator (the rental must end regardless); the surcharge then
    /// defaults to zero.
    fn after_trip(&self, rental: &Rental, base_amount: f64) -> Result<f64, FleetError>;

    /// Called before any state-machine transition is committed, in
    /// addition to the legal-transition table itself.
    fn validate_transition(&self, vehicle: &Vehicle, target: VehicleState) -> Result<(), FleetError>;

    /// Called by `check_gps` to decide whether a vehicle's current position
    /// is permitted. A violation drives the coordinator's emergency-lock
    /// procedure.
    fn is_allowed(&self, vehicle: &Vehicle, gps: &Coordinate) -> Result<(), FleetError>;
}

/// Look up the policy for a city by name. Unknown cities fall back to
/// [`DefaultPolicy`] (a no-op on every gate).
pub fn policy_for_city(city: &str) -> Box<dyn CityPolicy> {
    match city {
        "London" => Box::new(LondonPolicy),
        "Milan" => Box::new(MilanPolicy),
        "Rome" => Box::new(RomePolicy),
        _ => Box::new(DefaultPolicy),
    }
}

fn violation(reason: impl Into<String>) -> FleetError {
    FleetError::PolicyViolation { reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fleet_core::vehicle::VehicleKind;

    fn sample(gps: Coordinate, helmet_present: bool) -> TelemetrySample {
        TelemetrySample {
            timestamp: Utc::now(),
            gps,
            battery_percent: 90,
            temperature_c: 20.0,
            helmet_present,
        }
    }

    fn rental() -> Rental {
        Rental::new("r1", "u1", "v1", Utc::now())
    }

    #[test]
    fn london_blocks_unlock_on_low_battery() {
        let mut v = Vehicle::new("LON-ES001", VehicleKind::Scooter, "London", Coordinate::new(51.5, -0.1), 10);
        v.battery_percent = 10;
        let policy = LondonPolicy;
        let s = sample(v.location, false);
        assert!(policy.before_unlock(&v, &s, &rental()).is_err());
    }

    #[test]
    fn london_congestion_charge_is_fixed() {
        let policy = LondonPolicy;
        let surcharge = policy.after_trip(&rental(), 6.0).unwrap();
        assert_eq!(surcharge, 3.50);
    }

    #[test]
    fn milan_requires_helmet_for_moped() {
        let v = Vehicle::new("MIL-M001", VehicleKind::Moped, "Milan", Coordinate::new(45.46, 9.19), 90);
        let policy = MilanPolicy;
        let s = sample(v.location, false);
        let err = policy.before_unlock(&v, &s, &rental()).unwrap_err();
        assert!(err.to_string().contains("helmet"));
    }

    #[test]
    fn milan_allows_moped_with_helmet_sample() {
        let v = Vehicle::new("MIL-M001", VehicleKind::Moped, "Milan", Coordinate::new(45.46, 9.19), 90);
        let policy = MilanPolicy;
        let s = sample(v.location, true);
        assert!(policy.before_unlock(&v, &s, &rental()).is_ok());
    }

    #[test]
    fn rome_blocks_scooter_in_archaeological_zone() {
        let v = Vehicle::new("ROM-ES001", VehicleKind::Scooter, "Rome", Coordinate::new(41.8902, 12.4922), 90);
        let policy = RomePolicy;
        assert!(policy.is_allowed(&v, &Coordinate::new(41.8902, 12.4922)).is_err());
    }

    #[test]
    fn rome_before_unlock_also_blocks_archaeological_zone() {
        let v = Vehicle::new("ROM-ES001", VehicleKind::Scooter, "Rome", Coordinate::new(41.8902, 12.4922), 90);
        let policy = RomePolicy;
        let s = sample(Coordinate::new(41.8902, 12.4922), false);
        let err = policy.before_unlock(&v, &s, &rental()).unwrap_err();
        assert!(err.to_string().contains("archaeological"));
    }

    #[test]
    fn default_policy_never_blocks() {
        let v = Vehicle::new("BIC-001", VehicleKind::Bicycle, "Berlin", Coordinate::new(52.5, 13.4), 5);
        let policy = DefaultPolicy;
        let s = sample(v.location, false);
        assert!(policy.before_unlock(&v, &s, &rental()).is_ok());
        assert!(policy.is_allowed(&v, &v.location).is_ok());
        assert_eq!(policy.after_trip(&rental(), 6.0).unwrap(), 0.0);
    }
}
