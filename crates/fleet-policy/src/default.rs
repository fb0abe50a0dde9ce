use fleet_core::error::FleetError;
use fleet_core::geo::Coordinate;
use fleet_core::rental::Rental;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;
use fleet_core::vehicle::Vehicle;

use crate::CityPolicy;

/// The fallback policy for cities with no specific regulatory rules. Every
/// gate is a no-op.
pub struct DefaultPolicy;

impl CityPolicy for DefaultPolicy {
    fn before_unlock(&self, _vehicle: &Vehicle, _latest_telemetry: &TelemetrySample, _rental: &Rental) -> Result<(), FleetError> {
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, _base_amount: f64) -> Result<f64, FleetError> {
        Ok(0.0)
    }

    fn validate_transition(&self, _vehicle: &Vehicle, _target: VehicleState) -> Result<(), FleetError> {
        Ok(())
    }

    fn is_allowed(&self, _vehicle: &Vehicle, _gps: &Coordinate) -> Result<(), FleetError> {
        Ok(())
    }
}
