use fleet_core::error::FleetError;
use fleet_core::geo::Coordinate;
use fleet_core::rental::Rental;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;
use fleet_core::vehicle::Vehicle;

use crate::{violation, CityPolicy};

/// Fixed congestion charge applied to every trip ending in London,
/// regardless of whether the vehicle was ever observed in a congestion
/// zone — presence is only ever noted, never enforced as a hard block.
const CONGESTION_CHARGE: f64 = 3.50;

const MIN_BATTERY_PERCENT: u8 = 15;

pub struct LondonPolicy;

impl CityPolicy for LondonPolicy {
    fn before_unlock(&self, vehicle: &Vehicle, _latest_telemetry: &TelemetrySample, _rental: &Rental) -> Result<(), FleetError> {
        if vehicle.battery_percent < MIN_BATTERY_PERCENT {
            return Err(violation(format!(
                "battery at {}% is below the {MIN_BATTERY_PERCENT}% minimum required to unlock",
                vehicle.battery_percent
            )));
        }
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, _base_amount: f64) -> Result<f64, FleetError> {
        Ok(CONGESTION_CHARGE)
    }

    fn validate_transition(&self, vehicle: &Vehicle, target: VehicleState) -> Result<(), FleetError> {
        if target == VehicleState::InUse && vehicle.battery_percent < MIN_BATTERY_PERCENT {
            return Err(violation(format!(
                "battery at {}% is below the {MIN_BATTERY_PERCENT}% minimum to enter use",
                vehicle.battery_percent
            )));
        }
        Ok(())
    }

    fn is_allowed(&self, _vehicle: &Vehicle, _gps: &Coordinate) -> Result<(), FleetError> {
        // Congestion-zone presence is observed elsewhere but never a hard
        // block in London; the charge is applied unconditionally at trip end.
        Ok(())
    }
}
