use fleet_core::error::FleetError;
use fleet_core::geo::Coordinate;
use fleet_core::rental::Rental;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;
use fleet_core::vehicle::{Vehicle, VehicleKind};

use crate::zone::{in_any, rome_archaeological_zones, rome_ztl_zones};
use crate::{violation, CityPolicy};

const MIN_BATTERY_PERCENT: u8 = 15;

pub struct RomePolicy;

impl CityPolicy for RomePolicy {
    fn before_unlock(&self, vehicle: &Vehicle, latest_telemetry: &TelemetrySample, _rental: &Rental) -> Result<(), FleetError> {
        if vehicle.battery_percent < MIN_BATTERY_PERCENT {
            return Err(violation(format!(
                "battery at {}% is below the {MIN_BATTERY_PERCENT}% minimum required to unlock",
                vehicle.battery_percent
            )));
        }
        if in_any(&rome_ztl_zones(), &latest_telemetry.gps) {
            return Err(violation("vehicle is already inside a restricted zone"));
        }
        if vehicle.kind == VehicleKind::Scooter && in_any(&rome_archaeological_zones(), &latest_telemetry.gps) {
            return Err(violation("scooter is already inside the archaeological/pedestrian zone"));
        }
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, _base_amount: f64) -> Result<f64, FleetError> {
        Ok(0.0)
    }

    fn validate_transition(&self, _vehicle: &Vehicle, _target: VehicleState) -> Result<(), FleetError> {
        Ok(())
    }

    fn is_allowed(&self, vehicle: &Vehicle, gps: &Coordinate) -> Result<(), FleetError> {
        if in_any(&rome_ztl_zones(), gps) {
            return Err(violation("vehicle is inside Rome's general ZTL"));
        }
        if vehicle.kind == VehicleKind::Scooter && in_any(&rome_archaeological_zones(), gps) {
            return Err(violation("scooter is inside the archaeological/pedestrian zone"));
        }
        Ok(())
    }
}
