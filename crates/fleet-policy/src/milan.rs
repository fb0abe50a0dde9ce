use fleet_core::error::FleetError;
use fleet_core::geo::Coordinate;
use fleet_core::rental::Rental;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;
use fleet_core::vehicle::{Vehicle, VehicleKind};

use crate::zone::{in_any, milan_restricted_zones};
use crate::{violation, CityPolicy};

const MIN_BATTERY_PERCENT: u8 = 15;

pub struct MilanPolicy;

impl CityPolicy for MilanPolicy {
    fn before_unlock(&self, vehicle: &Vehicle, latest_telemetry: &TelemetrySample, _rental: &Rental) -> Result<(), FleetError> {
        if vehicle.kind == VehicleKind::Moped
            && !(latest_telemetry.helmet_present || vehicle.helmet_detected)
        {
            return Err(violation("no helmet detected for moped rental"));
        }
        if vehicle.battery_percent < MIN_BATTERY_PERCENT {
            return Err(violation(format!(
                "battery at {}% is below the {MIN_BATTERY_PERCENT}% minimum required to unlock",
                vehicle.battery_percent
            )));
        }
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, _base_amount: f64) -> Result<f64, FleetError> {
        // CITY_CENTER_SURCHARGE exists in the reference but is never wired
        // up to after_trip; the implemented behaviour — and hence the
        // contract here — is a flat zero surcharge.
        Ok(0.0)
    }

    fn validate_transition(&self, vehicle: &Vehicle, target: VehicleState) -> Result<(), FleetError> {
        if target == VehicleState::InUse
            && vehicle.kind == VehicleKind::Moped
            && !vehicle.helmet_detected
        {
            return Err(violation("moped cannot enter use without a detected helmet"));
        }
        Ok(())
    }

    fn is_allowed(&self, _vehicle: &Vehicle, gps: &Coordinate) -> Result<(), FleetError> {
        if in_any(&milan_restricted_zones(), gps) {
            return Err(violation("vehicle is inside a Milan restricted zone"));
        }
        Ok(())
    }
}
