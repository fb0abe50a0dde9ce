//! Threshold classification over a single queued telemetry sample.

use fleet_core::geo::Coordinate;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;

/// One update queued for the background worker. Captures the vehicle's
/// state and location *at submission time* so classification stays
/// deterministic regardless of what else happens to the vehicle before the
/// worker gets to it.
#[derive(Clone, Debug)]
pub struct QueuedSample {
    pub vehicle_id: String,
    pub sample: TelemetrySample,
    pub state_at_submission: VehicleState,
    pub previous_location: Coordinate,
}

pub const CRITICAL_TEMPERATURE_C: f64 = 60.0;
pub const HIGH_TEMPERATURE_WARNING_C: f64 = 50.0;
pub const CRITICAL_BATTERY_PERCENT: u8 = 5;
pub const LOW_BATTERY_WARNING_PERCENT: u8 = 15;
pub const THEFT_ALARM_DISTANCE_M: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TelemetryEvent {
    CriticalTemperature,
    HighTemperatureWarning,
    CriticalBattery,
    LowBatteryWarning,
    TheftAlarm,
}

/// First match wins within each category; a terminal event
/// (`CriticalTemperature` / `CriticalBattery` / `TheftAlarm`) ends
/// classification immediately and no later category is checked.
pub fn classify(item: &QueuedSample) -> Vec<TelemetryEvent> {
    let mut events = Vec::new();
    let temperature_c = item.sample.temperature_c;

    if temperature_c > CRITICAL_TEMPERATURE_C {
        events.push(TelemetryEvent::CriticalTemperature);
        return events;
    }
    if temperature_c > HIGH_TEMPERATURE_WARNING_C {
        events.push(TelemetryEvent::HighTemperatureWarning);
    }

    let battery = item.sample.battery_percent;
    if battery <= CRITICAL_BATTERY_PERCENT {
        events.push(TelemetryEvent::CriticalBattery);
        return events;
    }
    if battery <= LOW_BATTERY_WARNING_PERCENT {
        events.push(TelemetryEvent::LowBatteryWarning);
    }

    if matches!(item.state_at_submission, VehicleState::Available | VehicleState::Reserved) {
        let moved_m = item.previous_location.distance_m(&item.sample.gps);
        if moved_m > THEFT_ALARM_DISTANCE_M {
            events.push(TelemetryEvent::TheftAlarm);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(battery_percent: u8, temperature_c: f64, gps: Coordinate) -> TelemetrySample {
        TelemetrySample {
            timestamp: Utc::now(),
            gps,
            battery_percent,
            temperature_c,
            helmet_present: false,
        }
    }

    fn item(sample: TelemetrySample, state: VehicleState, previous: Coordinate) -> QueuedSample {
        QueuedSample {
            vehicle_id: "V1".into(),
            sample,
            state_at_submission: state,
            previous_location: previous,
        }
    }

    #[test]
    fn critical_temperature_is_terminal() {
        let here = Coordinate::new(45.0, 9.0);
        let item = item(sample(80, 75.0, here), VehicleState::InUse, here);
        assert_eq!(classify(&item), vec![TelemetryEvent::CriticalTemperature]);
    }

    #[test]
    fn high_temperature_warning_continues_to_battery_check() {
        let here = Coordinate::new(45.0, 9.0);
        let item = item(sample(3, 55.0, here), VehicleState::InUse, here);
        assert_eq!(
            classify(&item),
            vec![TelemetryEvent::HighTemperatureWarning, TelemetryEvent::CriticalBattery]
        );
    }

    #[test]
    fn critical_battery_is_terminal_even_if_available() {
        let here = Coordinate::new(45.0, 9.0);
        let far = Coordinate::new(45.01, 9.0);
        let item = item(sample(2, 20.0, far), VehicleState::Available, here);
        assert_eq!(classify(&item), vec![TelemetryEvent::CriticalBattery]);
    }

    #[test]
    fn low_battery_warning_then_theft_alarm() {
        let here = Coordinate::new(45.4642, 9.1900);
        let far = Coordinate::new(45.4700, 9.1950);
        let item = item(sample(10, 20.0, far), VehicleState::Available, here);
        assert_eq!(
            classify(&item),
            vec![TelemetryEvent::LowBatteryWarning, TelemetryEvent::TheftAlarm]
        );
    }

    #[test]
    fn theft_alarm_not_raised_when_in_use() {
        let here = Coordinate::new(45.4642, 9.1900);
        let far = Coordinate::new(45.4700, 9.1950);
        let item = item(sample(80, 20.0, far), VehicleState::InUse, here);
        assert!(classify(&item).is_empty());
    }

    #[test]
    fn nominal_sample_produces_no_events() {
        let here = Coordinate::new(45.4642, 9.1900);
        let item = item(sample(80, 20.0, here), VehicleState::Available, here);
        assert!(classify(&item).is_empty());
    }
}
