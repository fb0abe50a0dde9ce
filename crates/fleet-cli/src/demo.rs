//! Scripted walkthrough of the six end-to-end scenarios, exercised against
//! a throwaway `data_dir`. Prints a banner per scenario and the resulting
//! vehicle/payment/audit state — useful as a smoke check of a freshly
//! built fleet without writing a test harness.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use fleet_core::geo::Coordinate;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;
use fleet_core::user::User;
use fleet_core::vehicle::{Vehicle, VehicleKind};
use fleet_coordinator::Coordinator;
use tracing::info;

pub fn run(data_dir: &std::path::Path) -> Result<()> {
    let fleet = Coordinator::open(data_dir)?;

    banner("1. London congestion");
    fleet.seed_user(User::new("U001", "Alice"))?;
    fleet.seed_vehicle(Vehicle::new("LON-ES001", VehicleKind::Scooter, "London", Coordinate::new(51.5, -0.1), 90))?;
    let rental = fleet.reserve("U001", "LON-ES001")?;
    fleet.start(&rental.id, "LON-ES001")?;
    let payment = fleet.end(&rental.id, "LON-ES001")?;
    info!(base = payment.base_amount, surcharges = payment.surcharges, total = payment.total, "trip settled");

    banner("2. Milan helmet gate");
    fleet.seed_user(User::new("U003", "Carla"))?;
    fleet.seed_vehicle(Vehicle::new("MIL-M001", VehicleKind::Moped, "Milan", Coordinate::new(45.46, 9.19), 90))?;
    let rental = fleet.reserve("U003", "MIL-M001")?;
    match fleet.start(&rental.id, "MIL-M001") {
        Ok(()) => info!("unexpected: start succeeded without a helmet"),
        Err(e) => info!(error = %e, "start blocked as expected"),
    }
    fleet.set_helmet_detected("MIL-M001", true)?;
    fleet.start(&rental.id, "MIL-M001")?;
    let payment = fleet.end(&rental.id, "MIL-M001")?;
    info!(total = payment.total, "trip settled after helmet confirmed");

    banner("3. Rome archaeological zone");
    let mut rome_vehicle = Vehicle::new("ROM-ES001", VehicleKind::Scooter, "Rome", Coordinate::new(41.8902, 12.4922), 90);
    rome_vehicle.state = VehicleState::InUse;
    fleet.seed_vehicle(rome_vehicle)?;
    let allowed = fleet.check_gps("ROM-ES001", Coordinate::new(41.8902, 12.4922));
    info!(allowed, state = ?fleet.vehicle("ROM-ES001").unwrap().state, "gps check against a restricted zone");

    banner("4. Critical temperature preempt");
    let mut hot_vehicle = Vehicle::new("LON-ES002", VehicleKind::Scooter, "London", Coordinate::new(51.5, -0.1), 90);
    hot_vehicle.state = VehicleState::InUse;
    fleet.seed_vehicle(hot_vehicle)?;
    fleet.submit_telemetry(
        "LON-ES002",
        TelemetrySample { timestamp: chrono::Utc::now(), gps: Coordinate::new(51.5, -0.1), battery_percent: 80, temperature_c: 75.0, helmet_present: false },
    )?;
    wait_for(|| fleet.vehicle("LON-ES002").map(|v| v.state) == Some(VehicleState::EmergencyLock));
    info!(state = ?fleet.vehicle("LON-ES002").unwrap().state, "vehicle after critical temperature sample");

    banner("5. Theft alarm");
    fleet.seed_vehicle(Vehicle::new("MIL-B001", VehicleKind::Bicycle, "Milan", Coordinate::new(45.4642, 9.1900), 90))?;
    fleet.submit_telemetry(
        "MIL-B001",
        TelemetrySample { timestamp: chrono::Utc::now(), gps: Coordinate::new(45.4700, 9.1950), battery_percent: 90, temperature_c: 20.0, helmet_present: false },
    )?;
    wait_for(|| fleet.vehicle("MIL-B001").map(|v| v.state) == Some(VehicleState::EmergencyLock));
    info!(state = ?fleet.vehicle("MIL-B001").unwrap().state, "vehicle after unexpected movement while idle");

    banner("6. Concurrent reservation race");
    fleet.seed_user(User::new("U100", "Eve"))?;
    fleet.seed_user(User::new("U101", "Frank"))?;
    fleet.seed_vehicle(Vehicle::new("LON-B001", VehicleKind::Bicycle, "London", Coordinate::new(51.5, -0.1), 90))?;
    let fleet_a = fleet.clone();
    let fleet_b = fleet.clone();
    let a = thread::spawn(move || fleet_a.reserve("U100", "LON-B001"));
    let b = thread::spawn(move || fleet_b.reserve("U101", "LON-B001"));
    let (ra, rb) = (a.join().unwrap(), b.join().unwrap());
    info!(a_won = ra.is_ok(), b_won = rb.is_ok(), "exactly one reservation should win");

    banner("Audit chain");
    info!(verified = fleet.verify_audit_chain(), "verify_audit_chain()");

    fleet.stop_telemetry_monitor();
    Ok(())
}

fn banner(title: &str) {
    info!("── {title} ──");
}

fn wait_for(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
}
