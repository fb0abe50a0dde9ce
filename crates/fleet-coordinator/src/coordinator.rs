use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use fleet_audit::{AuditLog, AuditSink};
use fleet_core::error::FleetError;
use fleet_core::geo::Coordinate;
use fleet_core::payment::Payment;
use fleet_core::rental::Rental;
use fleet_core::state_machine::VehicleState;
use fleet_core::telemetry_sample::TelemetrySample;
use fleet_core::user::User;
use fleet_core::vehicle::Vehicle;
use fleet_policy::policy_for_city;
use fleet_storage::{AuditCsvSink, PaymentStore, RentalStore, UserStore, VehicleStore};
use fleet_telemetry::{QueuedSample, TelemetryEvent, TelemetryHandler, TelemetryQueue, TelemetryWorker};
use parking_lot::Mutex;
use tracing::warn;

use crate::locks::VehicleLocks;
use crate::snapshot::SnapshotTable;
use crate::vehicle_table::VehicleTable;

/// Fixed demo-rate approximating a 20-minute trip at the reference tariff
/// (§4.4, §9 — the spec treats this constant as authoritative).
pub const BASE_FARE: f64 = 6.00;

/// The single service object mediating every state-changing fleet
/// operation. Owns the authoritative in-memory tables, the per-vehicle
/// mutex map, the rollback snapshot table, the audit log, and the
/// telemetry worker.
pub struct Coordinator {
    vehicles: VehicleTable,
    rentals: DashMap<String, Rental>,
    payments: DashMap<String, Payment>,
    users: DashMap<String, User>,
    locks: VehicleLocks,
    snapshots: SnapshotTable,
    audit: Arc<AuditLog>,
    vehicle_store: VehicleStore,
    user_store: UserStore,
    rental_store: RentalStore,
    payment_store: PaymentStore,
    telemetry_queue: TelemetryQueue,
    worker: Mutex<Option<TelemetryWorker>>,
    next_rental_seq: AtomicU64,
    next_payment_seq: AtomicU64,
}

impl Coordinator {
    /// Open (or create) the fleet at `data_dir`, replaying every
    /// persistence store and the audit log, then start the telemetry
    /// worker.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>, FleetError> {
        let vehicle_store = VehicleStore::open(data_dir);
        let user_store = UserStore::open(data_dir);
        let rental_store = RentalStore::open(data_dir);
        let payment_store = PaymentStore::open(data_dir);
        let audit_sink: Arc<dyn AuditSink> = Arc::new(AuditCsvSink::open(data_dir));
        let audit = Arc::new(AuditLog::open(audit_sink)?);

        let vehicles = VehicleTable::new();
        for v in vehicle_store.load_all()? {
            vehicles.seed(v);
        }

        let rentals = DashMap::new();
        let mut max_rental_seq = 0u64;
        for r in rental_store.load_all()? {
            if let Some(n) = r.id.strip_prefix('R').and_then(|s| s.parse::<u64>().ok()) {
                max_rental_seq = max_rental_seq.max(n);
            }
            rentals.insert(r.id.clone(), r);
        }
        let payments = DashMap::new();
        let mut max_payment_seq = 0u64;
        for p in payment_store.load_all()? {
            if let Some(n) = p.id.strip_prefix('P').and_then(|s| s.parse::<u64>().ok()) {
                max_payment_seq = max_payment_seq.max(n);
            }
            payments.insert(p.id.clone(), p);
        }
        let users = DashMap::new();
        for u in user_store.load_all()? {
            users.insert(u.id.clone(), u);
        }

        let (telemetry_queue, receiver) = TelemetryQueue::bounded();

        let coordinator = Arc::new(Self {
            vehicles,
            rentals,
            payments,
            users,
            locks: VehicleLocks::new(),
            snapshots: SnapshotTable::new(),
            audit,
            vehicle_store,
            user_store,
            rental_store,
            payment_store,
            telemetry_queue,
            worker: Mutex::new(None),
            next_rental_seq: AtomicU64::new(max_rental_seq + 1),
            next_payment_seq: AtomicU64::new(max_payment_seq + 1),
        });

        let handler: Arc<dyn TelemetryHandler> = coordinator.clone();
        let worker = TelemetryWorker::spawn(receiver, handler);
        *coordinator.worker.lock() = Some(worker);

        Ok(coordinator)
    }

    // ── Seeding ──────────────────────────────────────────────────────────────

    pub fn seed_vehicle(&self, vehicle: Vehicle) -> Result<(), FleetError> {
        self.vehicle_store.save_one(&vehicle)?;
        self.vehicles.seed(vehicle);
        Ok(())
    }

    pub fn seed_user(&self, user: User) -> Result<(), FleetError> {
        self.user_store.save_one(&user)?;
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    // ── Read accessors ───────────────────────────────────────────────────────

    pub fn vehicle(&self, vehicle_id: &str) -> Option<Vehicle> {
        self.vehicles.snapshot(vehicle_id)
    }

    pub fn rental(&self, rental_id: &str) -> Option<Rental> {
        self.rentals.get(rental_id).map(|r| r.clone())
    }

    pub fn payment(&self, payment_id: &str) -> Option<Payment> {
        self.payments.get(payment_id).map(|p| p.clone())
    }

    pub fn all_vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.all()
    }

    /// Operator action confirming (or revoking) helmet presence on a
    /// moped ahead of unlock — the only supported way to flip
    /// `helmet_detected` outside of a telemetry sample.
    pub fn set_helmet_detected(&self, vehicle_id: &str, helmet_detected: bool) -> Result<(), FleetError> {
        self.vehicles
            .mutate(vehicle_id, |v| v.helmet_detected = helmet_detected)
            .ok_or_else(|| FleetError::VehicleNotFound(vehicle_id.to_string()))?;
        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
            self.vehicle_store.save_one(&v)?;
        }
        Ok(())
    }

    // ── 4.4 Coordinator operations ───────────────────────────────────────────

    pub fn reserve(&self, user_id: &str, vehicle_id: &str) -> Result<Rental, FleetError> {
        if !self.users.contains_key(user_id) {
            return Err(FleetError::UserNotFound(user_id.to_string()));
        }
        let vehicle_lock = self.locks.get(vehicle_id);
        let _guard = vehicle_lock.lock();

        let vehicle = self
            .vehicles
            .snapshot(vehicle_id)
            .ok_or_else(|| FleetError::VehicleNotFound(vehicle_id.to_string()))?;
        if vehicle.state != VehicleState::Available {
            return Err(FleetError::NotAvailable { state: vehicle.state });
        }

        self.snapshots.record(vehicle_id, vehicle.state);
        match self.try_reserve(user_id, vehicle_id) {
            Ok(rental) => {
                self.snapshots.clear(vehicle_id);
                Ok(rental)
            }
            Err(cause) => {
                self.rollback_single(vehicle_id);
                Err(FleetError::RolledBack { cause: cause.to_string() })
            }
        }
    }

    fn try_reserve(&self, user_id: &str, vehicle_id: &str) -> Result<Rental, FleetError> {
        self.transition(vehicle_id, VehicleState::Reserved)?;

        let rental_id = format!("R{:06}", self.next_rental_seq.fetch_add(1, Ordering::SeqCst));
        let rental = Rental::new(rental_id.clone(), user_id, vehicle_id, Utc::now());

        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
            self.vehicle_store.save_one(&v)?;
        }
        self.rental_store.save_one(&rental)?;
        self.audit
            .record("VEHICLE_RESERVED", &format!("vehicle={vehicle_id} user={user_id} rental={rental_id}"))?;

        self.rentals.insert(rental_id, rental.clone());
        Ok(rental)
    }

    pub fn start(&self, rental_id: &str, vehicle_id: &str) -> Result<(), FleetError> {
        let rental = self
            .rentals
            .get(rental_id)
            .map(|r| r.clone())
            .ok_or_else(|| FleetError::RentalNotFound(rental_id.to_string()))?;

        let vehicle_lock = self.locks.get(vehicle_id);
        let _guard = vehicle_lock.lock();

        let vehicle = self
            .vehicles
            .snapshot(vehicle_id)
            .ok_or_else(|| FleetError::VehicleNotFound(vehicle_id.to_string()))?;
        if vehicle.state != VehicleState::Reserved {
            return Err(FleetError::NotAvailable { state: vehicle.state });
        }

        // Policy gates run before any mutation — a violation here is
        // surfaced verbatim, no snapshot/rollback involved (§7).
        let telemetry = synthetic_sample(&vehicle);
        let policy = policy_for_city(&vehicle.city);
        policy.before_unlock(&vehicle, &telemetry, &rental)?;
        policy.validate_transition(&vehicle, VehicleState::InUse)?;

        self.snapshots.record(vehicle_id, vehicle.state);
        match self.try_start(&rental, vehicle_id) {
            Ok(()) => {
                self.snapshots.clear(vehicle_id);
                Ok(())
            }
            Err(cause) => {
                self.rollback_single(vehicle_id);
                Err(FleetError::RolledBack { cause: cause.to_string() })
            }
        }
    }

    fn try_start(&self, rental: &Rental, vehicle_id: &str) -> Result<(), FleetError> {
        self.transition(vehicle_id, VehicleState::InUse)?;

        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
            self.vehicle_store.save_one(&v)?;
        }
        self.audit.record("RENTAL_STARTED", &format!("vehicle={vehicle_id} rental={}", rental.id))?;
        Ok(())
    }

    pub fn end(&self, rental_id: &str, vehicle_id: &str) -> Result<Payment, FleetError> {
        let rental = self
            .rentals
            .get(rental_id)
            .map(|r| r.clone())
            .ok_or_else(|| FleetError::RentalNotFound(rental_id.to_string()))?;
        if !rental.active {
            return Err(FleetError::AlreadyEnded(rental_id.to_string()));
        }

        let vehicle_lock = self.locks.get(vehicle_id);
        let _guard = vehicle_lock.lock();

        let vehicle = self
            .vehicles
            .snapshot(vehicle_id)
            .ok_or_else(|| FleetError::VehicleNotFound(vehicle_id.to_string()))?;
        if vehicle.state != VehicleState::InUse {
            return Err(FleetError::NotAvailable { state: vehicle.state });
        }

        self.snapshots.record(vehicle_id, vehicle.state);

        let mut ended_rental = rental.clone();
        ended_rental.end(Utc::now());

        // after_trip failure is logged and swallowed — the only place a
        // policy failure doesn't propagate (§7): the rental must end to
        // free the vehicle regardless.
        let policy = policy_for_city(&vehicle.city);
        let surcharge = match policy.after_trip(&ended_rental, BASE_FARE) {
            Ok(s) => s,
            Err(e) => {
                warn!(rental_id, error = %e, "after_trip policy failed, surcharge defaults to 0");
                0.0
            }
        };

        let payment_id = format!("P{:06}", self.next_payment_seq.fetch_add(1, Ordering::SeqCst));
        let description = if surcharge > 0.0 {
            format!("{} trip, surcharge applied", vehicle.city)
        } else {
            format!("{} trip", vehicle.city)
        };
        let payment = Payment::new(payment_id, rental_id, BASE_FARE, surcharge, description);

        match self.try_end(&ended_rental, &payment, vehicle_id) {
            Ok(()) => {
                self.snapshots.clear(vehicle_id);
                self.rentals.insert(ended_rental.id.clone(), ended_rental);
                self.payments.insert(payment.id.clone(), payment.clone());
                Ok(payment)
            }
            Err(cause) => {
                self.rollback_single(vehicle_id);
                Err(FleetError::RolledBack { cause: cause.to_string() })
            }
        }
    }

    fn try_end(&self, rental: &Rental, payment: &Payment, vehicle_id: &str) -> Result<(), FleetError> {
        self.transition(vehicle_id, VehicleState::Available)?;

        self.rental_store.save_one(rental)?;
        self.payment_store.save_one(payment)?;
        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
            self.vehicle_store.save_one(&v)?;
        }

        self.audit.record("RENTAL_ENDED", &format!("vehicle={vehicle_id} rental={}", rental.id))?;
        self.audit.record(
            "PAYMENT_PROCESSED",
            &format!("rental={} payment={} total={:.2}", rental.id, payment.id, payment.total),
        )?;
        Ok(())
    }

    pub fn check_gps(&self, vehicle_id: &str, gps: Coordinate) -> bool {
        let Some(vehicle) = self.vehicles.snapshot(vehicle_id) else {
            return false;
        };
        let vehicle_lock = self.locks.get(vehicle_id);
        let _guard = vehicle_lock.lock();

        let policy = policy_for_city(&vehicle.city);
        match policy.is_allowed(&vehicle, &gps) {
            Ok(()) => true,
            Err(e) => {
                self.emergency_lock(vehicle_id, &format!("check_gps violation: {e}"));
                false
            }
        }
    }

    pub fn submit_telemetry(&self, vehicle_id: &str, sample: TelemetrySample) -> Result<(), FleetError> {
        let vehicle = self
            .vehicles
            .snapshot(vehicle_id)
            .ok_or_else(|| FleetError::VehicleNotFound(vehicle_id.to_string()))?;

        self.telemetry_queue.submit(QueuedSample {
            vehicle_id: vehicle_id.to_string(),
            sample,
            state_at_submission: vehicle.state,
            previous_location: vehicle.location,
        })
    }

    pub fn verify_audit_chain(&self) -> bool {
        self.audit.verify_chain()
    }

    pub fn stop_telemetry_monitor(&self) {
        if let Some(mut worker) = self.worker.lock().take() {
            worker.stop();
        }
    }

    // ── 4.7 Emergency-lock procedure ─────────────────────────────────────────

    /// Caller must already hold `vehicle_id`'s mutex. No-op if the
    /// transition is illegal (already `EmergencyLock`).
    fn emergency_lock(&self, vehicle_id: &str, reason: &str) {
        let applied = self
            .vehicles
            .mutate(vehicle_id, |v| match v.state.transition_to(VehicleState::EmergencyLock) {
                Some(next) => {
                    v.state = next;
                    true
                }
                None => false,
            })
            .unwrap_or(false);

        if !applied {
            return;
        }
        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
            if let Err(e) = self.vehicle_store.save_one(&v) {
                warn!(vehicle_id, error = %e, "failed to persist emergency lock");
            }
        }
        if let Err(e) = self.audit.record("EMERGENCY_LOCK", &format!("vehicle={vehicle_id} reason={reason}")) {
            warn!(vehicle_id, error = %e, "failed to audit emergency lock");
        }
    }

    fn auto_end_rental(&self, rental: &Rental, vehicle_id: &str) -> Result<(), FleetError> {
        let mut ended = rental.clone();
        ended.end(Utc::now());

        self.transition(vehicle_id, VehicleState::Available)?;

        self.rental_store.save_one(&ended)?;
        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
            self.vehicle_store.save_one(&v)?;
        }
        self.audit.record("EMERGENCY_RENTAL_END", &format!("vehicle={vehicle_id} rental={}", ended.id))?;
        self.rentals.insert(ended.id.clone(), ended);
        Ok(())
    }

    // ── 4.8 Rollback procedure ───────────────────────────────────────────────

    /// Operation-local rollback: force the single vehicle back to its
    /// pre-operation snapshot. Never fails and never audits (§4.8).
    fn rollback_single(&self, vehicle_id: &str) {
        let Some(state) = self.snapshots.take(vehicle_id) else {
            return;
        };
        self.vehicles.mutate(vehicle_id, |v| v.state = v.state.force_state(state));
        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
            if let Err(e) = self.vehicle_store.save_one(&v) {
                warn!(vehicle_id, error = %e, "failed to persist rollback");
            }
        }
    }

    /// Audit-failure rollback (§4.8): restore every vehicle in the
    /// snapshot table whose current state differs from its snapshot, then
    /// clear the table. Intended as an explicit recovery step when the
    /// audit subsystem has rejected an append.
    pub fn recover_from_audit_failure(&self) {
        for (vehicle_id, snapshot_state) in self.snapshots.all() {
            let differs = self
                .vehicles
                .snapshot(&vehicle_id)
                .map(|v| v.state != snapshot_state)
                .unwrap_or(false);
            if differs {
                self.vehicles.mutate(&vehicle_id, |v| v.state = v.state.force_state(snapshot_state));
                if let Some(v) = self.vehicles.snapshot(&vehicle_id) {
                    if let Err(e) = self.vehicle_store.save_one(&v) {
                        warn!(vehicle_id = %vehicle_id, error = %e, "failed to persist audit-failure rollback");
                    }
                }
            }
            self.snapshots.clear(&vehicle_id);
        }
    }

    /// Attempt the legal transition recorded in §4.1, wrapping failure in
    /// `InvalidTransition`.
    fn transition(&self, vehicle_id: &str, target: VehicleState) -> Result<(), FleetError> {
        self.vehicles
            .mutate(vehicle_id, |v| {
                let from = v.state;
                match v.state.transition_to(target) {
                    Some(next) => {
                        v.state = next;
                        Ok(())
                    }
                    None => Err(FleetError::InvalidTransition { from, to: target }),
                }
            })
            .ok_or_else(|| FleetError::VehicleNotFound(vehicle_id.to_string()))?
    }
}

fn synthetic_sample(vehicle: &Vehicle) -> TelemetrySample {
    TelemetrySample {
        timestamp: Utc::now(),
        gps: vehicle.location,
        battery_percent: vehicle.battery_percent,
        temperature_c: vehicle.temperature_c,
        helmet_present: vehicle.helmet_detected,
    }
}

// ── 4.6 Event callback reactions ─────────────────────────────────────────────

impl TelemetryHandler for Coordinator {
    fn apply_sample(&self, vehicle_id: &str, sample: &TelemetrySample) -> bool {
        self.vehicles
            .mutate(vehicle_id, |v| {
                v.location = sample.gps;
                v.battery_percent = sample.battery_percent;
                v.temperature_c = sample.temperature_c;
            })
            .is_some()
    }

    fn on_event(&self, vehicle_id: &str, event: TelemetryEvent) {
        let vehicle_lock = self.locks.get(vehicle_id);
        let _guard = vehicle_lock.lock();

        match event {
            TelemetryEvent::CriticalTemperature => {
                let temperature_c = self.vehicles.snapshot(vehicle_id).map(|v| v.temperature_c).unwrap_or(0.0);
                self.emergency_lock(vehicle_id, &format!("measured temperature {temperature_c:.1}"));
            }
            TelemetryEvent::HighTemperatureWarning => {
                if let Err(e) = self.audit.record("VEHICLE_THROTTLED", &format!("vehicle={vehicle_id}")) {
                    warn!(vehicle_id, error = %e, "failed to audit throttle warning");
                }
            }
            TelemetryEvent::CriticalBattery => {
                let state = self.vehicles.snapshot(vehicle_id).map(|v| v.state);
                if state == Some(VehicleState::InUse) {
                    let active_rental = self
                        .rentals
                        .iter()
                        .find(|r| r.vehicle_id == vehicle_id && r.active)
                        .map(|r| r.clone());
                    match active_rental {
                        Some(rental) => {
                            if self.auto_end_rental(&rental, vehicle_id).is_err() {
                                self.emergency_lock(vehicle_id, "auto-end failed on critical battery");
                            }
                        }
                        None => self.emergency_lock(vehicle_id, "critical battery with no active rental on record"),
                    }
                } else {
                    let applied = self
                        .vehicles
                        .mutate(vehicle_id, |v| match v.state.transition_to(VehicleState::Maintenance) {
                            Some(next) => {
                                v.state = next;
                                true
                            }
                            None => false,
                        })
                        .unwrap_or(false);
                    if applied {
                        if let Some(v) = self.vehicles.snapshot(vehicle_id) {
                            if let Err(e) = self.vehicle_store.save_one(&v) {
                                warn!(vehicle_id, error = %e, "failed to persist maintenance transition");
                            }
                        }
                        if let Err(e) = self.audit.record("VEHICLE_MAINTENANCE", &format!("vehicle={vehicle_id}")) {
                            warn!(vehicle_id, error = %e, "failed to audit maintenance transition");
                        }
                    }
                }
            }
            TelemetryEvent::LowBatteryWarning => {
                if let Err(e) = self.audit.record("LOW_BATTERY_WARNING", &format!("vehicle={vehicle_id}")) {
                    warn!(vehicle_id, error = %e, "failed to audit low battery warning");
                }
            }
            TelemetryEvent::TheftAlarm => {
                self.emergency_lock(vehicle_id, "theft alarm: unexpected movement while idle");
            }
        }
    }
}
