//! CSV adapter for `data/rentals.csv`.
//!
//! Header: `id,userId,vehicleId,startTime,endTime,active`. Timestamps are
//! RFC 3339 strings; `endTime` is empty while `active` is true.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fleet_core::error::FleetError;
use fleet_core::rental::Rental;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::csv_util;

#[derive(Serialize, Deserialize)]
struct RentalRow {
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "vehicleId")]
    vehicle_id: String,
    #[serde(rename = "startTime")]
    start_time: String,
    #[serde(rename = "endTime")]
    end_time: String,
    active: bool,
}

impl RentalRow {
    fn from_rental(r: &Rental) -> Self {
        Self {
            id: r.id.clone(),
            user_id: r.user_id.clone(),
            vehicle_id: r.vehicle_id.clone(),
            start_time: r.start_time.to_rfc3339(),
            end_time: r.end_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            active: r.active,
        }
    }

    fn into_rental(self) -> Result<Rental, FleetError> {
        let start_time = parse_rfc3339(&self.start_time)?;
        let end_time = if self.end_time.is_empty() {
            None
        } else {
            Some(parse_rfc3339(&self.end_time)?)
        };
        Ok(Rental {
            id: self.id,
            user_id: self.user_id,
            vehicle_id: self.vehicle_id,
            start_time,
            end_time,
            active: self.active,
        })
    }
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, FleetError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| FleetError::Storage(e.to_string()))
}

/// CSV-backed store for rental records.
pub struct RentalStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RentalStore {
    pub fn open(data_dir: &Path) -> Self {
        Self { path: data_dir.join("rentals.csv"), write_lock: Mutex::new(()) }
    }

    pub fn load_all(&self) -> Result<Vec<Rental>, FleetError> {
        csv_util::read_all::<RentalRow>(&self.path)?
            .into_iter()
            .map(RentalRow::into_rental)
            .collect()
    }

    pub fn save_all(&self, rentals: &[Rental]) -> Result<(), FleetError> {
        let rows: Vec<RentalRow> = rentals.iter().map(RentalRow::from_rental).collect();
        csv_util::write_all(&self.path, &rows)
    }

    pub fn save_one(&self, rental: &Rental) -> Result<(), FleetError> {
        let _guard = self.write_lock.lock();
        let mut all = self.load_all()?;
        match all.iter_mut().find(|r| r.id == rental.id) {
            Some(slot) => *slot = rental.clone(),
            None => all.push(rental.clone()),
        }
        self.save_all(&all)
    }

    pub fn find(&self, id: &str) -> Result<Option<Rental>, FleetError> {
        Ok(self.load_all()?.into_iter().find(|r| r.id == id))
    }

    /// The active rental for `vehicle_id`, if any. At most one is expected
    /// to exist — enforced by `fleet-coordinator`, not by this store.
    pub fn find_active_for_vehicle(&self, vehicle_id: &str) -> Result<Option<Rental>, FleetError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|r| r.vehicle_id == vehicle_id && r.active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn active_rental_has_empty_end_time() {
        let dir = tempdir().unwrap();
        let store = RentalStore::open(dir.path());
        let rental = Rental::new("R1", "U1", "V1", Utc::now());
        store.save_one(&rental).unwrap();

        let loaded = store.find("R1").unwrap().expect("rental present");
        assert!(loaded.active);
        assert!(loaded.end_time.is_none());
    }

    #[test]
    fn ended_rental_round_trips_end_time() {
        let dir = tempdir().unwrap();
        let store = RentalStore::open(dir.path());
        let mut rental = Rental::new("R1", "U1", "V1", Utc::now());
        rental.end(Utc::now());
        store.save_one(&rental).unwrap();

        let loaded = store.find("R1").unwrap().expect("rental present");
        assert!(!loaded.active);
        assert!(loaded.end_time.is_some());
    }

    #[test]
    fn finds_active_rental_for_vehicle() {
        let dir = tempdir().unwrap();
        let store = RentalStore::open(dir.path());
        store.save_one(&Rental::new("R1", "U1", "V1", Utc::now())).unwrap();
        let found = store.find_active_for_vehicle("V1").unwrap();
        assert!(found.is_some());
    }
}
