//! CSV adapter for `data/payments.csv`.
//!
//! Header: `id,rentalId,baseAmount,surcharges,total,description`. Monetary
//! fields are written to two decimal places.

use std::path::{Path, PathBuf};

use fleet_core::error::FleetError;
use fleet_core::payment::Payment;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::csv_util;

#[derive(Serialize, Deserialize)]
struct PaymentRow {
    id: String,
    #[serde(rename = "rentalId")]
    rental_id: String,
    #[serde(rename = "baseAmount")]
    base_amount: String,
    surcharges: String,
    total: String,
    description: String,
}

impl PaymentRow {
    fn from_payment(p: &Payment) -> Self {
        Self {
            id: p.id.clone(),
            rental_id: p.rental_id.clone(),
            base_amount: format!("{:.2}", p.base_amount),
            surcharges: format!("{:.2}", p.surcharges),
            total: format!("{:.2}", p.total),
            description: p.description.clone(),
        }
    }

    fn into_payment(self) -> Result<Payment, FleetError> {
        let base_amount = parse_amount(&self.base_amount)?;
        let surcharges = parse_amount(&self.surcharges)?;
        let total = parse_amount(&self.total)?;
        Ok(Payment {
            id: self.id,
            rental_id: self.rental_id,
            base_amount,
            surcharges,
            total,
            description: self.description,
        })
    }
}

fn parse_amount(s: &str) -> Result<f64, FleetError> {
    s.parse::<f64>().map_err(|e| FleetError::Storage(e.to_string()))
}

/// CSV-backed store for settled payments.
pub struct PaymentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PaymentStore {
    pub fn open(data_dir: &Path) -> Self {
        Self { path: data_dir.join("payments.csv"), write_lock: Mutex::new(()) }
    }

    pub fn load_all(&self) -> Result<Vec<Payment>, FleetError> {
        csv_util::read_all::<PaymentRow>(&self.path)?
            .into_iter()
            .map(PaymentRow::into_payment)
            .collect()
    }

    pub fn save_all(&self, payments: &[Payment]) -> Result<(), FleetError> {
        let rows: Vec<PaymentRow> = payments.iter().map(PaymentRow::from_payment).collect();
        csv_util::write_all(&self.path, &rows)
    }

    pub fn save_one(&self, payment: &Payment) -> Result<(), FleetError> {
        let _guard = self.write_lock.lock();
        let mut all = self.load_all()?;
        match all.iter_mut().find(|p| p.id == payment.id) {
            Some(slot) => *slot = payment.clone(),
            None => all.push(payment.clone()),
        }
        self.save_all(&all)
    }

    pub fn find(&self, id: &str) -> Result<Option<Payment>, FleetError> {
        Ok(self.load_all()?.into_iter().find(|p| p.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn amounts_round_trip_to_two_decimal_places() {
        let dir = tempdir().unwrap();
        let store = PaymentStore::open(dir.path());
        let payment = Payment::new("P1", "R1", 6.0, 3.5, "London congestion charge");
        store.save_one(&payment).unwrap();

        let loaded = store.find("P1").unwrap().expect("payment present");
        assert_eq!(loaded.base_amount, 6.0);
        assert_eq!(loaded.surcharges, 3.5);
        assert_eq!(loaded.total, 9.5);
    }
}
