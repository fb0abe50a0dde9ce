//! CSV persistence adapters. Each store owns one fixed-format file under a
//! data directory and exposes `load_all` / `save_all` / `save_one` / `find`
//! — the external on-disk contract is CSV, not this crate's choice to
//! change.

pub mod audit;
mod csv_util;
pub mod payments;
pub mod rentals;
pub mod users;
pub mod vehicles;

pub use audit::AuditCsvSink;
pub use payments::PaymentStore;
pub use rentals::RentalStore;
pub use users::UserStore;
pub use vehicles::VehicleStore;
