pub mod error;
pub mod geo;
pub mod payment;
pub mod rental;
pub mod state_machine;
pub mod telemetry_sample;
pub mod user;
pub mod vehicle;

pub use error::FleetError;
pub use geo::{Coordinate, Zone};
pub use payment::Payment;
pub use rental::Rental;
pub use state_machine::VehicleState;
pub use telemetry_sample::TelemetrySample;
pub use user::User;
pub use vehicle::{Vehicle, VehicleKind};
