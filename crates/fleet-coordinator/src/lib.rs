mod coordinator;
mod locks;
mod snapshot;
mod vehicle_table;

pub use coordinator::{Coordinator, BASE_FARE};
