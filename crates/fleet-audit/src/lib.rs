pub mod hash;
pub mod log;

pub use hash::{checksum, GENESIS_CHECKSUM};
pub use log::{AuditEntry, AuditLog, AuditSink};
