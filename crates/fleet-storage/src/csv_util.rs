//! Shared read/rewrite helpers for the whole-file CSV stores. The
//! append-only audit sink (`audit.rs`) does not use these — it writes
//! incrementally instead of rewriting the file on every call.

use std::path::Path;

use fleet_core::error::FleetError;
use serde::{de::DeserializeOwned, Serialize};

/// Deserialize every row of `path`. A missing or empty file reads as no
/// rows rather than an error — stores start empty until first written.
pub(crate) fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FleetError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => {}
        _ => return Ok(Vec::new()),
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| FleetError::Storage(e.to_string()))?;
    reader
        .deserialize::<T>()
        .map(|row| row.map_err(|e| FleetError::Storage(e.to_string())))
        .collect()
}

/// Rewrite `path` from scratch with a header row plus one row per `rows`.
pub(crate) fn write_all<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), FleetError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| FleetError::Storage(e.to_string()))?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| FleetError::Storage(e.to_string()))?;
    for row in rows {
        writer.serialize(row).map_err(|e| FleetError::Storage(e.to_string()))?;
    }
    writer.flush().map_err(|e| FleetError::Storage(e.to_string()))?;
    Ok(())
}
