//! Append-only CSV adapter for `data/audit_log.csv`, implementing
//! `fleet_audit::AuditSink`. Header: `seqId,timestamp,eventType,payload,
//! prevChecksum,checksum`. Unlike the other stores this never rewrites the
//! whole file — each `append` writes exactly one new row.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fleet_audit::{AuditEntry, AuditSink};
use fleet_core::error::FleetError;
use serde::{Deserialize, Serialize};

use crate::csv_util;

#[derive(Serialize, Deserialize)]
struct AuditRow {
    #[serde(rename = "seqId")]
    seq_id: u64,
    timestamp: String,
    #[serde(rename = "eventType")]
    event_type: String,
    payload: String,
    #[serde(rename = "prevChecksum")]
    prev_checksum: String,
    checksum: String,
}

impl From<&AuditEntry> for AuditRow {
    fn from(e: &AuditEntry) -> Self {
        Self {
            seq_id: e.seq_id,
            timestamp: e.timestamp.to_rfc3339(),
            event_type: e.event_type.clone(),
            payload: e.payload.clone(),
            prev_checksum: e.prev_checksum.clone(),
            checksum: e.checksum.clone(),
        }
    }
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry, FleetError> {
        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| FleetError::Storage(e.to_string()))?;
        Ok(AuditEntry {
            seq_id: self.seq_id,
            timestamp,
            event_type: self.event_type,
            payload: self.payload,
            prev_checksum: self.prev_checksum,
            checksum: self.checksum,
        })
    }
}

/// Append-only CSV sink backing the audit log.
pub struct AuditCsvSink {
    path: PathBuf,
}

impl AuditCsvSink {
    pub fn open(data_dir: &Path) -> Self {
        Self { path: data_dir.join("audit_log.csv") }
    }
}

impl AuditSink for AuditCsvSink {
    fn append(&self, entry: &AuditEntry) -> Result<(), FleetError> {
        let needs_header = !matches!(std::fs::metadata(&self.path), Ok(meta) if meta.len() > 0);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FleetError::Storage(e.to_string()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FleetError::Storage(e.to_string()))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer
                .write_record(["seqId", "timestamp", "eventType", "payload", "prevChecksum", "checksum"])
                .map_err(|e| FleetError::Storage(e.to_string()))?;
        }
        writer
            .serialize(AuditRow::from(entry))
            .map_err(|e| FleetError::Storage(e.to_string()))?;
        writer.flush().map_err(|e| FleetError::Storage(e.to_string()))?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<AuditEntry>, FleetError> {
        csv_util::read_all::<AuditRow>(&self.path)?
            .into_iter()
            .map(AuditRow::into_entry)
            .collect()
    }
}
