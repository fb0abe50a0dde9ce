use std::sync::Arc;

use chrono::{DateTime, Utc};
use fleet_core::error::FleetError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::hash::{checksum, GENESIS_CHECKSUM};

/// One checksum-chained audit entry. Append-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub seq_id: u64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub payload: String,
    pub prev_checksum: String,
    pub checksum: String,
}

/// The persistence side of the audit log: the coordinator only requires an
/// append-only write and a full replay on startup. Implemented by
/// `fleet-storage`'s CSV adapter.
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: &AuditEntry) -> Result<(), FleetError>;
    fn load_all(&self) -> Result<Vec<AuditEntry>, FleetError>;
}

struct AuditLogState {
    entries: Vec<AuditEntry>,
    next_seq_id: u64,
}

/// Checksum-chained, write-ahead-persisted audit log.
///
/// `record` only commits to the in-memory list after the underlying sink's
/// persistence write succeeds (§4.3's write-ahead discipline); on failure
/// the in-memory list is left untouched and the caller sees
/// `AuditWriteFailure`.
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
    state: Mutex<AuditLogState>,
}

impl AuditLog {
    /// Open the log, replaying whatever entries the sink already holds.
    pub fn open(sink: Arc<dyn AuditSink>) -> Result<Self, FleetError> {
        let entries = sink.load_all()?;
        let next_seq_id = entries.last().map(|e| e.seq_id + 1).unwrap_or(1);
        Ok(Self {
            sink,
            state: Mutex::new(AuditLogState { entries, next_seq_id }),
        })
    }

    /// Assign a sequence id, timestamp, and checksum, persist the entry,
    /// then — only on success — commit it to the in-memory list and
    /// advance the sequence counter. All of this runs under one
    /// acquisition of the audit mutex (§5: "the audit mutex guards
    /// sequence-counter increment, persistence write, and in-memory append
    /// as an atomic triple"), so two concurrent callers can never observe
    /// the same `next_seq_id`/`prev_checksum` pair.
    pub fn record(&self, event_type: &str, payload: &str) -> Result<(), FleetError> {
        let mut state = self.state.lock();

        let seq_id = state.next_seq_id;
        let prev_checksum = state
            .entries
            .last()
            .map(|e| e.checksum.clone())
            .unwrap_or_else(|| GENESIS_CHECKSUM.to_string());

        let timestamp = Utc::now();
        let ts_str = timestamp.to_rfc3339();
        let checksum = checksum(seq_id, &ts_str, event_type, payload, &prev_checksum);

        let entry = AuditEntry {
            seq_id,
            timestamp,
            event_type: event_type.to_string(),
            payload: payload.to_string(),
            prev_checksum,
            checksum,
        };

        self.sink.append(&entry)?;
        state.next_seq_id = entry.seq_id + 1;
        state.entries.push(entry);
        Ok(())
    }

    /// Re-walk the in-memory chain, verifying `prev_checksum` linkage and
    /// recomputed checksums against stored values.
    pub fn verify_chain(&self) -> bool {
        let state = self.state.lock();
        let mut expected_prev = GENESIS_CHECKSUM.to_string();
        for (i, entry) in state.entries.iter().enumerate() {
            if entry.seq_id != (i as u64) + 1 {
                warn!(seq_id = entry.seq_id, expected = i + 1, "audit chain seq_id gap");
                return false;
            }
            if entry.prev_checksum != expected_prev {
                warn!(seq_id = entry.seq_id, "audit chain prev_checksum mismatch");
                return false;
            }
            let recomputed = checksum(
                entry.seq_id,
                &entry.timestamp.to_rfc3339(),
                &entry.event_type,
                &entry.payload,
                &entry.prev_checksum,
            );
            if recomputed != entry.checksum {
                warn!(seq_id = entry.seq_id, "audit chain checksum mismatch");
                return false;
            }
            expected_prev = entry.checksum.clone();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.state.lock().entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct MemSink(StdMutex<Vec<AuditEntry>>);

    impl MemSink {
        fn new() -> Self {
            Self(StdMutex::new(Vec::new()))
        }
    }

    impl AuditSink for MemSink {
        fn append(&self, entry: &AuditEntry) -> Result<(), FleetError> {
            self.0.lock().unwrap().push(entry.clone());
            Ok(())
        }

        fn load_all(&self) -> Result<Vec<AuditEntry>, FleetError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn append(&self, _entry: &AuditEntry) -> Result<(), FleetError> {
            Err(FleetError::AuditWriteFailure("disk full".into()))
        }

        fn load_all(&self) -> Result<Vec<AuditEntry>, FleetError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn first_entry_uses_genesis_checksum() {
        let log = AuditLog::open(Arc::new(MemSink::new())).unwrap();
        log.record("VEHICLE_RESERVED", "vehicle=V1").unwrap();
        let entry = &log.entries()[0];
        assert_eq!(entry.seq_id, 1);
        assert_eq!(entry.prev_checksum, GENESIS_CHECKSUM);
    }

    #[test]
    fn seq_ids_increase_monotonically() {
        let log = AuditLog::open(Arc::new(MemSink::new())).unwrap();
        log.record("A", "p1").unwrap();
        log.record("B", "p2").unwrap();
        log.record("C", "p3").unwrap();
        let ids: Vec<u64> = log.entries().iter().map(|e| e.seq_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn chain_verifies_when_untouched() {
        let log = AuditLog::open(Arc::new(MemSink::new())).unwrap();
        log.record("A", "p1").unwrap();
        log.record("B", "p2").unwrap();
        assert!(log.verify_chain());
    }

    #[test]
    fn chain_fails_on_tamper() {
        let log = AuditLog::open(Arc::new(MemSink::new())).unwrap();
        log.record("A", "p1").unwrap();
        {
            let mut state = log.state.lock();
            state.entries[0].payload = "tampered".to_string();
        }
        assert!(!log.verify_chain());
    }

    #[test]
    fn failed_persistence_leaves_memory_untouched() {
        let log = AuditLog::open(Arc::new(FailingSink)).unwrap();
        let result = log.record("A", "p1");
        assert!(result.is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn concurrent_records_never_duplicate_seq_ids() {
        use std::thread;

        let log = Arc::new(AuditLog::open(Arc::new(MemSink::new())).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                thread::spawn(move || log.record("EVENT", &format!("i={i}")).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut ids: Vec<u64> = log.entries().iter().map(|e| e.seq_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
        assert!(log.verify_chain());
    }
}
