//! The checksum function over audit entries. The exact formula is part of
//! the public contract — external verifiers must be able to reproduce it —
//! so this is deliberately not swapped for a "stronger" hash.

/// Genesis sentinel: the `prev_checksum` expected for `seq_id = 1`.
pub const GENESIS_CHECKSUM: &str = "0000000000000000";

/// A deterministic djb2 variant: fold the UTF-8 bytes of
/// `seq_id|timestamp|event_type|payload|prev_checksum` starting from 5381,
/// `hash = ((hash << 5) + hash) + byte`, take the absolute value, and
/// format as lower-case hex.
pub fn checksum(seq_id: u64, timestamp: &str, event_type: &str, payload: &str, prev_checksum: &str) -> String {
    let joined = format!("{seq_id}|{timestamp}|{event_type}|{payload}|{prev_checksum}");
    djb2(joined.as_bytes())
}

fn djb2(bytes: &[u8]) -> String {
    let mut hash: i64 = 5381;
    for &b in bytes {
        hash = hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(b as i64);
    }
    format!("{:x}", hash.unsigned_abs())
}
