use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 hash as hex string, used to identify and link blocks.
pub type BlockHash = String;

/// One entry in the ledger.
///
/// Fields are public and independently settable: tamper simulation rewrites
/// `payload` while leaving `hash` stale, so the hash is computed on demand
/// and never maintained as a write-through invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Position in the chain, 0 for the genesis block.
    pub id: u64,
    /// Creation time, formatted `YYYY-MM-DD HH:MM:SS` (local time).
    pub timestamp: String,
    /// Caller-supplied data; opaque to the ledger.
    pub payload: String,
    /// Hash of the preceding block, or `"0"` for genesis.
    pub prev_hash: BlockHash,
    /// Content hash of this block as computed at construction time.
    pub hash: BlockHash,
}

impl Block {
    /// Create a new block; the hash is computed from the other four fields.
    ///
    /// Id monotonicity and `prev_hash` linkage are the chain's concern, not
    /// checked here.
    pub fn new(id: u64, timestamp: String, payload: String, prev_hash: BlockHash) -> Self {
        let hash = compute_hash(hash_input(id, &timestamp, &payload, &prev_hash).as_bytes());
        Self {
            id,
            timestamp,
            payload,
            prev_hash,
            hash,
        }
    }

    /// Recompute the content hash from the current field values.
    ///
    /// Pure and deterministic: the digest covers
    /// `id || timestamp || payload || prev_hash`, concatenated with no
    /// separators, and only changes if one of those fields changed.
    pub fn calculate_hash(&self) -> BlockHash {
        compute_hash(hash_input(self.id, &self.timestamp, &self.payload, &self.prev_hash).as_bytes())
    }

    /// Convert to the plain record used at the persistence boundary.
    pub fn to_record(&self) -> BlockRecord {
        BlockRecord {
            id: self.id,
            timestamp: self.timestamp.clone(),
            payload: self.payload.clone(),
            prev_hash: self.prev_hash.clone(),
            hash: self.hash.clone(),
        }
    }

    /// Rebuild a block from a stored record.
    ///
    /// The stored `hash` is taken verbatim and not recomputed, so a tampered
    /// file loads exactly as written and can be re-verified instead of being
    /// silently healed.
    pub fn from_record(record: BlockRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp,
            payload: record.payload,
            prev_hash: record.prev_hash,
            hash: record.hash,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "block #{}", self.id)?;
        writeln!(f, "  timestamp: {}", self.timestamp)?;
        writeln!(f, "  payload:   {}", self.payload)?;
        writeln!(f, "  prev hash: {}", self.prev_hash)?;
        write!(f, "  hash:      {}", self.hash)
    }
}

/// Plain key/value representation of a block, as written to and read from
/// the ledger file. Field names are the persisted format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockRecord {
    pub id: u64,
    pub timestamp: String,
    pub payload: String,
    pub prev_hash: String,
    pub hash: String,
}

/// Compute the SHA-256 hex digest of some data.
pub fn compute_hash(data: &[u8]) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn hash_input(id: u64, timestamp: &str, payload: &str, prev_hash: &str) -> String {
    format!("{}{}{}{}", id, timestamp, payload, prev_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block::new(
            1,
            "2024-06-01 12:00:00".into(),
            "hello".into(),
            "abc".into(),
        )
    }

    #[test]
    fn hash_is_deterministic() {
        let b1 = sample_block();
        let b2 = sample_block();
        assert_eq!(b1.hash, b2.hash);
        assert_eq!(b1.calculate_hash(), b1.calculate_hash());
    }

    #[test]
    fn new_block_hash_matches_recomputation() {
        let b = sample_block();
        assert_eq!(b.hash, b.calculate_hash());
    }

    #[test]
    fn hash_matches_known_vector() {
        // SHA-256("12024-06-01 12:00:00helloabc")
        let b = sample_block();
        assert_eq!(
            b.hash,
            "69d82a7a130daad6d88a6cb0a188e4dba3fbd091b7028b995006a81accac0dc1"
        );
    }

    #[test]
    fn different_payload_different_hash() {
        let b1 = sample_block();
        let b2 = Block::new(
            1,
            "2024-06-01 12:00:00".into(),
            "world".into(),
            "abc".into(),
        );
        assert_ne!(b1.hash, b2.hash);
    }

    #[test]
    fn tampered_block_no_longer_matches() {
        let mut b = sample_block();
        b.payload = "tampered".into();
        assert_ne!(b.hash, b.calculate_hash());
    }

    #[test]
    fn record_round_trip_is_exact() {
        let b = sample_block();
        let restored = Block::from_record(b.to_record());
        assert_eq!(restored, b);
    }

    #[test]
    fn record_round_trip_preserves_corrupted_hash() {
        let mut b = sample_block();
        b.hash = "deadbeef".into();
        let restored = Block::from_record(b.to_record());
        assert_eq!(restored.hash, "deadbeef");
        assert_ne!(restored.hash, restored.calculate_hash());
    }
}
