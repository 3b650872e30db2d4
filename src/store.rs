use crate::block::BlockRecord;
use crate::chain::{Chain, LoadMode};
use crate::error::{LedgerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and writes a chain as a JSON array of block records.
///
/// The file holds records in chain order, genesis first. Loading performs no
/// integrity checks, so a tampered file comes back exactly as written;
/// callers that need assurance invoke [`Chain::verify`] after loading.
pub struct ChainStore {
    path: PathBuf,
}

impl ChainStore {
    /// Create a store backed by the given ledger file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a chain from the ledger file.
    ///
    /// A missing file surfaces as `Io`; content that does not decode into
    /// block records (bad JSON, missing fields, wrong field types) surfaces
    /// as `MalformedRecord` and aborts the load.
    pub fn load(&self, mode: LoadMode) -> Result<Chain> {
        let data = fs::read_to_string(&self.path)?;
        let records: Vec<BlockRecord> = serde_json::from_str(&data)
            .map_err(|e| LedgerError::MalformedRecord(e.to_string()))?;
        Chain::from_records(records, mode)
    }

    /// Write the whole chain to the ledger file, replacing prior content.
    pub fn save(&self, chain: &Chain) -> Result<()> {
        let data = serde_json::to_string_pretty(&chain.to_records())?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ChainStore::new(tmp.path().join("ledger.json"));

        let mut chain = Chain::new();
        chain.append("first");
        chain.append("second");
        store.save(&chain).unwrap();

        let loaded = store.load(LoadMode::Permissive).unwrap();
        assert_eq!(loaded.blocks(), chain.blocks());
        assert!(loaded.verify().is_valid());
    }

    #[test]
    fn tampered_file_loads_verbatim_and_fails_verification() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ChainStore::new(tmp.path().join("ledger.json"));

        let mut chain = Chain::new();
        chain.append("honest entry");
        chain.corrupt(1, "forged entry");
        store.save(&chain).unwrap();

        let loaded = store.load(LoadMode::Permissive).unwrap();
        assert_eq!(loaded.find(1).unwrap().payload, "forged entry");
        assert!(!loaded.verify().is_valid());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ChainStore::new(tmp.path().join("absent.json"));

        match store.load(LoadMode::Permissive) {
            Err(LedgerError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn undecodable_content_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ledger.json");
        fs::write(&path, "not json at all").unwrap();

        let result = ChainStore::new(&path).load(LoadMode::Permissive);
        assert!(matches!(result, Err(LedgerError::MalformedRecord(_))));
    }

    #[test]
    fn record_with_wrong_field_shape_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ledger.json");
        // id must be an integer
        fs::write(
            &path,
            r#"[{"id": "zero", "timestamp": "t", "payload": "p", "prev_hash": "0", "hash": "h"}]"#,
        )
        .unwrap();

        let result = ChainStore::new(&path).load(LoadMode::Permissive);
        assert!(matches!(result, Err(LedgerError::MalformedRecord(_))));
    }

    #[test]
    fn strict_mode_applies_on_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ChainStore::new(tmp.path().join("ledger.json"));

        let mut chain = Chain::new();
        chain.append("entry");
        let mut records = chain.to_records();
        records[1].id = 5;
        let edited = Chain::from_records(records, LoadMode::Permissive).unwrap();
        store.save(&edited).unwrap();

        assert!(matches!(
            store.load(LoadMode::Strict),
            Err(LedgerError::IdOutOfSequence { expected: 1, found: 5 })
        ));
        assert!(store.load(LoadMode::Permissive).is_ok());
    }
}
