//! Append-only, tamper-evident ledger of hash-chained blocks.
//!
//! Every block binds its content and its predecessor's hash into a SHA-256
//! digest, so any edit made after a block was appended desynchronizes the
//! stored hashes. [`Chain::verify`] re-derives every digest and reports the
//! mismatches; tampering itself is a first-class operation
//! ([`Chain::corrupt`]) so detection can be exercised end to end.

pub mod block;
pub mod chain;
pub mod error;
pub mod store;

pub use block::{Block, BlockHash, BlockRecord};
pub use chain::{Chain, IntegrityViolation, LoadMode, VerifyReport};
pub use error::{LedgerError, Result};
pub use store::ChainStore;
