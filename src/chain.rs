use crate::block::{Block, BlockHash, BlockRecord};
use crate::error::{LedgerError, Result};
use chrono::Local;
use std::fmt;

/// `prev_hash` sentinel of the genesis block. Part of the persisted format;
/// existing ledger files carry the literal `"0"`.
pub const GENESIS_PREV_HASH: &str = "0";

/// Payload stored in the genesis block of every new chain.
pub const GENESIS_PAYLOAD: &str = "Genesis block - start of the chain";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How [`Chain::from_records`] treats stored block ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Trust record ids verbatim, whatever they are.
    #[default]
    Permissive,
    /// Require ids to run sequentially from zero.
    Strict,
}

/// An append-only sequence of hash-chained blocks.
///
/// The chain is the sole owner and mutator of its blocks: it assigns
/// sequential ids, links each new block to the tail's stored hash, and holds
/// at least the genesis block at all times. Verification is a read-only pass
/// that re-derives every hash; [`Chain::corrupt`] exists to break that
/// property on purpose so detection can be demonstrated.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Create a chain containing exactly the genesis block.
    pub fn new() -> Self {
        let genesis = Block::new(
            0,
            now_timestamp(),
            GENESIS_PAYLOAD.to_string(),
            GENESIS_PREV_HASH.to_string(),
        );
        Self {
            blocks: vec![genesis],
        }
    }

    /// The tail block. A chain always holds at least the genesis block, so
    /// this cannot fail.
    pub fn latest(&self) -> &Block {
        self.blocks.last().expect("chain always holds the genesis block")
    }

    /// Append a new block carrying `payload`.
    ///
    /// The block gets the next sequential id, a fresh timestamp, and the
    /// tail's stored hash as its `prev_hash`. Returns the appended block.
    pub fn append(&mut self, payload: &str) -> &Block {
        let (next_id, prev_hash) = {
            let tail = self.latest();
            (tail.id + 1, tail.hash.clone())
        };
        let block = Block::new(next_id, now_timestamp(), payload.to_string(), prev_hash);
        self.blocks.push(block);
        self.latest()
    }

    /// Look up a block by id. Linear scan, first match wins.
    pub fn find(&self, id: u64) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Overwrite a block's payload without recomputing its hash, leaving the
    /// stored hash stale for [`Chain::verify`] to flag.
    ///
    /// Returns whether a block with that id was found and modified. This is
    /// the tamper-simulation primitive, not part of normal operation.
    pub fn corrupt(&mut self, id: u64, new_payload: &str) -> bool {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) => {
                block.payload = new_payload.to_string();
                // hash intentionally left stale
                true
            }
            None => false,
        }
    }

    /// Walk the whole chain and collect every integrity violation.
    ///
    /// The genesis block gets the hash check only; every later block gets
    /// the hash check and, independently, the link check against its
    /// predecessor's stored hash. Findings accumulate across all blocks
    /// rather than short-circuiting: inspecting a broken chain is the
    /// expected use case.
    pub fn verify(&self) -> VerifyReport {
        let mut violations = Vec::new();

        let genesis = &self.blocks[0];
        let computed = genesis.calculate_hash();
        if genesis.hash != computed {
            violations.push(IntegrityViolation::HashMismatch {
                id: genesis.id,
                stored: genesis.hash.clone(),
                computed,
            });
        }

        for pair in self.blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);

            let computed = current.calculate_hash();
            if current.hash != computed {
                violations.push(IntegrityViolation::HashMismatch {
                    id: current.id,
                    stored: current.hash.clone(),
                    computed,
                });
            }

            if current.prev_hash != previous.hash {
                violations.push(IntegrityViolation::LinkMismatch {
                    id: current.id,
                    expected: previous.hash.clone(),
                    found: current.prev_hash.clone(),
                });
            }
        }

        VerifyReport { violations }
    }

    /// Rebuild a chain from stored records, genesis first.
    ///
    /// No integrity checks happen here: hashes load verbatim and callers
    /// re-verify explicitly. `Strict` mode additionally requires ids to run
    /// `0, 1, 2, ...`; `Permissive` trusts them as stored. An empty record
    /// list is rejected in both modes since a chain is never empty.
    pub fn from_records(records: Vec<BlockRecord>, mode: LoadMode) -> Result<Self> {
        if records.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        if mode == LoadMode::Strict {
            for (position, record) in records.iter().enumerate() {
                let expected = position as u64;
                if record.id != expected {
                    return Err(LedgerError::IdOutOfSequence {
                        expected,
                        found: record.id,
                    });
                }
            }
        }
        Ok(Self {
            blocks: records.into_iter().map(Block::from_record).collect(),
        })
    }

    /// Convert the chain to its persisted record representation.
    pub fn to_records(&self) -> Vec<BlockRecord> {
        self.blocks.iter().map(Block::to_record).collect()
    }

    /// All blocks in chain order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: construction and loading both guarantee a genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

/// A single finding from [`Chain::verify`].
///
/// Findings are values, not errors: a broken chain is a normal input to
/// verification, so nothing here is ever raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// A block's stored hash no longer matches the hash recomputed from its
    /// current fields.
    HashMismatch {
        id: u64,
        stored: BlockHash,
        computed: BlockHash,
    },
    /// A block's `prev_hash` does not equal its predecessor's stored hash.
    LinkMismatch {
        id: u64,
        expected: BlockHash,
        found: BlockHash,
    },
}

impl IntegrityViolation {
    /// Id of the block the finding refers to.
    pub fn block_id(&self) -> u64 {
        match self {
            Self::HashMismatch { id, .. } | Self::LinkMismatch { id, .. } => *id,
        }
    }
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HashMismatch {
                id,
                stored,
                computed,
            } => write!(
                f,
                "block #{}: stored hash does not match its content (stored {}, computed {})",
                id, stored, computed
            ),
            Self::LinkMismatch {
                id,
                expected,
                found,
            } => write!(
                f,
                "block #{}: broken link to predecessor (expected prev_hash {}, found {})",
                id, expected, found
            ),
        }
    }
}

/// Outcome of a full-chain verification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Findings in block order; a block's hash finding precedes its link
    /// finding.
    pub violations: Vec<IntegrityViolation>,
}

impl VerifyReport {
    /// True when no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
