use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Block id out of sequence: expected {expected}, found {found}")]
    IdOutOfSequence { expected: u64, found: u64 },

    #[error("Ledger holds no blocks: a chain starts at its genesis block")]
    EmptyChain,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
