pub mod block;
pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod error;
pub mod merkle;
pub mod transaction;
pub mod utils;

// Explicit re-exports to avoid ambiguous glob re-exports
pub use block::{Block, BlockHeader, Hash, ZERO_HASH, compute_header_hash, serialize_header};
pub use blockchain::{Blockchain, SharedBlockchain};
pub use config::ChainConfig;
pub use consensus::MiningLimits;
pub use error::{ChainError, ErrorKind, Result};
pub use merkle::compute_merkle_root;
pub use transaction::{BankTransaction, Signature, Transaction};
