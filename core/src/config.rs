// Chain parameters and the per-chain configuration threaded through append.
use crate::consensus::MiningLimits;

/// Default number of leading zero hex characters a block hash must carry.
pub const DIFFICULTY: u32 = 4;

/// Largest accepted serialized block: 1 MiB.
pub const MAX_BLOCK_SIZE: usize = 1024 * 1024;

/// Length of every digest (block hash, merkle root, transaction id).
pub const HASH_SIZE: usize = 32;

/// Encoded header: index, timestamp, previous hash, merkle root, nonce, difficulty.
pub const HEADER_SIZE: usize = 8 + 8 + HASH_SIZE + HASH_SIZE + 8 + 8;

/// Nonces tried by a default mining run before giving up.
pub const DEFAULT_MAX_MINING_ATTEMPTS: u64 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub difficulty: u32,
    pub max_block_size: usize,
    /// When set, `add_block` searches for a nonce before validating the block.
    pub mining: Option<MiningLimits>,
}

impl ChainConfig {
    pub fn with_difficulty(difficulty: u32) -> Self {
        ChainConfig {
            difficulty,
            ..ChainConfig::default()
        }
    }

    /// Append validates proof-of-work but never searches for it.
    pub fn without_mining() -> Self {
        ChainConfig {
            mining: None,
            ..ChainConfig::default()
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            difficulty: DIFFICULTY,
            max_block_size: MAX_BLOCK_SIZE,
            mining: Some(MiningLimits::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_matches_layout() {
        assert_eq!(HEADER_SIZE, 96);
    }

    #[test]
    fn default_config() {
        let cfg = ChainConfig::default();
        assert_eq!(cfg.difficulty, 4);
        assert_eq!(cfg.max_block_size, 1_048_576);
        assert!(cfg.mining.is_some());

        assert!(ChainConfig::without_mining().mining.is_none());
        assert_eq!(ChainConfig::with_difficulty(1).difficulty, 1);
    }
}
