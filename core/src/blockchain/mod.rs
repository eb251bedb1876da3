use crate::block::{Block, Hash, ZERO_HASH, meets_difficulty};
use crate::config::ChainConfig;
use crate::consensus;
use crate::error::{ChainError, ErrorKind, Result};
use crate::transaction::Transaction;
use std::sync::atomic::AtomicBool;

mod shared;

pub use shared::SharedBlockchain;

/// In-memory, append-only chain of blocks.
///
/// This structure manages:
/// - Genesis creation
/// - Atomic append with per-transaction and per-block validation
/// - Fail-fast and full-report chain validation
#[derive(Debug)]
pub struct Blockchain {
    blocks: Vec<Block>,
    config: ChainConfig,
}

impl Blockchain {
    /// Chain with the default configuration (difficulty 4, mining on append).
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    pub fn with_config(config: ChainConfig) -> Self {
        let genesis = Block::new(Vec::new(), ZERO_HASH, 0, config.difficulty);

        log::info!(
            "Blockchain initialized with difficulty {}: genesis {}",
            config.difficulty,
            hex::encode(genesis.hash())
        );

        Blockchain {
            blocks: vec![genesis],
            config,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// In-place access to one stored block. Nothing here re-derives hashes;
    /// use it to model corrupted storage and check it with
    /// [`Blockchain::is_valid`]. The chain length cannot change through it.
    #[cfg(any(test, feature = "tamper"))]
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn find_by_hash(&self, hash: &Hash) -> Result<&Block> {
        self.blocks
            .iter()
            .find(|b| b.hash() == hash)
            .ok_or_else(|| {
                ChainError::new(
                    ErrorKind::BlockNotFound,
                    format!("no block with hash {}", hex::encode(hash)),
                )
            })
    }

    /// Validate `transactions`, build a block on the tip and append it.
    ///
    /// The chain is left untouched on every error path.
    pub fn add_block(&mut self, transactions: Vec<Box<dyn Transaction>>) -> Result<&Block> {
        let Some(prev) = self.blocks.last() else {
            return Err(ChainError::chain_corrupted(
                "cannot add block to empty blockchain",
            ));
        };

        for tx in &transactions {
            if let Err(e) = tx.validate() {
                log::warn!(
                    "🚫 Block rejected [invalid_tx]: tx={} reason={}",
                    hex::encode(tx.id()),
                    e
                );
                return Err(ChainError::wrap(
                    ErrorKind::InvalidBlock,
                    "transaction validation failed",
                    e,
                ));
            }
        }

        let Some(index) = prev.index().checked_add(1) else {
            return Err(ChainError::chain_corrupted(format!(
                "block index overflow after {}",
                prev.index()
            )));
        };
        let mut block = Block::new(transactions, *prev.hash(), index, self.config.difficulty);

        let size = block.calculate_size();
        if size > self.config.max_block_size {
            log::warn!(
                "🚫 Block rejected [too_large]: height={} size={} max={}",
                index,
                size,
                self.config.max_block_size
            );
            return Err(ChainError::new(
                ErrorKind::BlockTooLarge,
                format!(
                    "block size exceeds limit: {} > {} bytes",
                    size, self.config.max_block_size
                ),
            )
            .at(index));
        }

        if let Some(limits) = &self.config.mining {
            let cancel = AtomicBool::new(false);
            block = consensus::mine(block, limits, &cancel)?;
        }

        if let Err(e) = block.validate() {
            log::warn!("🚫 Block rejected [invalid_block]: height={} reason={}", index, e);
            return Err(
                ChainError::wrap(ErrorKind::InvalidBlock, "new block validation failed", e)
                    .at(index),
            );
        }

        log::info!(
            "Block {} appended: {} txs, {} bytes, hash {}",
            index,
            block.transactions().len(),
            size,
            hex::encode(block.hash())
        );
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    /// Fail-fast integrity check: returns the first violation found.
    pub fn is_valid(&self) -> Result<()> {
        self.scan(true).into_iter().next().map_or(Ok(()), Err)
    }

    /// Runs every check on every block and reports all violations in chain
    /// order. Empty when the chain is valid.
    pub fn violations(&self) -> Vec<ChainError> {
        self.scan(false)
    }

    fn scan(&self, fail_fast: bool) -> Vec<ChainError> {
        let mut found = Vec::new();

        let Some(genesis) = self.blocks.first() else {
            found.push(ChainError::chain_corrupted("blockchain has no genesis block"));
            return found;
        };

        if genesis.calculate_hash() != *genesis.hash() {
            log::warn!("🚫 Chain validation failed [hash_mismatch]: height=0");
            found.push(ChainError::invalid_hash("Genesis block hash mismatch").at(0));
            if fail_fast {
                return found;
            }
        }

        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            found.extend(Self::check_link(i + 1, previous, current, fail_fast));
            if fail_fast && !found.is_empty() {
                return found;
            }
        }

        found
    }

    /// Checks for block `i` in order: stored hash, linkage, merkle root,
    /// proof-of-work. Stops at the first violation when `fail_fast` is set.
    fn check_link(
        i: usize,
        previous: &Block,
        current: &Block,
        fail_fast: bool,
    ) -> Vec<ChainError> {
        let mut found = Vec::new();
        let at = i as u64;

        if current.calculate_hash() != *current.hash() {
            log::warn!("🚫 Chain validation failed [hash_mismatch]: height={}", i);
            found.push(
                ChainError::invalid_hash(format!(
                    "block {} hash mismatch: data has been tampered with",
                    i
                ))
                .at(at),
            );
            if fail_fast {
                return found;
            }
        }

        if current.header().previous_hash != *previous.hash() {
            log::warn!("🚫 Chain validation failed [linkage]: height={}", i);
            found.push(
                ChainError::chain_corrupted(format!(
                    "block {}: previous hash does not match hash of block {}",
                    i,
                    i - 1
                ))
                .at(at),
            );
            if fail_fast {
                return found;
            }
        }

        if current.header().merkle_root != current.calculate_merkle_root() {
            log::warn!("🚫 Chain validation failed [merkle_mismatch]: height={}", i);
            found.push(
                ChainError::invalid_block(format!(
                    "block {}: merkle root mismatch (transactions modified)",
                    i
                ))
                .at(at),
            );
            if fail_fast {
                return found;
            }
        }

        let difficulty = current.header().difficulty;
        if !meets_difficulty(current.hash(), difficulty) {
            log::warn!("🚫 Chain validation failed [invalid_pow]: height={}", i);
            found.push(
                ChainError::invalid_block(format!(
                    "block {}: hash does not satisfy difficulty {}",
                    i, difficulty
                ))
                .at(at),
            );
        }

        found
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
