use super::Blockchain;
use crate::block::Hash;
use crate::error::{ChainError, Result};
use crate::transaction::Transaction;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe handle to one chain: appends take the write lock, so there is
/// at most one mutator; validation and reads share the read lock.
#[derive(Clone, Default)]
pub struct SharedBlockchain {
    inner: Arc<RwLock<Blockchain>>,
}

impl SharedBlockchain {
    pub fn new(chain: Blockchain) -> Self {
        SharedBlockchain {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Append and return the new tip's hash.
    pub fn add_block(&self, transactions: Vec<Box<dyn Transaction>>) -> Result<Hash> {
        let mut chain = self.inner.write();
        chain.add_block(transactions).map(|block| *block.hash())
    }

    pub fn is_valid(&self) -> Result<()> {
        self.inner.read().is_valid()
    }

    pub fn violations(&self) -> Vec<ChainError> {
        self.inner.read().violations()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn tip_hash(&self) -> Option<Hash> {
        self.inner.read().tip().map(|b| *b.hash())
    }

    /// Run `f` with shared access to the chain.
    pub fn read<R>(&self, f: impl FnOnce(&Blockchain) -> R) -> R {
        f(&self.inner.read())
    }
}
