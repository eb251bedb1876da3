use crate::config::{HASH_SIZE, HEADER_SIZE};
use crate::error::{ChainError, Result};
use crate::merkle::compute_merkle_root;
use crate::transaction::Transaction;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type Hash = [u8; HASH_SIZE];

/// Previous hash of the genesis block and root of an empty transaction list.
pub const ZERO_HASH: Hash = [0u8; HASH_SIZE];

/// block header
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub index: u64,
    pub timestamp: i64, // unix seconds
    #[serde(with = "hex::serde")]
    pub previous_hash: Hash,
    #[serde(with = "hex::serde")]
    pub merkle_root: Hash,
    pub nonce: u64,
    pub difficulty: u32,
}

pub struct Block {
    header: BlockHeader,
    transactions: Vec<Box<dyn Transaction>>,
    hash: Hash,
}

pub fn sha256(data: &[u8]) -> Hash {
    let digest = Sha256::digest(data);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    out
}

/// Deterministic header encoding, the exact preimage of the block hash.
///
/// Fixed width, fixed order, no length prefixes, little-endian integers:
///
/// | offset | width | field          |
/// |--------|-------|----------------|
/// | 0      | 8     | index          |
/// | 8      | 8     | timestamp      |
/// | 16     | 32    | previous hash  |
/// | 48     | 32    | merkle root    |
/// | 80     | 8     | nonce          |
/// | 88     | 8     | difficulty     |
pub fn serialize_header(header: &BlockHeader) -> [u8; HEADER_SIZE] {
    let mut buf = [0u8; HEADER_SIZE];
    buf[0..8].copy_from_slice(&header.index.to_le_bytes());
    buf[8..16].copy_from_slice(&header.timestamp.to_le_bytes());
    buf[16..48].copy_from_slice(&header.previous_hash);
    buf[48..80].copy_from_slice(&header.merkle_root);
    buf[80..88].copy_from_slice(&header.nonce.to_le_bytes());
    buf[88..96].copy_from_slice(&u64::from(header.difficulty).to_le_bytes());
    buf
}

/// Compute hash from the header (sha256)
pub fn compute_header_hash(header: &BlockHeader) -> Hash {
    sha256(&serialize_header(header))
}

/// Proof-of-work predicate: the lowercase hex of `hash` starts with
/// `difficulty` '0' characters.
pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    if difficulty > HASH_SIZE * 2 {
        return false;
    }
    // One hex character per nibble, high nibble first.
    (0..difficulty).all(|i| {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        nibble == 0
    })
}

impl Block {
    /// Assemble a block over `transactions`. Nonce starts at zero; no
    /// proof-of-work search happens here.
    pub fn new(
        transactions: Vec<Box<dyn Transaction>>,
        previous_hash: Hash,
        index: u64,
        difficulty: u32,
    ) -> Self {
        let ids: Vec<Hash> = transactions.iter().map(|tx| tx.id()).collect();
        let header = BlockHeader {
            index,
            timestamp: Utc::now().timestamp(),
            previous_hash,
            merkle_root: compute_merkle_root(&ids),
            nonce: 0,
            difficulty,
        };
        let hash = compute_header_hash(&header);

        Block {
            header,
            transactions,
            hash,
        }
    }

    /// Take the parts verbatim, without recomputing the merkle root or hash.
    pub(crate) fn from_parts(
        header: BlockHeader,
        transactions: Vec<Box<dyn Transaction>>,
        hash: Hash,
    ) -> Self {
        Block {
            header,
            transactions,
            hash,
        }
    }

    pub fn into_parts(self) -> (BlockHeader, Vec<Box<dyn Transaction>>, Hash) {
        (self.header, self.transactions, self.hash)
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transactions(&self) -> &[Box<dyn Transaction>] {
        &self.transactions
    }

    /// Mutable access to the carried transactions; edits are not reflected in
    /// the stored merkle root or hash.
    #[cfg(any(test, feature = "tamper"))]
    pub fn transactions_mut(&mut self) -> &mut Vec<Box<dyn Transaction>> {
        &mut self.transactions
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    pub fn calculate_hash(&self) -> Hash {
        compute_header_hash(&self.header)
    }

    pub fn calculate_merkle_root(&self) -> Hash {
        let ids: Vec<Hash> = self.transactions.iter().map(|tx| tx.id()).collect();
        compute_merkle_root(&ids)
    }

    /// Header bytes followed by every transaction's bytes, in order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = serialize_header(&self.header).to_vec();
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.serialize());
        }
        buf
    }

    /// Header bytes + transaction bytes + the hash field.
    pub fn calculate_size(&self) -> usize {
        let tx_bytes: usize = self.transactions.iter().map(|tx| tx.serialize().len()).sum();
        HEADER_SIZE + tx_bytes + HASH_SIZE
    }

    /// Check proof-of-work and the stored hash against the header. Linkage and
    /// merkle root are chain-level checks.
    pub fn validate(&self) -> Result<()> {
        if !meets_difficulty(&self.hash, self.header.difficulty) {
            return Err(ChainError::invalid_block(format!(
                "invalid proof of work: hash {} does not satisfy difficulty {}",
                hex::encode(self.hash),
                self.header.difficulty
            ))
            .at(self.header.index));
        }

        let computed = self.calculate_hash();
        if computed != self.hash {
            return Err(ChainError::invalid_hash(format!(
                "header hash mismatch: computed {} != block.hash {}",
                hex::encode(computed),
                hex::encode(self.hash)
            ))
            .at(self.header.index));
        }

        Ok(())
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("header", &self.header)
            .field("transactions", &self.transactions)
            .field("hash", &hex::encode(self.hash))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transaction::BankTransaction;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            index: 1,
            timestamp: 1234567890,
            previous_hash: [0x00; 32],
            merkle_root: [0x11; 32],
            nonce: 42,
            difficulty: 1,
        }
    }

    fn txs() -> Vec<Box<dyn Transaction>> {
        vec![
            Box::new(BankTransaction::new("t1", "alice", "bob", 5.0)),
            Box::new(BankTransaction::new("t2", "bob", "carol", 2.5)),
        ]
    }

    #[test]
    fn serialize_header_layout() {
        let header = sample_header();
        let bytes = serialize_header(&header);

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..8], &1u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &1234567890i64.to_le_bytes());
        assert_eq!(&bytes[16..48], &[0x00; 32]);
        assert_eq!(&bytes[48..80], &[0x11; 32]);
        assert_eq!(&bytes[80..88], &42u64.to_le_bytes());
        assert_eq!(&bytes[88..96], &1u64.to_le_bytes());
    }

    #[test]
    fn header_hash_is_pure() {
        let header = sample_header();
        assert_eq!(compute_header_hash(&header), compute_header_hash(&header));
        assert_eq!(compute_header_hash(&header), sha256(&serialize_header(&header)));
    }

    #[test]
    fn every_field_changes_the_hash() {
        let base = compute_header_hash(&sample_header());
        let edits: [fn(&mut BlockHeader); 6] = [
            |h| h.index += 1,
            |h| h.timestamp -= 1,
            |h| h.previous_hash[31] ^= 1,
            |h| h.merkle_root[0] ^= 1,
            |h| h.nonce += 1,
            |h| h.difficulty += 1,
        ];
        for edit in edits {
            let mut header = sample_header();
            edit(&mut header);
            assert_ne!(compute_header_hash(&header), base);
        }
    }

    #[test]
    fn new_block_derives_root_and_hash() {
        let block = Block::new(txs(), ZERO_HASH, 3, 0);

        assert_eq!(block.index(), 3);
        assert_eq!(block.header().nonce, 0);
        assert_eq!(block.header().merkle_root, block.calculate_merkle_root());
        assert_eq!(*block.hash(), block.calculate_hash());
        assert!(block.validate().is_ok());
    }

    #[test]
    fn size_counts_header_transactions_and_hash() {
        let block = Block::new(txs(), ZERO_HASH, 1, 0);
        let tx_bytes: usize = block.transactions().iter().map(|t| t.serialize().len()).sum();

        assert_eq!(block.calculate_size(), 96 + tx_bytes + 32);
        assert_eq!(block.serialize().len() + HASH_SIZE, block.calculate_size());
        assert_eq!(&block.serialize()[..96], &serialize_header(block.header()));
    }

    #[test]
    fn meets_difficulty_counts_hex_zeros() {
        let mut hash = [0xFF; 32];
        assert!(meets_difficulty(&hash, 0));
        assert!(!meets_difficulty(&hash, 1));

        hash[0] = 0x0F;
        assert!(meets_difficulty(&hash, 1));
        assert!(!meets_difficulty(&hash, 2));

        hash[0] = 0x00;
        hash[1] = 0x00;
        assert!(meets_difficulty(&hash, 4));
        assert!(!meets_difficulty(&hash, 5));

        assert!(meets_difficulty(&ZERO_HASH, 64));
        assert!(!meets_difficulty(&ZERO_HASH, 65));
    }

    #[test]
    fn validate_rejects_missing_proof_of_work() {
        let mut header = sample_header();
        header.difficulty = 4;
        let mut block = Block::from_parts(header, txs(), [0xAB; 32]);
        block.hash = block.calculate_hash();

        // Search by hand so the failing and passing cases share one header.
        if meets_difficulty(block.hash(), 4) {
            block.header.nonce += 1;
            block.hash = block.calculate_hash();
        }
        let err = block.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBlock);
        assert!(err.message().starts_with("invalid proof of work"));

        while !meets_difficulty(block.hash(), 4) {
            block.header.nonce += 1;
            block.hash = block.calculate_hash();
        }
        assert!(block.validate().is_ok());
    }

    #[test]
    fn validate_rejects_stale_hash() {
        let mut block = Block::new(txs(), ZERO_HASH, 1, 0);
        block.header.timestamp += 10;

        let err = block.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHash);
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn header_json_uses_hex() {
        let json = serde_json::to_value(sample_header()).unwrap();
        assert_eq!(json["merkle_root"], "11".repeat(32));
        let back: BlockHeader = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_header());
    }
}
