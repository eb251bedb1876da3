// core/consensus.rs
use crate::block::{Block, BlockHeader, Hash, compute_header_hash, meets_difficulty};
use crate::config::DEFAULT_MAX_MINING_ATTEMPTS;
use crate::error::{ChainError, ErrorKind, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Bounds on a single proof-of-work search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningLimits {
    /// Nonces to try before giving up.
    pub max_attempts: u64,
    pub deadline: Option<Duration>,
}

impl Default for MiningLimits {
    fn default() -> Self {
        MiningLimits {
            max_attempts: DEFAULT_MAX_MINING_ATTEMPTS,
            deadline: None,
        }
    }
}

/// Find a valid nonce by updating header.nonce and returning (nonce, hash).
///
/// Starts from the header's current nonce. Fails with `MiningExhausted` once
/// `limits` are used up and with `MiningCancelled` when `cancel` is raised.
/// On failure the header keeps the last nonce tried.
pub fn find_valid_nonce(
    header: &mut BlockHeader,
    difficulty: u32,
    limits: &MiningLimits,
    cancel: &AtomicBool,
) -> Result<(u64, Hash)> {
    let mining_start = Instant::now();
    let mut nonce = header.nonce;

    for attempt in 0..limits.max_attempts {
        header.nonce = nonce;
        let hash = compute_header_hash(header);
        if meets_difficulty(&hash, difficulty) {
            log::debug!(
                "⛏️  Found nonce {} after {} attempts (difficulty: {})",
                nonce,
                attempt + 1,
                difficulty
            );
            return Ok((nonce, hash));
        }

        // ⏸️ check cancellation and deadline every 10,000 nonces
        if attempt % 10_000 == 9_999 {
            if cancel.load(Ordering::Relaxed) {
                return Err(ChainError::new(ErrorKind::MiningCancelled, "Mining cancelled")
                    .at(header.index));
            }
            if let Some(deadline) = limits.deadline {
                if mining_start.elapsed() >= deadline {
                    return Err(ChainError::new(
                        ErrorKind::MiningExhausted,
                        format!(
                            "no nonce found within {:?} ({} attempts, difficulty {})",
                            deadline,
                            attempt + 1,
                            difficulty
                        ),
                    )
                    .at(header.index));
                }
            }
            if attempt % 1_000_000 == 999_999 {
                let elapsed = mining_start.elapsed().as_secs_f64();
                let hashrate = if elapsed > 0.0 {
                    (attempt + 1) as f64 / elapsed
                } else {
                    0.0
                };
                log::debug!(
                    "⛏️  Mining progress: {} hashes tried, avg {:.2} H/s (difficulty: {})",
                    attempt + 1,
                    hashrate,
                    difficulty
                );
            }
        }

        nonce = nonce.wrapping_add(1);
    }

    Err(ChainError::new(
        ErrorKind::MiningExhausted,
        format!(
            "no nonce found in {} attempts (difficulty {})",
            limits.max_attempts, difficulty
        ),
    )
    .at(header.index))
}

/// Search for a nonce meeting the block's own difficulty and return the block
/// carrying it. Transactions and merkle root are left untouched.
pub fn mine(block: Block, limits: &MiningLimits, cancel: &AtomicBool) -> Result<Block> {
    let (mut header, transactions, _) = block.into_parts();
    let difficulty = header.difficulty;
    let (_, hash) = find_valid_nonce(&mut header, difficulty, limits, cancel)?;
    Ok(Block::from_parts(header, transactions, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::ZERO_HASH;
    use crate::transaction::BankTransaction;

    fn unmined(difficulty: u32) -> Block {
        Block::new(
            vec![Box::new(BankTransaction::new("t1", "alice", "bob", 1.0))],
            ZERO_HASH,
            1,
            difficulty,
        )
    }

    #[test]
    fn mine_finds_valid_nonce() {
        let cancel = AtomicBool::new(false);
        let block = unmined(2);
        let root = block.header().merkle_root;

        let mined = mine(block, &MiningLimits::default(), &cancel).unwrap();
        assert!(meets_difficulty(mined.hash(), 2));
        assert_eq!(mined.header().merkle_root, root);
        assert_eq!(*mined.hash(), mined.calculate_hash());
        assert!(mined.validate().is_ok());
    }

    #[test]
    fn zero_difficulty_accepts_first_nonce() {
        let cancel = AtomicBool::new(false);
        let mut header = unmined(0).header().clone();
        let (nonce, hash) =
            find_valid_nonce(&mut header, 0, &MiningLimits::default(), &cancel).unwrap();
        assert_eq!(nonce, 0);
        assert_eq!(hash, compute_header_hash(&header));
    }

    #[test]
    fn exhausted_attempts() {
        let cancel = AtomicBool::new(false);
        let limits = MiningLimits {
            max_attempts: 5,
            deadline: None,
        };
        // 64 zero characters is out of reach in five tries.
        let err = mine(unmined(64), &limits, &cancel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MiningExhausted);
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn impossible_difficulty_exhausts() {
        let cancel = AtomicBool::new(false);
        let limits = MiningLimits {
            max_attempts: 100,
            deadline: None,
        };
        let err = mine(unmined(65), &limits, &cancel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MiningExhausted);
    }

    #[test]
    fn deadline_stops_search() {
        let cancel = AtomicBool::new(false);
        let limits = MiningLimits {
            max_attempts: u64::MAX,
            deadline: Some(Duration::ZERO),
        };
        let err = mine(unmined(64), &limits, &cancel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MiningExhausted);
    }

    #[test]
    fn cancel_flag_stops_search() {
        let cancel = AtomicBool::new(true);
        let err = mine(unmined(64), &MiningLimits::default(), &cancel).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MiningCancelled);
    }
}
