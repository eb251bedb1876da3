use crate::block::{Hash, ZERO_HASH, sha256};

/// Compute the merkle root of an ordered list of transaction ids.
///
/// An empty list yields [`ZERO_HASH`]. A single id is already the root and is
/// returned unchanged. Odd levels duplicate their last node before pairing;
/// each parent is `SHA-256(left || right)`.
pub fn compute_merkle_root(ids: &[Hash]) -> Hash {
    if ids.is_empty() {
        return ZERO_HASH;
    }

    let mut level: Vec<Hash> = ids.to_vec();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }

        level = level
            .chunks_exact(2)
            .map(|pair| {
                let mut concat = [0u8; 64];
                concat[..32].copy_from_slice(&pair[0]);
                concat[32..].copy_from_slice(&pair[1]);
                sha256(&concat)
            })
            .collect();
    }

    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Hash {
        [byte; 32]
    }

    fn parent(a: &Hash, b: &Hash) -> Hash {
        let mut concat = a.to_vec();
        concat.extend_from_slice(b);
        sha256(&concat)
    }

    #[test]
    fn empty_is_zero_hash() {
        assert_eq!(compute_merkle_root(&[]), ZERO_HASH);
    }

    #[test]
    fn single_leaf_is_returned_as_is() {
        assert_eq!(compute_merkle_root(&[leaf(7)]), leaf(7));
    }

    #[test]
    fn merkle_two() {
        let (a, b) = (leaf(0x00), leaf(0x11));
        assert_eq!(compute_merkle_root(&[a, b]), parent(&a, &b));
    }

    #[test]
    fn odd_level_duplicates_last() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let root = compute_merkle_root(&[a, b, c]);
        assert_eq!(root, compute_merkle_root(&[a, b, c, c]));
        assert_eq!(root, parent(&parent(&a, &b), &parent(&c, &c)));
    }

    #[test]
    fn order_sensitive() {
        let (a, b) = (leaf(1), leaf(2));
        assert_ne!(compute_merkle_root(&[a, b]), compute_merkle_root(&[b, a]));
    }

    #[test]
    fn five_leaves() {
        let l: Vec<Hash> = (1..=5).map(leaf).collect();
        let left = parent(&parent(&l[0], &l[1]), &parent(&l[2], &l[3]));
        let right = parent(&parent(&l[4], &l[4]), &parent(&l[4], &l[4]));
        assert_eq!(compute_merkle_root(&l), parent(&left, &right));
    }
}
