use std::sync::atomic::{AtomicBool, Ordering};

use super::block::Block;
use super::transaction::Transaction;

/// Checks whether `nonce` seals `(previous_hash, transactions)` at the
/// given difficulty: the hex hash of the candidate block must start with
/// `difficulty` zero characters. The candidate carries the sentinel
/// timestamp, so the result depends on the nonce alone and any verifier
/// can reproduce it.
pub fn valid_proof(
    nonce: u64,
    previous_hash: &str,
    transactions: &[Transaction],
    difficulty: usize,
) -> bool {
    let candidate = Block::candidate(nonce, previous_hash.to_string(), transactions.to_vec());
    candidate.hash().starts_with(&"0".repeat(difficulty))
}

/// Sequentially scans nonces from zero until one satisfies the
/// difficulty target.
///
/// The `cancel` flag is checked on every iteration; returns `None` when
/// the search is cancelled, or if the nonce space is exhausted (which no
/// reachable difficulty produces).
pub fn find_nonce(
    previous_hash: &str,
    transactions: &[Transaction],
    difficulty: usize,
    cancel: &AtomicBool,
) -> Option<u64> {
    let mut nonce: u64 = 0;

    loop {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }

        if valid_proof(nonce, previous_hash, transactions, difficulty) {
            return Some(nonce);
        }

        nonce = nonce.checked_add(1)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::crypto::Address;

    fn sample_transactions() -> Vec<Transaction> {
        vec![Transaction::new(
            Address("alice".to_string()),
            Address("bob".to_string()),
            1.0,
        )]
    }

    #[test]
    fn test_find_nonce_satisfies_valid_proof() {
        let transactions = sample_transactions();
        let cancel = AtomicBool::new(false);

        let nonce = find_nonce("previous_hash", &transactions, 2, &cancel).unwrap();

        assert!(valid_proof(nonce, "previous_hash", &transactions, 2));
    }

    #[test]
    fn test_found_nonce_is_smallest() {
        let transactions = sample_transactions();
        let cancel = AtomicBool::new(false);

        let nonce = find_nonce("previous_hash", &transactions, 2, &cancel).unwrap();

        for earlier in 0..nonce {
            assert!(!valid_proof(earlier, "previous_hash", &transactions, 2));
        }
    }

    #[test]
    fn test_search_is_deterministic() {
        let transactions = sample_transactions();
        let cancel = AtomicBool::new(false);

        let first = find_nonce("previous_hash", &transactions, 2, &cancel);
        let second = find_nonce("previous_hash", &transactions, 2, &cancel);

        assert_eq!(first, second);
    }

    #[test]
    fn test_cancelled_search_returns_none() {
        let transactions = sample_transactions();
        let cancel = AtomicBool::new(true);

        // Difficulty 64 is unreachable; only the cancel flag ends the search
        assert_eq!(find_nonce("previous_hash", &transactions, 64, &cancel), None);
    }

    #[test]
    fn test_zero_difficulty_accepts_nonce_zero() {
        let transactions = sample_transactions();
        let cancel = AtomicBool::new(false);

        assert_eq!(find_nonce("previous_hash", &transactions, 0, &cancel), Some(0));
    }
}
