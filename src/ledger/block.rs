use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::transaction::Transaction;

/// A sealed batch of transactions, chained to its predecessor by hash.
///
/// The canonical encoding of a block is the JSON serialization of its
/// fields in declaration order. `hash` recomputes the digest from that
/// encoding on every call, so a block can never carry a stale hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Timestamp when the block was created (nanosecond precision)
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,

    /// Nonce found by the proof-of-work search
    pub nonce: u64,

    /// Hex-encoded SHA-256 digest of the previous block
    pub previous_hash: String,

    /// Transactions sealed into this block, in pool order
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a block stamped with the current time
    ///
    /// # Arguments
    ///
    /// * `nonce` - The nonce found by the proof-of-work search
    /// * `previous_hash` - The hash of the previous block
    /// * `transactions` - The transactions to seal into the block
    pub fn new(nonce: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        Block {
            timestamp: Utc::now(),
            nonce,
            previous_hash,
            transactions,
        }
    }

    /// Creates a candidate block carrying the sentinel timestamp used by
    /// the proof-of-work predicate, so that proof validity depends on the
    /// nonce alone and stays reproducible for any verifier.
    pub fn candidate(nonce: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        Block {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            nonce,
            previous_hash,
            transactions,
        }
    }

    /// Calculates the hash of the block
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of the block's canonical encoding as a lowercase
    /// hexadecimal string
    pub fn hash(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap();

        let mut hasher = Sha256::new();
        hasher.update(&encoded);

        format!("{:x}", hasher.finalize())
    }
}
