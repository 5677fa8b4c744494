use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use log::{error, info};
use thiserror::Error;

use super::block::Block;
use super::crypto::{self, Address, DigitalSignature};
use super::pool::TransactionPool;
use super::proof;
use super::transaction::Transaction;

/// The pseudo-sender that mints mining rewards; transactions from it
/// bypass signature verification.
pub const MINING_SENDER: &str = "THE BLOCKCHAIN";

/// Amount credited to the ledger's address for each mined block
pub const MINING_REWARD: f64 = 1.0;

/// Required number of leading zero hex characters in a block hash
pub const MINING_DIFFICULTY: usize = 3;

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction signature verification failed")]
    InvalidSignature,

    #[error("Mining was cancelled before a nonce was found")]
    MiningCancelled,
}

/// Interior state guarded by one lock: the chain and the pool always
/// change together when a block is created.
#[derive(Debug)]
struct LedgerState {
    chain: Vec<Block>,
    pool: TransactionPool,
}

/// The ledger engine: an append-only chain of mined blocks plus the pool
/// of transactions waiting to be mined.
///
/// Cloning shares the underlying state. Mutating operations hold the
/// write lock for their full duration, mining included, so they run one
/// at a time in arrival order; read-only operations share the read lock.
#[derive(Debug, Clone)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,

    /// This node's receiving address, credited with mining rewards
    address: Address,

    /// Required leading zero hex characters for a valid proof
    difficulty: usize,

    /// Amount minted per mined block
    mining_reward: f64,

    /// Cancellation flag for the in-flight nonce search
    mining_cancelled: Arc<AtomicBool>,
}

impl Ledger {
    /// Creates a ledger with a genesis block at the default difficulty
    ///
    /// # Arguments
    ///
    /// * `address` - This node's receiving address
    pub fn new(address: Address) -> Self {
        Self::with_difficulty(address, MINING_DIFFICULTY)
    }

    /// Creates a ledger with a genesis block at the given difficulty.
    /// The genesis block links to the hash of a zeroed seed block, so
    /// every chain starts from the same well-known sentinel.
    pub fn with_difficulty(address: Address, difficulty: usize) -> Self {
        let ledger = Ledger {
            state: Arc::new(RwLock::new(LedgerState {
                chain: Vec::new(),
                pool: TransactionPool::new(),
            })),
            address,
            difficulty,
            mining_reward: MINING_REWARD,
            mining_cancelled: Arc::new(AtomicBool::new(false)),
        };

        let seed = Block::candidate(0, String::new(), Vec::new());
        ledger.create_block(0, seed.hash());

        ledger
    }

    /// The address mining rewards are credited to
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Seals the current pool into a new block and appends it to the
    /// chain. The block stores a snapshot of the pool's transactions and
    /// the pool is left empty.
    pub fn create_block(&self, nonce: u64, previous_hash: String) -> Block {
        let mut state = self.state.write().unwrap();
        Self::create_block_locked(&mut state, nonce, previous_hash)
    }

    fn create_block_locked(state: &mut LedgerState, nonce: u64, previous_hash: String) -> Block {
        let transactions = state.pool.snapshot();
        state.pool.clear();

        let block = Block::new(nonce, previous_hash, transactions);
        state.chain.push(block.clone());

        block
    }

    /// Stages a transaction for the next block.
    ///
    /// Transactions from [`MINING_SENDER`] mint new value and are
    /// accepted unconditionally; every other sender must supply a public
    /// key and a signature over the transaction's canonical encoding.
    /// Balance sufficiency is not checked at submission time, so a
    /// staged transaction may spend more than its sender holds.
    pub fn add_transaction(
        &self,
        sender: Address,
        recipient: Address,
        value: f64,
        sender_public_key: Option<&str>,
        signature: Option<&DigitalSignature>,
    ) -> Result<(), LedgerError> {
        let transaction = Transaction::new(sender, recipient, value);

        if transaction.sender.0 == MINING_SENDER {
            self.state.write().unwrap().pool.add(transaction);
            return Ok(());
        }

        let verified = match (sender_public_key, signature) {
            (Some(public_key), Some(signature)) => {
                crypto::verify_transaction_signature(public_key, signature, &transaction)
            }
            _ => false,
        };

        if !verified {
            error!(
                "Rejected transaction from {}: signature verification failed",
                transaction.sender
            );
            return Err(LedgerError::InvalidSignature);
        }

        self.state.write().unwrap().pool.add(transaction);
        Ok(())
    }

    /// Mines one block: stages the reward transaction, searches for a
    /// nonce over the pool snapshot and the last block's hash, then
    /// seals the pool into a new block.
    ///
    /// Holds the write lock across the whole search, so no other ledger
    /// operation can observe or change the chain or the pool while a
    /// proof is being computed. Fails only when the search is cancelled.
    pub fn mine(&self) -> Result<Block, LedgerError> {
        // A cancel issued while no search was running is stale; rearm.
        self.mining_cancelled.store(false, Ordering::Relaxed);

        let mut state = self.state.write().unwrap();

        let reward = Transaction::new(
            Address(MINING_SENDER.to_string()),
            self.address.clone(),
            self.mining_reward,
        );
        state.pool.add(reward);

        let transactions = state.pool.snapshot();
        let previous_hash = state.chain.last().unwrap().hash();

        let nonce = match proof::find_nonce(
            &previous_hash,
            &transactions,
            self.difficulty,
            &self.mining_cancelled,
        ) {
            Some(nonce) => nonce,
            None => {
                // The reward staged above must not outlive the aborted search
                state.pool.remove_last();
                return Err(LedgerError::MiningCancelled);
            }
        };

        let block = Self::create_block_locked(&mut state, nonce, previous_hash);
        info!(
            "Mined block with nonce {} sealing {} transactions",
            block.nonce,
            block.transactions.len()
        );

        Ok(block)
    }

    /// Cancels an in-flight nonce search; the pending [`Ledger::mine`]
    /// call returns [`LedgerError::MiningCancelled`]. A no-op when no
    /// search is running.
    pub fn cancel_mining(&self) {
        self.mining_cancelled.store(true, Ordering::Relaxed);
    }

    /// Net amount held by `address`: the sum over every mined block of
    /// values received minus values sent. Scans the full chain on every
    /// call; nothing is cached.
    pub fn calculate_total_amount(&self, address: &Address) -> f64 {
        let state = self.state.read().unwrap();

        let mut total = 0.0;
        for block in &state.chain {
            for transaction in &block.transactions {
                if *address == transaction.recipient {
                    total += transaction.value;
                }
                if *address == transaction.sender {
                    total -= transaction.value;
                }
            }
        }

        total
    }

    /// The most recently appended block. Panics if the chain is empty,
    /// which construction makes impossible.
    pub fn last_block(&self) -> Block {
        self.state.read().unwrap().chain.last().unwrap().clone()
    }

    /// All blocks in the chain, genesis first
    pub fn chain(&self) -> Vec<Block> {
        self.state.read().unwrap().chain.clone()
    }

    /// A copy of the transactions waiting to be mined
    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.state.read().unwrap().pool.snapshot()
    }

    /// Checks the hash link between every pair of consecutive blocks
    pub fn is_valid(&self) -> bool {
        let state = self.state.read().unwrap();

        for i in 1..state.chain.len() {
            if state.chain[i].previous_hash != state.chain[i - 1].hash() {
                return false;
            }
        }

        true
    }
}
