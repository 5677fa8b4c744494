use super::transaction::Transaction;

/// Staging area for transactions that have not yet been mined into a
/// block. Owned exclusively by the ledger, which serializes all access
/// through its state lock.
#[derive(Debug, Default)]
pub struct TransactionPool {
    transactions: Vec<Transaction>,
}

impl TransactionPool {
    /// Creates an empty pool
    pub fn new() -> Self {
        TransactionPool {
            transactions: Vec::new(),
        }
    }

    /// Appends a transaction. The pool is unbounded and does not
    /// deduplicate: submitting the same transfer twice stages it twice.
    pub fn add(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Returns a deep copy of the pending transactions. The copies are
    /// independent values, so clearing the pool afterwards cannot touch
    /// what a mined block stores.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .map(|t| Transaction::new(t.sender.clone(), t.recipient.clone(), t.value))
            .collect()
    }

    /// Empties the pool. Invoked as the final step of block creation.
    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// Removes and returns the most recently staged transaction
    pub fn remove_last(&mut self) -> Option<Transaction> {
        self.transactions.pop()
    }

    /// The pending transactions, in submission order
    pub fn pending(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::crypto::Address;

    fn transfer(value: f64) -> Transaction {
        Transaction::new(Address("a".to_string()), Address("b".to_string()), value)
    }

    #[test]
    fn test_add_and_clear() {
        let mut pool = TransactionPool::new();
        assert!(pool.is_empty());

        pool.add(transfer(1.0));
        pool.add(transfer(2.0));
        assert_eq!(pool.len(), 2);

        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_duplicates_are_staged_twice() {
        let mut pool = TransactionPool::new();
        let tx = transfer(1.0);

        pool.add(tx.clone());
        pool.add(tx);

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.pending()[0], pool.pending()[1]);
    }

    #[test]
    fn test_snapshot_is_independent_of_clear() {
        let mut pool = TransactionPool::new();
        pool.add(transfer(1.0));
        pool.add(transfer(2.0));

        let snapshot = pool.snapshot();
        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].value, 1.0);
        assert_eq!(snapshot[1].value, 2.0);
    }

    #[test]
    fn test_snapshot_preserves_order_and_fields() {
        let mut pool = TransactionPool::new();
        pool.add(transfer(1.0));
        pool.add(transfer(2.0));

        let snapshot = pool.snapshot();

        assert_eq!(snapshot, pool.pending().to_vec());
    }
}
