use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::crypto::Address;

/// A value transfer from one address to another.
///
/// Transactions are immutable once constructed. The pool and every mined
/// block hold independent owned copies, so cloning one is a true value copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Address the value is drawn from
    pub sender: Address,

    /// Address the value is credited to
    pub recipient: Address,

    /// Amount transferred
    pub value: f64,
}

impl Transaction {
    /// Creates a new transaction
    ///
    /// # Arguments
    ///
    /// * `sender` - The address of the sender
    /// * `recipient` - The address of the recipient
    /// * `value` - The amount to transfer
    pub fn new(sender: Address, recipient: Address, value: f64) -> Self {
        Transaction {
            sender,
            recipient,
            value,
        }
    }

    /// Canonical byte encoding of the transaction: the JSON serialization
    /// of (sender, recipient, value) in declaration order. Wallets sign
    /// these bytes and the ledger hashes them during verification, so the
    /// encoding must stay stable across process runs.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let transaction = Transaction::new(
            Address("alice".to_string()),
            Address("bob".to_string()),
            12.5,
        );

        assert_eq!(transaction.sender.0, "alice");
        assert_eq!(transaction.recipient.0, "bob");
        assert_eq!(transaction.value, 12.5);
    }

    #[test]
    fn test_canonical_bytes_field_order() {
        let transaction = Transaction::new(
            Address("alice".to_string()),
            Address("bob".to_string()),
            1.5,
        );

        let encoded = String::from_utf8(transaction.canonical_bytes()).unwrap();
        assert_eq!(
            encoded,
            r#"{"sender":"alice","recipient":"bob","value":1.5}"#
        );
    }

    #[test]
    fn test_canonical_bytes_deterministic() {
        let a = Transaction::new(Address("a".to_string()), Address("b".to_string()), 0.4);
        let b = a.clone();

        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
    }
}
