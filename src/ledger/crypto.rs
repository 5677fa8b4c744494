use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{ecdsa::Signature, All, Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use utoipa::ToSchema;

use std::fmt;

use super::transaction::Transaction;

/// Process-wide secp256k1 context, created once.
static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// A ledger address.
///
/// Wallet addresses are the base58 encoding of the compressed public key;
/// the mining sentinel is a reserved plain string, so the type accepts any
/// string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Address(pub String);

impl Address {
    /// Derives the address for a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let encoded = bs58::encode(public_key.serialize()).into_string();
        Address(encoded)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A compact ECDSA signature, base58-encoded for transport
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DigitalSignature(pub String);

impl DigitalSignature {
    /// Creates a digital signature from a raw signature
    pub fn from_signature(signature: &Signature) -> Self {
        let encoded = bs58::encode(signature.serialize_compact()).into_string();
        DigitalSignature(encoded)
    }

    /// Decodes the digital signature back into a raw signature
    pub fn to_signature(&self) -> Result<Signature, CryptoError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        Signature::from_compact(&bytes)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

/// Decodes a hex-encoded compressed public key
pub fn decode_public_key(public_key_hex: &str) -> Result<PublicKey, CryptoError> {
    let bytes = hex::decode(public_key_hex)
        .map_err(|e| CryptoError::DecodingError(e.to_string()))?;

    PublicKey::from_slice(&bytes)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

/// Represents a wallet with a keypair
#[derive(Debug, Clone)]
pub struct Wallet {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl Wallet {
    /// Creates a new wallet with a random keypair
    pub fn new() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    /// Creates a wallet from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP, &secret_key);
        let address = Address::from_public_key(&public_key);

        Wallet {
            secret_key,
            public_key,
            address,
        }
    }

    /// Creates a wallet from raw secret key bytes
    pub fn from_secret_bytes(secret_key_bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::from_slice(secret_key_bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self::from_secret_key(secret_key))
    }

    /// Gets the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Gets the wallet's public key as a hex-encoded compressed point
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Signs a message with the wallet's private key. The message is
    /// hashed with SHA-256 and the digest is signed with ECDSA.
    pub fn sign(&self, message: &[u8]) -> DigitalSignature {
        let digest: [u8; 32] = Sha256::digest(message).into();
        let signature = SECP.sign_ecdsa(&Message::from_digest(digest), &self.secret_key);
        DigitalSignature::from_signature(&signature)
    }

    /// Exports the wallet's secret key as bytes
    pub fn export_secret_key(&self) -> Vec<u8> {
        self.secret_key.secret_bytes().to_vec()
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that `signature` was produced over `transaction`'s canonical
/// encoding by the holder of `public_key_hex` (SHA-256 digest, then
/// ECDSA verification). Malformed keys or signatures verify as false
/// rather than erroring.
pub fn verify_transaction_signature(
    public_key_hex: &str,
    signature: &DigitalSignature,
    transaction: &Transaction,
) -> bool {
    let public_key = match decode_public_key(public_key_hex) {
        Ok(public_key) => public_key,
        Err(_) => return false,
    };

    let signature = match signature.to_signature() {
        Ok(signature) => signature,
        Err(_) => return false,
    };

    let digest: [u8; 32] = Sha256::digest(transaction.canonical_bytes()).into();

    SECP.verify_ecdsa(&Message::from_digest(digest), &signature, &public_key)
        .is_ok()
}
