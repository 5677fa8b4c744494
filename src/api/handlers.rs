use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::{Address, Block, DigitalSignature, Ledger, Transaction, Wallet};

/// Data structure for the shared ledger state
pub type LedgerData = web::Data<Ledger>;

/// Response for the chain endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChainResponse {
    /// The length of the chain
    pub length: usize,

    /// The blocks in the chain
    pub chain: Vec<Block>,

    /// Whether every block links to the hash of its predecessor
    pub is_valid: bool,
}

/// Request for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// The sender's address
    pub sender: String,

    /// The recipient's address
    pub recipient: String,

    /// The amount to transfer
    pub value: f64,

    /// The sender's public key (hex-encoded compressed point)
    pub sender_public_key: String,

    /// Signature over the transaction's canonical encoding (base58)
    pub signature: String,
}

/// Response for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    /// The message
    pub message: String,
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    /// The message
    pub message: String,

    /// The newly mined block
    pub block: Block,
}

/// Response for the create wallet endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    /// The wallet's address
    pub address: String,

    /// The wallet's public key (hex encoded)
    pub public_key: String,

    /// The wallet's private key (hex encoded)
    pub private_key: String,
}

/// Response for the balance endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    /// The address the balance was computed for
    pub address: String,

    /// Sum of values received minus values sent across all mined blocks
    pub balance: f64,
}

/// Get the full chain
///
/// Returns every block in the chain and its integrity status
#[utoipa::path(
    get,
    path = "/api/v1/chain",
    responses(
        (status = 200, description = "Chain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(ledger: LedgerData) -> impl Responder {
    let chain = ledger.chain();
    let is_valid = ledger.is_valid();

    let response = ChainResponse {
        length: chain.len(),
        chain,
        is_valid,
    };

    HttpResponse::Ok().json(response)
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be mined into a block
#[utoipa::path(
    get,
    path = "/api/v1/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(ledger: LedgerData) -> impl Responder {
    let transactions = ledger.pending_transactions();
    HttpResponse::Ok().json(transactions)
}

/// Submit a new transaction
///
/// Stages a signed transaction for the next mined block
#[utoipa::path(
    post,
    path = "/api/v1/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction staged successfully", body = TransactionResponse),
        (status = 400, description = "Signature verification failed")
    )
)]
pub async fn new_transaction(
    ledger: LedgerData,
    transaction_req: web::Json<TransactionRequest>,
) -> impl Responder {
    let sender = Address(transaction_req.sender.clone());
    let recipient = Address(transaction_req.recipient.clone());
    let signature = DigitalSignature(transaction_req.signature.clone());

    match ledger.add_transaction(
        sender,
        recipient,
        transaction_req.value,
        Some(&transaction_req.sender_public_key),
        Some(&signature),
    ) {
        Ok(()) => {
            let response = TransactionResponse {
                message: "Transaction will be added to the next block".to_string(),
            };

            HttpResponse::Created().json(response)
        }
        Err(err) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Failed to add transaction: {}", err)
        })),
    }
}

/// Mine a new block
///
/// Seals all pending transactions plus the mining reward into a new block
#[utoipa::path(
    post,
    path = "/api/v1/mine",
    responses(
        (status = 200, description = "Block mined successfully", body = MineResponse),
        (status = 400, description = "Mining was cancelled"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn mine(ledger: LedgerData) -> impl Responder {
    // The nonce search is CPU-bound; run it off the async executor
    let engine = ledger.get_ref().clone();
    match web::block(move || engine.mine()).await {
        Ok(Ok(block)) => {
            let response = MineResponse {
                message: "New block mined".to_string(),
                block,
            };

            HttpResponse::Ok().json(response)
        }
        Ok(Err(err)) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Failed to mine block: {}", err)
        })),
        Err(err) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Mining task failed: {}", err)
        })),
    }
}

/// Check whether the chain is intact
///
/// Validates the hash link between every pair of consecutive blocks
#[utoipa::path(
    get,
    path = "/api/v1/validate",
    responses(
        (status = 200, description = "Chain validation status", body = bool)
    )
)]
pub async fn validate_chain(ledger: LedgerData) -> impl Responder {
    let is_valid = ledger.is_valid();
    HttpResponse::Ok().json(is_valid)
}

/// Get the balance of an address
///
/// Sums values received minus values sent across all mined blocks
#[utoipa::path(
    get,
    path = "/api/v1/balance/{address}",
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceResponse)
    )
)]
pub async fn get_balance(ledger: LedgerData, address: web::Path<String>) -> impl Responder {
    let address = Address(address.into_inner());
    let balance = ledger.calculate_total_amount(&address);

    let response = BalanceResponse {
        address: address.0,
        balance,
    };

    HttpResponse::Ok().json(response)
}

/// Create a new wallet
///
/// Creates a new wallet with a random keypair
///
/// The caller is responsible for storing the private key
#[utoipa::path(
    post,
    path = "/api/v1/wallet/new",
    responses(
        (status = 201, description = "Wallet created successfully", body = WalletResponse)
    )
)]
pub async fn create_wallet() -> impl Responder {
    let wallet = Wallet::new();

    let response = WalletResponse {
        address: wallet.address().0.clone(),
        public_key: wallet.public_key_hex(),
        private_key: hex::encode(wallet.export_secret_key()),
    };

    HttpResponse::Created().json(response)
}
