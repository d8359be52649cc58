//! Sending funds and listing wallet transactions.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::parse_params;
use crate::amount::{atomic_field, from_atomic, to_atomic};
use crate::daemon::Supervisor;
use crate::error::{Result, ShellError};
use crate::rpc::RpcError;

/// Ring size walletd uses for ordinary transfers.
pub const TRANSFER_ANONYMITY: u32 = 4;
/// Display-unit fee when the request carries none.
pub const DEFAULT_FEE: f64 = 0.01;
/// Block window covering the whole chain for `getTransactions`.
pub const TRANSACTION_SCAN_BLOCKS: u64 = 1_000_000;

const DEFAULT_TRANSACTION_LIMIT: usize = 50;

fn default_fee() -> f64 {
    DEFAULT_FEE
}

fn default_limit() -> usize {
    DEFAULT_TRANSACTION_LIMIT
}

#[derive(Debug, Deserialize)]
struct SendParams {
    #[serde(default)]
    address: String,
    amount: f64,
    #[serde(default = "default_fee")]
    fee: f64,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

/// All wallet transactions, oldest block first.
pub(crate) async fn fetch_transactions(supervisor: &Supervisor) -> std::result::Result<Vec<Value>, RpcError> {
    let result = supervisor
        .rpc()
        .call(
            supervisor.config().wallet_rpc_port,
            "getTransactions",
            json!({ "firstBlockIndex": 0, "blockCount": TRANSACTION_SCAN_BLOCKS }),
        )
        .await?;

    Ok(result
        .get("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

fn transaction_entry(tx: &Value) -> Value {
    json!({
        "hash": tx.get("transactionHash").cloned().unwrap_or(Value::Null),
        "timestamp": tx.get("timestamp").cloned().unwrap_or(Value::Null),
        "amount": from_atomic(atomic_field(tx, "amount")),
        "fee": from_atomic(atomic_field(tx, "fee")),
        "blockHeight": tx.get("blockIndex").cloned().unwrap_or(Value::Null),
        "confirmations": atomic_field(tx, "confirmations"),
    })
}

/// `get-transactions {limit}`: empty list when walletd cannot be asked.
pub async fn transactions(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: ListParams = parse_params(params)?;

    match fetch_transactions(supervisor).await {
        Ok(items) => {
            let transactions: Vec<Value> = items
                .iter()
                .take(params.limit)
                .map(transaction_entry)
                .collect();
            Ok(json!({ "transactions": transactions }))
        }
        Err(e) => {
            warn!("getTransactions failed, reporting no transactions: {}", e);
            Ok(json!({ "transactions": [] }))
        }
    }
}

/// `send-transaction {address, amount, fee}`.
pub async fn send(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: SendParams = parse_params(params)?;
    if params.address.trim().is_empty() {
        return Err(ShellError::InvalidParams("address is required".to_string()));
    }

    let amount = to_atomic(params.amount)?;
    let fee = to_atomic(params.fee)?;
    if amount == 0 {
        return Err(ShellError::InvalidParams(
            "amount must be greater than zero".to_string(),
        ));
    }

    let result = supervisor
        .rpc()
        .call(
            supervisor.config().wallet_rpc_port,
            "sendTransaction",
            json!({
                "transfers": [{ "address": params.address, "amount": amount }],
                "fee": fee,
                "anonymity": TRANSFER_ANONYMITY,
                "changeAddress": "",
            }),
        )
        .await?;

    let hash = result
        .get("transactionHash")
        .cloned()
        .unwrap_or(Value::Null);
    info!(amount, fee, tx = %hash, "transaction sent");

    Ok(json!({
        "status": "success",
        "transactionHash": hash,
        "message": "Transaction sent successfully",
    }))
}
