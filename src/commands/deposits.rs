//! Burn deposits (burn2mint) and time-locked CD deposits.
//!
//! Both are plain `sendTransaction` calls with no transfers and a marker in
//! `extra`; walletd does the rest.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::parse_params;
use super::transfer::fetch_transactions;
use crate::amount::{atomic_field, from_atomic, to_atomic};
use crate::daemon::Supervisor;
use crate::error::{Result, ShellError};

/// Fixed deposit fee in atomic units (0.1 XFG).
pub const DEPOSIT_FEE: u64 = 10_000_000;
pub const DEPOSIT_ANONYMITY: u32 = 0;

const BURN_MARKER: &str = "burn_deposit";
const CD_MARKER: &str = "cd_deposit";
const DEFAULT_BURN_LIMIT: usize = 20;

fn default_burn_limit() -> usize {
    DEFAULT_BURN_LIMIT
}

#[derive(Debug, Deserialize)]
struct BurnParams {
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct CdParams {
    amount: f64,
    /// Lock term in months.
    term: u32,
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    #[serde(default = "default_burn_limit")]
    limit: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawParams {
    deposit_id: u64,
}

pub fn burn_extra(atomic: u64) -> String {
    format!("{}:{}", BURN_MARKER, atomic)
}

pub fn cd_extra(atomic: u64, term: u32) -> String {
    format!("{}:{}:{}", CD_MARKER, atomic, term)
}

fn positive_atomic(amount: f64) -> Result<u64> {
    match to_atomic(amount)? {
        0 => Err(ShellError::InvalidParams(
            "amount must be greater than zero".to_string(),
        )),
        atomic => Ok(atomic),
    }
}

async fn send_deposit(supervisor: &Supervisor, extra: &str) -> Result<Value> {
    let result = supervisor
        .rpc()
        .call(
            supervisor.config().wallet_rpc_port,
            "sendTransaction",
            json!({
                "transfers": [],
                "fee": DEPOSIT_FEE,
                "anonymity": DEPOSIT_ANONYMITY,
                "extra": extra,
            }),
        )
        .await?;
    Ok(result
        .get("transactionHash")
        .cloned()
        .unwrap_or(Value::Null))
}

/// `create-burn-deposit {amount}`.
pub async fn create_burn(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: BurnParams = parse_params(params)?;
    let atomic = positive_atomic(params.amount)?;

    let tx_hash = send_deposit(supervisor, &burn_extra(atomic)).await?;
    info!(atomic, tx = %tx_hash, "burn deposit created");

    Ok(json!({
        "status": "success",
        "txHash": tx_hash,
        "amount": params.amount,
        "message": "Burn deposit created successfully",
    }))
}

/// `get-burn-history {limit}`: transactions carrying the burn marker.
pub async fn burn_history(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: HistoryParams = parse_params(params)?;

    let items = match fetch_transactions(supervisor).await {
        Ok(items) => items,
        Err(e) => {
            warn!("getTransactions failed, reporting no burns: {}", e);
            return Ok(json!({ "burns": [] }));
        }
    };

    let burns: Vec<Value> = items
        .iter()
        .filter(|tx| {
            tx.get("extra")
                .and_then(Value::as_str)
                .map(|extra| extra.contains(BURN_MARKER))
                .unwrap_or(false)
        })
        .take(params.limit)
        .map(|tx| {
            json!({
                "hash": tx.get("transactionHash").cloned().unwrap_or(Value::Null),
                "timestamp": tx.get("timestamp").cloned().unwrap_or(Value::Null),
                "amount": from_atomic(atomic_field(tx, "amount").saturating_abs()),
                "confirmations": atomic_field(tx, "confirmations"),
                "blockHeight": tx.get("blockIndex").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    Ok(json!({ "burns": burns }))
}

/// `create-cd-deposit {amount, term}`.
pub async fn create_cd(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: CdParams = parse_params(params)?;
    let atomic = positive_atomic(params.amount)?;
    if params.term == 0 {
        return Err(ShellError::InvalidParams(
            "term must be at least one month".to_string(),
        ));
    }

    let tx_hash = send_deposit(supervisor, &cd_extra(atomic, params.term)).await?;
    info!(atomic, term = params.term, tx = %tx_hash, "CD deposit created");

    Ok(json!({
        "status": "success",
        "txHash": tx_hash,
        "amount": params.amount,
        "term": params.term,
        "message": "CD deposit created successfully",
    }))
}

fn deposit_entry(deposit: &Value) -> Value {
    let field = |name: &str| deposit.get(name).cloned().unwrap_or(Value::Null);
    json!({
        "id": field("id"),
        "amount": from_atomic(atomic_field(deposit, "amount")),
        "interest": from_atomic(atomic_field(deposit, "interest")),
        "term": field("term"),
        "creatingTransactionHash": field("creatingTransactionHash"),
        "spendingTransactionHash": field("spendingTransactionHash"),
        "height": field("height"),
        "unlockHeight": field("unlockHeight"),
        "locked": field("locked"),
    })
}

/// `get-cd-deposits`: empty list when walletd cannot be asked.
pub async fn cd_deposits(supervisor: &Supervisor) -> Value {
    let port = supervisor.config().wallet_rpc_port;
    match supervisor.rpc().call_no_params(port, "getDeposits").await {
        Ok(result) => {
            let deposits: Vec<Value> = result
                .get("deposits")
                .and_then(Value::as_array)
                .map(|list| list.iter().map(deposit_entry).collect())
                .unwrap_or_default();
            json!({ "deposits": deposits })
        }
        Err(e) => {
            warn!("getDeposits failed, reporting no deposits: {}", e);
            json!({ "deposits": [] })
        }
    }
}

/// `withdraw-cd-deposit {depositId}`.
pub async fn withdraw_cd(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: WithdrawParams = parse_params(params)?;

    let result = supervisor
        .rpc()
        .call(
            supervisor.config().wallet_rpc_port,
            "withdrawDeposit",
            json!({ "depositId": params.deposit_id }),
        )
        .await?;
    let tx_hash = result
        .get("transactionHash")
        .cloned()
        .unwrap_or(Value::Null);
    info!(deposit = params.deposit_id, tx = %tx_hash, "CD deposit withdrawn");

    Ok(json!({
        "status": "success",
        "txHash": tx_hash,
        "message": "CD deposit withdrawn successfully",
    }))
}
