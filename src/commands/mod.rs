//! Command surface: UI requests translated into daemon RPC calls or CLI runs.
//!
//! Every known command contains its own failures. Mutating commands answer
//! `{status: "error", message}`; read-only queries answer a zeroed default.
//! Only an unknown method escapes [`dispatch`] as an error.
//!
//! CHANGELOG:
//! - 10/15/2026 - Burn history, CD listing and wallet status
//! - 10/14/2026 - Confirmation gate for mnemonic and key export
//! - 10/12/2026 - Initial command table

pub mod deposits;
pub mod files;
pub mod node;
pub mod proofs;
pub mod transfer;
pub mod wallet;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::daemon::{DaemonKind, Supervisor};
use crate::error::{Result, ShellError};

/// Every method the bridge accepts.
pub const METHODS: &[&str] = &[
    "health",
    "start-node",
    "stop-node",
    "get-node-status",
    "start-wallet-rpc",
    "stop-wallet-rpc",
    "get-wallet-status",
    "create-wallet",
    "delete-wallet",
    "restore-wallet",
    "get-balance",
    "get-address",
    "get-transactions",
    "send-transaction",
    "get-mnemonic",
    "export-keys",
    "create-burn-deposit",
    "get-burn-history",
    "create-cd-deposit",
    "get-cd-deposits",
    "withdraw-cd-deposit",
    "request-elderfier-consensus",
    "generate-stark-proof",
    "save-file",
    "open-dialog",
];

/// Route one request to its handler.
pub async fn dispatch(supervisor: &Supervisor, method: &str, params: Value) -> Result<Value> {
    debug!(method, "dispatching command");

    let outcome = match method {
        "health" => Ok(node::health(supervisor)),
        "start-node" => node::start(supervisor, DaemonKind::Node).await,
        "stop-node" => Ok(node::stop(supervisor, DaemonKind::Node)),
        "get-node-status" => Ok(node::node_status(supervisor).await),
        "start-wallet-rpc" => node::start(supervisor, DaemonKind::Wallet).await,
        "stop-wallet-rpc" => Ok(node::stop(supervisor, DaemonKind::Wallet)),
        "get-wallet-status" => Ok(node::wallet_status(supervisor).await),

        "create-wallet" => wallet::create(supervisor).await,
        "delete-wallet" => wallet::delete(supervisor).await,
        "restore-wallet" => wallet::restore(supervisor, params).await,
        "get-balance" => Ok(wallet::balance(supervisor).await),
        "get-address" => Ok(wallet::address(supervisor).await),
        "get-mnemonic" => wallet::mnemonic(supervisor, params).await,
        "export-keys" => wallet::export_keys(supervisor, params).await,

        "get-transactions" => transfer::transactions(supervisor, params).await,
        "send-transaction" => transfer::send(supervisor, params).await,

        "create-burn-deposit" => deposits::create_burn(supervisor, params).await,
        "get-burn-history" => deposits::burn_history(supervisor, params).await,
        "create-cd-deposit" => deposits::create_cd(supervisor, params).await,
        "get-cd-deposits" => Ok(deposits::cd_deposits(supervisor).await),
        "withdraw-cd-deposit" => deposits::withdraw_cd(supervisor, params).await,

        "request-elderfier-consensus" => proofs::elderfier_consensus(supervisor, params).await,
        "generate-stark-proof" => proofs::stark_proof(supervisor, params).await,

        "save-file" => files::save(supervisor, params).await,
        "open-dialog" => Ok(files::open_dialog(supervisor, params)),

        _ => return Err(ShellError::UnknownMethod(method.to_string())),
    };

    Ok(contain(method, outcome))
}

fn contain(method: &str, outcome: Result<Value>) -> Value {
    match outcome {
        Ok(value) => value,
        Err(e) => {
            warn!(method, code = e.code(), "command failed: {}", e);
            error_status(&e)
        }
    }
}

/// `{status: "error", message}`.
pub fn error_status(message: impl std::fmt::Display) -> Value {
    json!({ "status": "error", "message": message.to_string() })
}

/// Deserialize request params; a missing params object counts as `{}`.
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(params).map_err(|e| ShellError::InvalidParams(e.to_string()))
}
