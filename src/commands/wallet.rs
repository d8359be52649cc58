//! Wallet container and account commands.
//!
//! The shell never reads the container itself; it checks for the file, deletes
//! it, and asks walletd for everything else.
//!
//! CHANGELOG:
//! - 10/14/2026 - Secret export requires confirmation; secrets never logged
//! - 10/12/2026 - Initial implementation

use std::io::ErrorKind;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{error_status, parse_params};
use crate::amount::{atomic_field, from_atomic};
use crate::daemon::{first_address, DaemonKind, Supervisor};
use crate::error::{Result, ShellError};
use crate::rpc::RpcError;

#[derive(Debug, Default, Deserialize)]
struct RestoreParams {
    #[serde(default)]
    seed: String,
}

#[derive(Debug, Default, Deserialize)]
struct SecretParams {
    #[serde(default)]
    confirm: bool,
}

/// First string found under any of `names`.
pub(crate) fn string_field(value: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str))
        .map(str::to_string)
}

async fn wallet_exists(supervisor: &Supervisor) -> bool {
    tokio::fs::metadata(supervisor.config().wallet_file())
        .await
        .is_ok()
}

/// `create-wallet`: never touches an existing container.
pub async fn create(supervisor: &Supervisor) -> Result<Value> {
    if wallet_exists(supervisor).await {
        return Ok(json!({
            "status": "exists",
            "message": ShellError::WalletExists.to_string(),
        }));
    }

    let port = supervisor.config().wallet_rpc_port;
    supervisor.rpc().call_no_params(port, "createAddress").await?;
    let addresses = supervisor.rpc().call_no_params(port, "getAddresses").await?;
    let address = first_address(&addresses).unwrap_or_default();

    info!(%address, "wallet created");
    Ok(json!({
        "status": "created",
        "address": address,
        "message": "Wallet created successfully",
    }))
}

/// `delete-wallet`: stop walletd, then remove the container and sidecars.
/// Missing files are not an error.
pub async fn delete(supervisor: &Supervisor) -> Result<Value> {
    supervisor.stop(DaemonKind::Wallet);

    for path in supervisor.config().wallet_files() {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => info!(path = %path.display(), "removed wallet file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(json!({
        "status": "success",
        "message": "Wallet deleted successfully",
    }))
}

/// `restore-wallet`: preconditions are checked, the restore itself is left
/// to the command-line wallet.
pub async fn restore(supervisor: &Supervisor, params: Value) -> Result<Value> {
    let params: RestoreParams = parse_params(params)?;

    if wallet_exists(supervisor).await {
        warn!("restore refused: wallet container present");
        return Ok(error_status(
            "Wallet already exists. Delete existing wallet first.",
        ));
    }
    if params.seed.trim().is_empty() {
        return Err(ShellError::InvalidParams("seed is required".to_string()));
    }

    Err(ShellError::Unsupported(
        "Wallet restore requires restart. Please use command-line wallet for restore.".to_string(),
    ))
}

/// `get-balance`: zeros when walletd cannot be asked.
pub async fn balance(supervisor: &Supervisor) -> Value {
    let port = supervisor.config().wallet_rpc_port;
    match supervisor.rpc().call_no_params(port, "getBalance").await {
        Ok(balance) => json!({
            "available": from_atomic(atomic_field(&balance, "availableBalance")),
            "locked": from_atomic(atomic_field(&balance, "lockedAmount")),
        }),
        Err(e) => {
            warn!("getBalance failed, reporting zero balance: {}", e);
            json!({ "available": 0, "locked": 0 })
        }
    }
}

/// `get-address`: empty string when walletd cannot be asked.
pub async fn address(supervisor: &Supervisor) -> Value {
    let port = supervisor.config().wallet_rpc_port;
    match supervisor.rpc().call_no_params(port, "getAddresses").await {
        Ok(result) => json!({ "address": first_address(&result).unwrap_or_default() }),
        Err(e) => {
            warn!("getAddresses failed, reporting empty address: {}", e);
            json!({ "address": "" })
        }
    }
}

fn check_confirmation(supervisor: &Supervisor, params: Value) -> Result<()> {
    let params: SecretParams = parse_params(params)?;
    if supervisor.config().require_secret_confirmation && !params.confirm {
        return Err(ShellError::ConfirmationRequired);
    }
    Ok(())
}

/// `get-mnemonic`.
pub async fn mnemonic(supervisor: &Supervisor, params: Value) -> Result<Value> {
    check_confirmation(supervisor, params)?;

    let port = supervisor.config().wallet_rpc_port;
    let result = supervisor
        .rpc()
        .call(port, "getMnemonicSeed", json!({ "address": "" }))
        .await?;
    let seed = string_field(&result, &["mnemonicSeed"])
        .ok_or_else(|| RpcError::InvalidResponse("missing mnemonicSeed".to_string()))?;

    info!("mnemonic exported");
    Ok(json!({ "status": "success", "seed": seed }))
}

/// `export-keys`. walletd builds differ on the key field names, both are
/// accepted.
pub async fn export_keys(supervisor: &Supervisor, params: Value) -> Result<Value> {
    check_confirmation(supervisor, params)?;

    let port = supervisor.config().wallet_rpc_port;
    let view = supervisor.rpc().call_no_params(port, "getViewKey").await?;
    let spend = supervisor
        .rpc()
        .call(port, "getSpendKeys", json!({ "address": "" }))
        .await?;

    let view_key = string_field(&view, &["viewSecretKey", "privateViewKey"])
        .ok_or_else(|| RpcError::InvalidResponse("missing view key".to_string()))?;
    let spend_key = string_field(&spend, &["spendSecretKey", "privateSpendKey"])
        .ok_or_else(|| RpcError::InvalidResponse("missing spend key".to_string()))?;

    info!("wallet keys exported");
    Ok(json!({
        "status": "success",
        "viewKey": view_key,
        "spendKey": spend_key,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;

    fn supervisor_in(dir: &std::path::Path) -> Supervisor {
        let mut config = ShellConfig::rooted(dir, dir.join("bin"));
        // nothing listens here
        config.wallet_rpc_port = 9;
        config.rpc_timeout = std::time::Duration::from_secs(2);
        Supervisor::init(config).unwrap()
    }

    #[test]
    fn test_string_field_fallback() {
        let value = json!({"privateViewKey": "abc"});
        assert_eq!(
            string_field(&value, &["viewSecretKey", "privateViewKey"]),
            Some("abc".to_string())
        );
        assert_eq!(string_field(&value, &["spendSecretKey"]), None);
    }

    #[tokio::test]
    async fn test_restore_requires_seed() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        let err = restore(&supervisor, json!({"seed": "  "})).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMS");
    }

    #[tokio::test]
    async fn test_restore_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        let err = restore(&supervisor, json!({"seed": "word ".repeat(25)}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED");
        assert!(err.to_string().contains("command-line wallet"));
    }

    #[tokio::test]
    async fn test_restore_never_overwrites_container() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        let wallet_file = supervisor.config().wallet_file();
        std::fs::create_dir_all(wallet_file.parent().unwrap()).unwrap();
        std::fs::write(&wallet_file, b"container").unwrap();

        let value = restore(&supervisor, json!({"seed": "word ".repeat(25)}))
            .await
            .unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(std::fs::read(&wallet_file).unwrap(), b"container");
    }

    #[tokio::test]
    async fn test_mnemonic_needs_confirmation() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        let err = mnemonic(&supervisor, json!({})).await.unwrap_err();
        assert!(matches!(err, ShellError::ConfirmationRequired));
    }

    #[tokio::test]
    async fn test_export_keys_needs_confirmation() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        let err = export_keys(&supervisor, json!({"confirm": false}))
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::ConfirmationRequired));
    }

    #[tokio::test]
    async fn test_delete_without_wallet_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        let value = delete(&supervisor).await.unwrap();
        assert_eq!(value["status"], "success");
    }

    #[tokio::test]
    async fn test_delete_removes_sidecars() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        supervisor.config().ensure_dirs().unwrap();
        for path in supervisor.config().wallet_files() {
            std::fs::write(&path, b"x").unwrap();
        }

        delete(&supervisor).await.unwrap();
        for path in supervisor.config().wallet_files() {
            assert!(!path.exists(), "{:?} should be gone", path);
        }
    }

    #[tokio::test]
    async fn test_unreachable_balance_is_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(tmp.path());
        assert_eq!(
            balance(&supervisor).await,
            json!({"available": 0, "locked": 0})
        );
        assert_eq!(address(&supervisor).await, json!({"address": ""}));
    }
}
