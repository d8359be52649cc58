//! Node ready → wallet auto-start → wallet ready → wallet-info.

mod common;

use std::time::Duration;

use serde_json::json;

use fuego_desktop::daemon::{DaemonKind, ShellEvent, Supervisor};

const WAIT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn node_ready_chains_into_one_wallet_info() {
    let _guard = common::serial();
    let tmp = tempfile::tempdir().unwrap();
    let bin = tmp.path().join("bin");
    common::fake_node(&bin);
    common::fake_wallet(&bin);

    let (wallet_port, wallet_rpc) = common::spawn_mock_rpc().await;
    wallet_rpc.respond("getAddresses", json!({"addresses": ["fire1mockaddress"]}));

    let mut config = common::test_config(tmp.path(), common::dead_port(), wallet_port);
    config.auto_start_wallet = true;
    let supervisor = Supervisor::init(config).unwrap();
    let mut events = supervisor.subscribe();

    supervisor.start(DaemonKind::Node).unwrap();

    common::expect_event(&mut events, "node-ready", WAIT).await;
    common::expect_event(&mut events, "wallet-ready", WAIT).await;
    let info = common::expect_event(&mut events, "wallet-info", WAIT).await;
    assert_eq!(
        info,
        ShellEvent::WalletInfo {
            address: "fire1mockaddress".to_string(),
            has_wallet: true,
        }
    );

    let later = common::drain_for(&mut events, Duration::from_millis(500)).await;
    assert!(later.iter().all(|e| e.name() != "wallet-info"));
    assert_eq!(wallet_rpc.methods(), vec!["getAddresses"]);
    assert!(supervisor.is_ready(DaemonKind::Wallet));

    supervisor.teardown().await;
}

#[tokio::test]
async fn wallet_does_not_start_before_node_ready() {
    let _guard = common::serial();
    let tmp = tempfile::tempdir().unwrap();
    let bin = tmp.path().join("bin");
    // never prints a readiness marker
    common::write_script(&bin, "fuegod", "echo \"Syncing...\"\nexec sleep 30\n");
    common::fake_wallet(&bin);

    let mut config = common::test_config(tmp.path(), common::dead_port(), common::dead_port());
    config.auto_start_wallet = true;
    let supervisor = Supervisor::init(config).unwrap();

    supervisor.start(DaemonKind::Node).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(supervisor.is_running(DaemonKind::Node));
    assert!(!supervisor.is_running(DaemonKind::Wallet));

    supervisor.teardown().await;
}

#[tokio::test]
async fn empty_wallet_publishes_no_info() {
    let _guard = common::serial();
    let tmp = tempfile::tempdir().unwrap();
    common::fake_wallet(&tmp.path().join("bin"));

    let (wallet_port, wallet_rpc) = common::spawn_mock_rpc().await;
    wallet_rpc.respond("getAddresses", json!({"addresses": []}));

    let supervisor =
        Supervisor::init(common::test_config(tmp.path(), common::dead_port(), wallet_port)).unwrap();
    let mut events = supervisor.subscribe();

    supervisor.start(DaemonKind::Wallet).unwrap();
    supervisor.wait_ready(DaemonKind::Wallet, WAIT).await.unwrap();

    let seen = common::drain_for(&mut events, Duration::from_millis(500)).await;
    assert!(seen.iter().all(|e| e.name() != "wallet-info"));
    assert_eq!(wallet_rpc.methods(), vec!["getAddresses"]);

    supervisor.teardown().await;
}
