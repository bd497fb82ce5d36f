mod common;

use std::sync::Arc;

use tokio::sync::Notify;

use hype_presale_core::{
    ConnectOutcome, Environment, FlowError, NetworkType, PortError, ReconcileState,
};

use common::{new_orchestrator, other_address, owner_address, Call, ScriptedProvider};

fn mobile() -> Environment {
    Environment {
        is_mobile: true,
        host: "presale.example".to_owned(),
        path: "/buy".to_owned(),
    }
}

#[tokio::test]
async fn missing_provider_on_mobile_redirects_to_wallet_app() {
    let provider = ScriptedProvider::unavailable();
    let orch = new_orchestrator(provider.clone());

    let outcome = orch.connect(&mobile()).await.expect("redirect");
    assert_eq!(
        outcome,
        ConnectOutcome::RedirectToWallet {
            url: "https://metamask.app.link/dapp/presale.example/buy".to_owned()
        }
    );
    assert!(provider.calls().is_empty());
    assert!(orch.snapshot().expect("snapshot").connection.wallet_address.is_none());
}

#[tokio::test]
async fn missing_provider_on_desktop_is_unavailable() {
    let orch = new_orchestrator(ScriptedProvider::unavailable());
    let err = orch
        .connect(&Environment::default())
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        FlowError::Port(PortError::ProviderUnavailable(ref msg)) if msg.contains("MetaMask")
    ));
}

#[tokio::test]
async fn rejected_account_request_leaves_state_unchanged() {
    let provider = ScriptedProvider::on_chain(999).with(|w| w.reject_accounts = true);
    let orch = new_orchestrator(provider.clone());
    let before = orch.snapshot().expect("snapshot");

    let err = orch
        .connect(&Environment::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FlowError::Port(PortError::UserRejected(_))));
    assert_eq!(orch.snapshot().expect("snapshot"), before);
    assert_eq!(provider.calls(), vec![Call::RequestAccounts]);
}

#[tokio::test]
async fn empty_account_list_is_treated_as_rejection() {
    let provider = ScriptedProvider::on_chain(999).with(|w| w.accounts.clear());
    let orch = new_orchestrator(provider);
    let err = orch
        .connect(&Environment::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FlowError::Port(PortError::UserRejected(_))));
    assert!(orch.snapshot().expect("snapshot").connection.wallet_address.is_none());
}

#[tokio::test]
async fn connect_sets_first_account_and_chain() {
    let provider = ScriptedProvider::on_chain(999).with(|w| w.accounts.push(other_address()));
    let orch = new_orchestrator(provider);

    let outcome = orch.connect(&Environment::default()).await.expect("connect");
    assert_eq!(
        outcome,
        ConnectOutcome::Connected {
            address: owner_address(),
            chain_id: Some(999),
        }
    );
}

#[tokio::test]
async fn connect_is_not_reentrant_once_connected() {
    let provider = ScriptedProvider::on_chain(999);
    let orch = new_orchestrator(provider.clone());
    orch.connect(&Environment::default()).await.expect("connect");

    let err = orch
        .connect(&Environment::default())
        .await
        .expect_err("second connect");
    assert_eq!(err, FlowError::AlreadyConnected);
    assert_eq!(provider.count(|c| *c == Call::RequestAccounts), 1);
}

#[tokio::test]
async fn overlapping_operations_are_rejected_while_connect_is_pending() {
    let gate = Arc::new(Notify::new());
    let provider = ScriptedProvider {
        accounts_gate: Some(Arc::clone(&gate)),
        ..ScriptedProvider::on_chain(999)
    };
    let orch = new_orchestrator(provider.clone());
    let env = Environment::default();

    let (first, second, selected, ()) = tokio::join!(
        orch.connect(&env),
        orch.connect(&env),
        async { orch.select_network(NetworkType::Testnet) },
        async {
            tokio::task::yield_now().await;
            gate.notify_one();
        }
    );

    assert!(matches!(first, Ok(ConnectOutcome::Connected { .. })));
    assert_eq!(second, Err(FlowError::Busy));
    assert_eq!(selected, Err(FlowError::Busy));
    assert_eq!(provider.count(|c| *c == Call::RequestAccounts), 1);
    assert!(orch.snapshot().expect("snapshot").in_flight.is_none());
}

#[tokio::test]
async fn chain_change_event_downgrades_and_restores_match() {
    let provider = ScriptedProvider::on_chain(999);
    let orch = new_orchestrator(provider.clone());
    orch.connect(&Environment::default()).await.expect("connect");

    provider.user_switches_to(1);
    let summary = orch.apply_provider_events().expect("apply events");
    assert_eq!(summary.drained_events, 1);
    assert!(summary.chain_changed);
    let snapshot = orch.snapshot().expect("snapshot");
    assert_eq!(snapshot.reconcile, ReconcileState::Mismatched);
    assert_eq!(snapshot.connection.active_chain_id, Some(1));

    provider.user_switches_to(999);
    orch.apply_provider_events().expect("apply events");
    assert_eq!(orch.snapshot().expect("snapshot").reconcile, ReconcileState::Matched);

    // No switch was requested on the user's behalf.
    assert_eq!(provider.count(|c| matches!(c, Call::Switch(_))), 0);
}

#[tokio::test]
async fn account_events_replace_or_clear_the_session() {
    let provider = ScriptedProvider::on_chain(999);
    let orch = new_orchestrator(provider.clone());
    orch.connect(&Environment::default()).await.expect("connect");

    provider.user_changes_accounts(vec![other_address()]);
    let summary = orch.apply_provider_events().expect("apply events");
    assert!(summary.accounts_changed);
    assert!(!summary.session_cleared);
    assert_eq!(
        orch.snapshot().expect("snapshot").connection.wallet_address,
        Some(other_address())
    );

    provider.user_changes_accounts(vec![]);
    let summary = orch.apply_provider_events().expect("apply events");
    assert!(summary.session_cleared);
    let snapshot = orch.snapshot().expect("snapshot");
    assert!(snapshot.connection.wallet_address.is_none());
    assert!(snapshot.connection.active_chain_id.is_none());
    assert_eq!(snapshot.reconcile, ReconcileState::Unknown);
}

#[tokio::test]
async fn events_before_connect_do_not_create_a_session() {
    let provider = ScriptedProvider::on_chain(999);
    let orch = new_orchestrator(provider.clone());

    provider.user_changes_accounts(vec![other_address()]);
    provider.user_switches_to(999);
    let summary = orch.apply_provider_events().expect("apply events");
    assert_eq!(summary.drained_events, 2);
    let snapshot = orch.snapshot().expect("snapshot");
    assert!(snapshot.connection.wallet_address.is_none());
    assert!(snapshot.connection.active_chain_id.is_none());
}
