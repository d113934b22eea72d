//! # Session Flows
//!
//! The wallet connection lifecycle through the wired runtime:
//! establishment, balance refresh, unsupported networks, and teardown
//! signaling.

#[cfg(test)]
mod tests {
    use crate::fixtures::{client_on, next_event, test_client};
    use shared_bus::events::{ClientEvent, EventFilter, EventTopic};
    use std::sync::Arc;
    use vl_01_wallet_session::domain::messages::{
        CODE_BALANCE_UNAVAILABLE, CODE_NETWORK_NOT_SUPPORTED,
    };
    use vl_01_wallet_session::DevChain;

    #[tokio::test]
    async fn test_connect_establishes_and_binds_the_contract() {
        let client = test_client();
        let mut sub = client
            .runtime
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::WalletSession]));

        let session = client.runtime.start().await.unwrap();
        assert_eq!(session.account(), client.wallet.address());
        assert_eq!(session.chain_id(), 31337);
        assert_eq!(session.contract().address(), client.chain.contract_address());

        match next_event(&mut sub).await {
            ClientEvent::SessionEstablished(info) => {
                assert_eq!(info.account, client.wallet.address());
                assert_eq!(info.network_label, "Hardhat");
                assert_eq!(info.contract_address, client.chain.contract_address());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_balance_refresh_publishes_the_amount() {
        let client = test_client();
        client.runtime.start().await.unwrap();
        let mut sub = client
            .runtime
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::WalletSession]));

        let balance = client.runtime.sessions().refresh_balance().await.unwrap();
        assert!(balance.is_some());

        match next_event(&mut sub).await {
            ClientEvent::BalanceUpdated {
                account,
                balance_wei,
            } => {
                assert_eq!(account, client.wallet.address());
                assert_eq!(balance_wei, balance);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_balance_failure_leaves_the_session_up() {
        let client = test_client();
        client.runtime.start().await.unwrap();
        client.chain.set_fail_balance(true);

        let balance = client.runtime.sessions().refresh_balance().await.unwrap();
        assert!(balance.is_none());
        assert!(client.runtime.sessions().current().await.is_some());

        let notices = client.runtime.sessions().notifications();
        assert_eq!(notices.last().unwrap().code, CODE_BALANCE_UNAVAILABLE);
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_unsupported_network_blocks_the_session() {
        let client = client_on(Arc::new(DevChain::on_chain(999)));

        assert!(client.runtime.start().await.is_err());
        assert!(client.runtime.sessions().current().await.is_none());

        let notices = client.runtime.sessions().notifications();
        assert_eq!(notices.last().unwrap().code, CODE_NETWORK_NOT_SUPPORTED);
    }

    #[tokio::test]
    async fn test_shutdown_closes_the_session_and_signals_waiters() {
        let client = test_client();
        let session = client.runtime.start().await.unwrap();
        let mut sub = client
            .runtime
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::WalletSession]));

        client.runtime.shutdown().await;
        assert!(session.is_closed());
        assert!(client.runtime.sessions().current().await.is_none());

        match next_event(&mut sub).await {
            ClientEvent::SessionClosed { account } => {
                assert_eq!(account, client.wallet.address());
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // A second disconnect is a no-op: no session, no event.
        client.runtime.sessions().disconnect().await;
        assert!(sub.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reconnect_replaces_the_live_session() {
        let client = test_client();
        let first = client.runtime.sessions().connect().await.unwrap();
        let second = client.runtime.sessions().connect().await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(first.is_closed());
        assert!(!second.is_closed());
        client.runtime.shutdown().await;
    }
}
