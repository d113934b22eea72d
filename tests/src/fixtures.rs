//! # Test Fixtures
//!
//! One wired client per test, built through [`ClientRuntime::wire`] so the
//! tests exercise the same dependency graph as the binary. The chain is
//! the dev chain from vl-01; the content store is the in-memory one from
//! vl-03.

use client_runtime::{ClientRuntime, RuntimeConfig};
use shared_bus::events::ClientEvent;
use shared_bus::subscriber::Subscription;
use shared_evm::units::ether;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use vl_01_wallet_session::{ChainProvider, DevChain, LocalWallet, NetworkRegistry, SessionConfig};
use vl_02_ledger_sync::LedgerConfig;
use vl_03_upload::{ContentStore, MemoryContentStore, UploadConfig};

/// A fully wired client over the dev chain, plus handles to the pieces
/// tests drive directly.
pub struct TestClient {
    /// The simulated chain, for seeding videos and flipping fault knobs.
    pub chain: Arc<DevChain>,
    /// The in-memory content store behind the upload service.
    pub store: Arc<MemoryContentStore>,
    /// The funded signing wallet.
    pub wallet: LocalWallet,
    /// The wired runtime.
    pub runtime: ClientRuntime,
}

/// Subsystem configs tuned for fast polling.
pub fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        session: SessionConfig::for_testing(),
        ledger: LedgerConfig::for_testing(),
        upload: UploadConfig::for_testing(),
        private_key: String::new(),
        use_ipfs: false,
        auto_approve: true,
    }
}

/// A client over a fresh dev chain.
pub fn test_client() -> TestClient {
    client_on(Arc::new(DevChain::new()))
}

/// A client over the given chain, with a freshly funded random wallet.
pub fn client_on(chain: Arc<DevChain>) -> TestClient {
    client_with_wallet(chain, LocalWallet::random())
}

/// A client over the given chain and wallet. The wallet is funded here.
pub fn client_with_wallet(chain: Arc<DevChain>, wallet: LocalWallet) -> TestClient {
    chain.fund(wallet.address(), ether(100));
    let store = Arc::new(MemoryContentStore::new());
    let runtime = ClientRuntime::wire(
        test_config(),
        NetworkRegistry::bundled(),
        Arc::clone(&chain) as Arc<dyn ChainProvider>,
        Arc::new(wallet.clone()),
        Arc::clone(&store) as Arc<dyn ContentStore>,
    );
    TestClient {
        chain,
        store,
        wallet,
        runtime,
    }
}

/// Receive the next event or fail the test.
pub async fn next_event(sub: &mut Subscription) -> ClientEvent {
    timeout(Duration::from_millis(250), sub.recv())
        .await
        .expect("timed out waiting for event")
        .expect("bus closed")
}

/// Poll an async condition until it holds, failing after one second.
pub async fn wait_until<F, Fut>(description: &str, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let outcome = timeout(Duration::from_secs(1), async {
        loop {
            if condition().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(outcome.is_ok(), "timed out waiting for {description}");
}
