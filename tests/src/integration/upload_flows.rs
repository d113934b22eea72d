//! # Upload Flows
//!
//! The two-phase submission end to end: content store, signed
//! transaction, authoritative confirmation, and the failure paths that
//! must leave the form re-submittable.

#[cfg(test)]
mod tests {
    use crate::fixtures::{client_with_wallet, test_client, wait_until};
    use shared_evm::tx::TypedTransaction;
    use shared_types::entities::UploadPhase;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use vl_01_wallet_session::{DevChain, LocalWallet};
    use vl_03_upload::UploadError;

    #[tokio::test]
    async fn test_intro_upload_lands_exactly_once() {
        let client = test_client();
        client.runtime.start().await.unwrap();

        let uploads = client.runtime.uploads();
        uploads.buffer_video(vec![0x00, 0x01]).await;
        let video = uploads.submit("Intro").await.unwrap();

        assert_eq!(video.id, 1);
        assert_eq!(video.title, "Intro");
        assert_eq!(video.author, client.wallet.address());
        let parsed: cid::Cid = video.hash.parse().unwrap();
        assert_eq!(client.store.get(&parsed), Some(vec![0x00, 0x01]));

        wait_until("the confirmation to reach the catalog", || {
            let ledger = client.runtime.ledger();
            async move { ledger.video_count().await == 1 }
        })
        .await;
        let held = client.runtime.ledger().videos().await;
        assert_eq!(held, vec![video]);
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_catalog_tracks_video_count_after_each_upload() {
        let client = test_client();
        client.runtime.start().await.unwrap();
        let session = client.runtime.sessions().current().await.unwrap();
        let contract = *session.contract();

        for (i, title) in ["one", "two", "three"].into_iter().enumerate() {
            let uploads = client.runtime.uploads();
            uploads
                .buffer_video(format!("payload {i}").into_bytes())
                .await;
            uploads.submit(title).await.unwrap();

            let want = i + 1;
            wait_until("the catalog to absorb the upload", || {
                let ledger = client.runtime.ledger();
                async move { ledger.video_count().await == want }
            })
            .await;

            let data = session
                .provider()
                .call(contract.address(), contract.video_count_call(), None)
                .await
                .unwrap();
            let on_chain = contract.decode_video_count(&data).unwrap();
            assert_eq!(client.runtime.ledger().video_count().await as u64, on_chain);
        }
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_inputs_never_reach_the_chain() {
        let client = test_client();
        client.runtime.start().await.unwrap();
        let uploads = client.runtime.uploads();

        uploads.buffer_video(vec![0x01]).await;
        assert!(matches!(
            uploads.submit("   ").await,
            Err(UploadError::EmptyTitle)
        ));
        assert!(matches!(
            uploads.submit_hash("", "Intro").await,
            Err(UploadError::EmptyCid)
        ));

        assert_eq!(client.chain.transactions_sent(), 0);
        assert!(client.store.is_empty());
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_denied_signature_leaves_the_form_resubmittable() {
        let approve = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&approve);
        let wallet = LocalWallet::random()
            .with_approval(Arc::new(move |_: &TypedTransaction| gate.load(Ordering::Relaxed)));
        let client = client_with_wallet(Arc::new(DevChain::new()), wallet);
        client.runtime.start().await.unwrap();

        let uploads = client.runtime.uploads();
        uploads.buffer_video(b"clip".to_vec()).await;
        let err = uploads.submit("Intro").await.unwrap_err();
        assert!(matches!(err, UploadError::Denied(_)));
        assert_eq!(uploads.phase().await, UploadPhase::Failed);
        assert_eq!(client.runtime.ledger().video_count().await, 0);
        assert_eq!(client.chain.transactions_sent(), 0);

        // Approved on retry; the buffer survived the denial.
        approve.store(true, Ordering::Relaxed);
        let video = uploads.submit("Intro").await.unwrap();
        assert_eq!(video.id, 1);

        wait_until("the retried upload to land", || {
            let ledger = client.runtime.ledger();
            async move { ledger.video_count().await == 1 }
        })
        .await;
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_disconnect_mid_pending_resolves_the_wait() {
        let client = test_client();
        client.runtime.start().await.unwrap();
        client.chain.set_hold_receipts(true);

        let uploads = client.runtime.uploads();
        uploads.buffer_video(b"clip".to_vec()).await;
        let task = tokio::spawn({
            let uploads = Arc::clone(&uploads);
            async move { uploads.submit("Pending").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.runtime.shutdown().await;

        let outcome = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("pending wait never resolved")
            .unwrap();
        assert!(matches!(outcome, Err(UploadError::SessionClosed)));
        assert_eq!(client.runtime.ledger().video_count().await, 0);
    }
}
