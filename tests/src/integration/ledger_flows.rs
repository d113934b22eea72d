//! # Ledger Flows
//!
//! Catalog materialization through the wired runtime: pinned snapshot
//! scans, live append events, and the idempotent merge that keeps replays
//! from duplicating entries.

#[cfg(test)]
mod tests {
    use crate::fixtures::{client_on, next_event, test_client, wait_until};
    use shared_bus::events::{ClientEvent, EventFilter, EventTopic};
    use shared_bus::publisher::EventPublisher;
    use shared_types::entities::Address;
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;
    use vl_01_wallet_session::DevChain;

    fn author(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[tokio::test]
    async fn test_snapshot_matches_the_pinned_block() {
        let chain = Arc::new(DevChain::new());
        chain.append_video("QmA", "first", author(0xaa));
        chain.append_video("QmB", "second", author(0xaa));
        // This one lands between the count read and the item reads.
        chain.queue_append("QmC", "third", author(0xbb));
        let client = client_on(chain);

        client.runtime.start().await.unwrap();
        let ledger = client.runtime.ledger();
        assert_eq!(ledger.video_count().await, 2);
        let titles: Vec<_> = ledger
            .videos()
            .await
            .iter()
            .map(|v| v.title.clone())
            .collect();
        assert_eq!(titles, vec!["second", "first"]);

        // The mid-scan append arrives through the watcher instead.
        wait_until("the queued append to arrive", || {
            let ledger = client.runtime.ledger();
            async move { ledger.video_count().await == 3 }
        })
        .await;
        let newest = client.runtime.ledger().videos().await;
        assert_eq!(newest.first().unwrap().title, "third");
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_live_appends_arrive_in_order() {
        let client = test_client();
        client.runtime.start().await.unwrap();
        let mut sub = client
            .runtime
            .bus()
            .subscribe(EventFilter::topics(vec![EventTopic::LedgerSync]));

        client.chain.append_video("QmX", "one", author(0x11));
        client.chain.append_video("QmY", "two", author(0x11));

        match next_event(&mut sub).await {
            ClientEvent::VideoAppended { video, .. } => assert_eq!(video.title, "one"),
            other => panic!("unexpected event: {other:?}"),
        }
        match next_event(&mut sub).await {
            ClientEvent::VideoAppended { video, .. } => assert_eq!(video.title, "two"),
            other => panic!("unexpected event: {other:?}"),
        }

        let ids: Vec<_> = client
            .runtime
            .ledger()
            .videos()
            .await
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_replayed_confirmations_do_not_duplicate() {
        let client = test_client();
        client.runtime.start().await.unwrap();
        client.chain.append_video("QmX", "solo", author(0x11));
        wait_until("the append to arrive", || {
            let ledger = client.runtime.ledger();
            async move { ledger.video_count().await == 1 }
        })
        .await;

        // Replaying the confirmation through the upload feed must be a
        // no-op: the id is already held.
        let video = client.runtime.ledger().videos().await[0].clone();
        client
            .runtime
            .bus()
            .publish(ClientEvent::UploadConfirmed {
                submission_id: Uuid::new_v4(),
                video: video.clone(),
                block_number: 1,
            })
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let held = client.runtime.ledger().videos().await;
        assert_eq!(held, vec![video]);
        client.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_scan_failure_keeps_the_previous_catalog() {
        let client = test_client();
        client.chain.append_video("QmX", "kept", author(0x11));
        client.runtime.start().await.unwrap();
        assert_eq!(client.runtime.ledger().video_count().await, 1);

        client.chain.set_fail_calls(true);
        assert!(client.runtime.ledger().load_videos().await.is_err());

        let held = client.runtime.ledger().videos().await;
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].title, "kept");
        client.runtime.shutdown().await;
    }
}
