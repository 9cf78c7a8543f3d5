//! # Concurrency Flows
//!
//! Many queries in flight on one session:
//!
//! 1. **Out-of-order answers**: every caller gets its own response
//! 2. **Id uniqueness**: concurrent generation across tasks
//! 3. **Mixed outcomes**: one failure never disturbs other requests
//! 4. **Delivery/cancel races**: exactly one terminal event per request
//! 5. **Teardown**: close releases every waiter

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use rand::seq::SliceRandom;

    use iq_correlator::{
        CorrelatorConfig, InfoQuery, IqError, RequestIdGenerator, WaiterRegistry, WaiterSignal,
    };
    use shared_types::{Jid, Node};

    use crate::integration::harness::Harness;

    fn to() -> Jid {
        Jid::new("peer", "example")
    }

    fn result_for(query: &Node) -> Node {
        Node::new("iq")
            .with_attr("id", query.attr_str("id").unwrap())
            .with_attr("type", "result")
            .with_attr("echo", query.attr_str("xmlns").unwrap())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_out_of_order_responses_reach_their_callers() {
        const N: usize = 64;
        let harness = Harness::with_prefix("ooo-");

        let tasks: Vec<_> = (0..N)
            .map(|n| {
                let session = harness.session.clone();
                tokio::spawn(async move {
                    let ns = format!("ns-{n}");
                    let node = session.query(InfoQuery::get(ns.clone(), to())).await?;
                    Ok::<_, IqError>((ns, node))
                })
            })
            .collect();

        let mut queries = Vec::with_capacity(N);
        for _ in 0..N {
            queries.push(harness.peer.recv().await.unwrap());
        }
        queries.shuffle(&mut rand::thread_rng());
        for query in &queries {
            harness.peer.send(result_for(query)).await.unwrap();
        }

        for task in tasks {
            let (ns, node) = task.await.unwrap().unwrap();
            assert_eq!(node.attr_str("echo"), Some(ns.as_str()));
        }
        assert_eq!(harness.session.pending_count(), 0);
        assert_eq!(harness.session.stats().delivered, N as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ids_are_distinct() {
        let ids = Arc::new(RequestIdGenerator::random());

        let batches = join_all((0..16).map(|_| {
            let ids = ids.clone();
            tokio::spawn(async move { (0..250).map(|_| ids.next_id()).collect::<Vec<_>>() })
        }))
        .await;

        let mut seen = HashSet::new();
        for batch in batches {
            for id in batch.unwrap() {
                assert!(id.starts_with(ids.prefix()));
                assert!(seen.insert(id), "duplicate id");
            }
        }
        assert_eq!(seen.len(), 16 * 250);
        assert_eq!(ids.issued(), 16 * 250);
    }

    #[tokio::test]
    async fn test_mixed_outcomes_are_independent() {
        let harness = Harness::start(
            CorrelatorConfig::default()
                .with_id_prefix("mix-")
                .with_default_timeout(Duration::from_millis(100)),
        );

        let session = harness.session.clone();
        let answered =
            tokio::spawn(async move { session.query(InfoQuery::get("answered", to())).await });
        let session = harness.session.clone();
        let denied =
            tokio::spawn(async move { session.query(InfoQuery::get("denied", to())).await });
        let session = harness.session.clone();
        let ignored =
            tokio::spawn(async move { session.query(InfoQuery::get("ignored", to())).await });

        for _ in 0..3 {
            let query = harness.peer.recv().await.unwrap();
            match query.attr_str("xmlns") {
                Some("answered") => harness.peer.send(result_for(&query)).await.unwrap(),
                Some("denied") => {
                    let mut reply = result_for(&query);
                    reply = reply.with_attr("type", "error");
                    harness.peer.send(reply).await.unwrap();
                }
                _ => {}
            }
        }

        assert!(answered.await.unwrap().is_ok());
        assert!(matches!(
            denied.await.unwrap(),
            Err(IqError::ErrorResponse { .. })
        ));
        assert!(ignored.await.unwrap().unwrap_err().is_timeout());
        assert_eq!(harness.session.pending_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_deliver_cancel_race_has_one_winner() {
        let registry = WaiterRegistry::new();

        for round in 0..200 {
            let id = format!("race-{round}");
            let waiter = registry.register(&id).unwrap();

            let deliverer = {
                let registry = registry.clone();
                let id = id.clone();
                tokio::spawn(async move { registry.deliver(&id, Node::new("iq")) })
            };
            let canceller = {
                let registry = registry.clone();
                let id = id.clone();
                tokio::spawn(async move { registry.cancel(&id) })
            };

            let delivered = deliverer.await.unwrap();
            let canceled = canceller.await.unwrap();
            assert!(delivered ^ canceled, "exactly one terminal event");

            match waiter.await {
                WaiterSignal::Response(_) => assert!(delivered),
                WaiterSignal::Canceled => assert!(canceled),
                WaiterSignal::Disconnected => panic!("not drained"),
            }
            assert!(!registry.contains(&id));
        }
    }

    #[tokio::test]
    async fn test_close_releases_every_waiter() {
        let harness = Harness::with_prefix("close-");

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let session = harness.session.clone();
                tokio::spawn(async move { session.query(InfoQuery::get("test", to())).await })
            })
            .collect();
        for _ in 0..10 {
            harness.peer.recv().await.unwrap();
        }

        assert_eq!(harness.session.close(), 10);
        for task in tasks {
            assert!(matches!(task.await.unwrap(), Err(IqError::Disconnected)));
        }

        let err = harness
            .session
            .query(InfoQuery::get("test", to()))
            .await
            .unwrap_err();
        assert!(matches!(err, IqError::Disconnected));
        assert_eq!(harness.session.stats().drained, 10);
    }
}
