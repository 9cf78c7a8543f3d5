//! # Integration Test Flows
//!
//! One query at a time through `IqSession` over a memory link, with the test
//! playing the peer.
//!
//! ## Flows Tested:
//!
//! 1. **Round trip**: get/set answered with `result`
//! 2. **Error responses**: `type="error"` with and without an `<error/>` child
//! 3. **Unexpected responses**: matching id, wrong type
//! 4. **Abandoned waits**: timeout and caller cancellation release the id
//! 5. **Send failure**: closed link, nothing registered
//! 6. **Fallthrough**: unmatched nodes reach later handlers

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::time::timeout;

    use iq_correlator::{
        CancellationToken, CorrelatorConfig, InfoQuery, IqError, IqSession, TransportError,
    };
    use shared_types::{Jid, Node, NodeContent};

    use crate::integration::harness::Harness;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn peer_jid() -> Jid {
        "peer@example".parse().unwrap()
    }

    fn reply_to(query: &Node, iq_type: &str) -> Node {
        Node::new("iq")
            .with_attr("id", query.attr_str("id").unwrap())
            .with_attr("type", iq_type)
    }

    async fn next_query(harness: &Harness) -> Node {
        timeout(Duration::from_secs(1), harness.peer.recv())
            .await
            .expect("query within 1s")
            .expect("link open")
    }

    // =============================================================================
    // ROUND TRIP
    // =============================================================================

    #[tokio::test]
    async fn test_query_round_trip() {
        let harness = Harness::with_prefix("e2e-");
        let session = harness.session.clone();

        let task = tokio::spawn(async move {
            session
                .query(
                    InfoQuery::get("test", peer_jid())
                        .with_content(vec![Node::new("ping")]),
                )
                .await
        });

        let query = next_query(&harness).await;
        assert_eq!(query.tag, "iq");
        assert_eq!(query.attr_str("id"), Some("e2e-1"));
        assert_eq!(query.attr_str("xmlns"), Some("test"));
        assert_eq!(query.attr_str("type"), Some("get"));
        assert_eq!(query.attr_jid("to"), Some(peer_jid()));
        assert!(query.child_by_tag("ping").is_some());

        let response = reply_to(&query, "result").with_content(vec![Node::new("pong")]);
        harness.peer.send(response.clone()).await.unwrap();

        let result = task.await.unwrap().unwrap();
        assert_eq!(result, response);
        assert_eq!(harness.session.pending_count(), 0);
        assert_eq!(harness.session.stats().delivered, 1);
    }

    #[tokio::test]
    async fn test_explicit_id_round_trip() {
        let harness = Harness::with_prefix("x-");
        let session = harness.session.clone();

        let task = tokio::spawn(async move {
            session
                .query(InfoQuery::set("test", peer_jid()).with_id("chosen-id"))
                .await
        });

        let query = next_query(&harness).await;
        assert_eq!(query.attr_str("id"), Some("chosen-id"));
        assert_eq!(query.attr_str("type"), Some("set"));
        harness.peer.send(reply_to(&query, "result")).await.unwrap();

        assert!(task.await.unwrap().is_ok());
    }

    // =============================================================================
    // ERROR AND UNEXPECTED RESPONSES
    // =============================================================================

    #[tokio::test]
    async fn test_error_response_carries_error_child() {
        let harness = Harness::with_prefix("err-");
        let session = harness.session.clone();
        let task =
            tokio::spawn(async move { session.query(InfoQuery::get("test", peer_jid())).await });

        let query = next_query(&harness).await;
        let response = reply_to(&query, "error").with_content(NodeContent::Nodes(vec![
            Node::new("error")
                .with_attr("code", "503")
                .with_attr("text", "service-unavailable"),
        ]));
        harness.peer.send(response.clone()).await.unwrap();

        match task.await.unwrap() {
            Err(IqError::ErrorResponse {
                code,
                text,
                rendered,
                response: attached,
            }) => {
                assert_eq!(code, Some(503));
                assert_eq!(text.as_deref(), Some("service-unavailable"));
                assert!(rendered.starts_with("<iq"));
                assert!(rendered.contains("service-unavailable"));
                assert_eq!(*attached, response);
            }
            other => panic!("expected error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bare_error_response() {
        let harness = Harness::with_prefix("bare-");
        let session = harness.session.clone();
        let task =
            tokio::spawn(async move { session.query(InfoQuery::get("test", peer_jid())).await });

        let query = next_query(&harness).await;
        harness.peer.send(reply_to(&query, "error")).await.unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            IqError::ErrorResponse {
                code: None,
                text: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unexpected_response_type() {
        let harness = Harness::with_prefix("odd-");
        let session = harness.session.clone();
        let task =
            tokio::spawn(async move { session.query(InfoQuery::get("test", peer_jid())).await });

        let query = next_query(&harness).await;
        harness.peer.send(reply_to(&query, "set")).await.unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), "unexpected_response");
        assert_eq!(err.response().and_then(|n| n.attr_str("type")), Some("set"));
    }

    // =============================================================================
    // ABANDONED WAITS
    // =============================================================================

    #[tokio::test]
    async fn test_timeout_releases_id() {
        let harness = Harness::with_prefix("to-");

        let started = Instant::now();
        let err = harness
            .session
            .query(InfoQuery::get("test", peer_jid()).with_timeout(Duration::from_millis(10)))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(started.elapsed() >= Duration::from_millis(10));
        assert!(!harness.session.registry().contains("to-1"));

        // The late answer is not consumed by the correlator.
        let query = next_query(&harness).await;
        assert!(!harness
            .session
            .correlator()
            .receive_response(&reply_to(&query, "result")));
    }

    #[tokio::test]
    async fn test_cancellation_releases_id() {
        let harness = Harness::with_prefix("cx-");
        let token = CancellationToken::new();
        let session = harness.session.clone();
        let query_token = token.clone();

        let task = tokio::spawn(async move {
            session
                .query(InfoQuery::get("test", peer_jid()).with_cancellation(query_token))
                .await
        });

        let _query = next_query(&harness).await;
        assert!(harness.session.registry().contains("cx-1"));
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, IqError::Canceled));
        assert!(!harness.session.registry().contains("cx-1"));
    }

    #[tokio::test]
    async fn test_dropped_query_future_releases_id() {
        let harness = Harness::with_prefix("drop-");
        let session = harness.session.clone();

        let task = tokio::spawn(async move { session.query(InfoQuery::get("test", peer_jid())).await });
        let _query = next_query(&harness).await;
        assert_eq!(harness.session.pending_count(), 1);

        task.abort();
        let _ = task.await;
        assert_eq!(harness.session.pending_count(), 0);
    }

    // =============================================================================
    // SEND FAILURE
    // =============================================================================

    #[tokio::test]
    async fn test_send_failure_leaves_nothing_registered() {
        let harness = Harness::with_prefix("sf-");
        harness.client.close();

        let err = harness
            .session
            .query(InfoQuery::get("test", peer_jid()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IqError::SendFailed(TransportError::NotConnected)
        ));
        assert!(!harness
            .session
            .correlator()
            .receive_response(&Node::new("iq").with_attr("id", "sf-1")));
        assert_eq!(harness.session.stats().canceled, 1);
    }

    // =============================================================================
    // FALLTHROUGH AND TEARDOWN
    // =============================================================================

    #[tokio::test]
    async fn test_unmatched_nodes_reach_later_handlers() {
        let (client, peer) = shared_bus::memory_link(8);
        let client = Arc::new(client);
        let session = IqSession::new(CorrelatorConfig::default(), client.clone()).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let listener = session.listener(client).with_handler(move |node: &Node| {
            counter.fetch_add(1, Ordering::SeqCst);
            node.tag == "message"
        });
        let task = tokio::spawn(listener.run(CancellationToken::new()));

        peer.send(Node::new("message").with_attr("id", "m-1")).await.unwrap();
        peer.send(Node::new("iq").with_attr("id", "nobody").with_attr("type", "result"))
            .await
            .unwrap();
        peer.close();
        drop(peer);

        let summary = task.await.unwrap();
        assert_eq!(summary.received, 2);
        assert_eq!(summary.unhandled, 1);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(session.stats().unmatched, 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_listener_without_draining() {
        let harness = Harness::with_prefix("sd-");
        let pending = harness
            .session
            .query_async(&InfoQuery::get("test", peer_jid()))
            .await
            .unwrap();

        harness.shutdown.cancel();
        let summary = harness.listener.await.unwrap();
        assert_eq!(summary.drained, 0);
        assert!(harness.session.registry().contains(&pending.id));
        assert!(!harness.session.is_closed());
    }

    #[tokio::test]
    async fn test_peer_disconnect_fails_waiting_query() {
        let harness = Harness::with_prefix("dc-");
        let session = harness.session.clone();
        let task =
            tokio::spawn(async move { session.query(InfoQuery::get("test", peer_jid())).await });

        let _query = next_query(&harness).await;
        let Harness { peer, listener, .. } = harness;
        peer.close();
        drop(peer);

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, IqError::Disconnected));
        assert_eq!(listener.await.unwrap().drained, 1);
    }
}
