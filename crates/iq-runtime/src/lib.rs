//! # IQ Runtime
//!
//! Runs one query session against a loopback peer over an in-memory link.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (TOML file or environment, then CLI overrides)
//! 2. Initialize telemetry
//! 3. Create the link, the session and the loopback peer
//! 4. Start the inbound listener
//! 5. Issue queries and report outcomes
//! 6. Close the session and the link

pub mod config;
pub mod peer;
pub mod runner;

use anyhow::{Context, Result};
use iq_correlator::{IqSession, ListenerSummary};
use shared_bus::memory_link;
use shared_types::Jid;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use config::{PeerConfig, RuntimeConfig};
pub use peer::LoopbackPeer;
pub use runner::{run_queries, RunReport};

/// Result of a full runtime pass.
#[derive(Debug, Clone)]
pub struct RuntimeSummary {
    pub report: RunReport,
    pub listener: ListenerSummary,
    pub answered: u64,
    pub released_on_close: usize,
}

/// Run `queries` queries end to end and tear everything down.
pub async fn run(config: RuntimeConfig, queries: usize) -> Result<RuntimeSummary> {
    let (client, peer_end) = memory_link(config.correlator.link_buffer);
    let client = Arc::new(client);

    let session = Arc::new(
        IqSession::new(config.correlator.clone(), client.clone())
            .context("invalid correlator configuration")?,
    );

    let shutdown = CancellationToken::new();
    let listener = tokio::spawn(session.listener(client.clone()).run(shutdown.clone()));
    let peer = tokio::spawn(LoopbackPeer::new(peer_end, config.peer.clone()).run());

    info!(queries, id_prefix = session.id_prefix(), "Issuing queries");
    let report = run_queries(
        Arc::clone(&session),
        queries,
        Jid::new("peer", "example"),
        &config.peer.deny_namespace,
        &config.peer.silent_namespace,
    )
    .await;
    info!(%report, "Queries finished");

    let released_on_close = session.close();
    client.close();

    let answered = peer.await.context("loopback peer task failed")?;
    let listener = listener.await.context("inbound listener task failed")?;
    shutdown.cancel();
    iq_telemetry::set_pending(session.pending_count());

    Ok(RuntimeSummary {
        report,
        listener,
        answered,
        released_on_close,
    })
}
