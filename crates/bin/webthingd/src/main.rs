//! # webthingd, the Web Thing daemon
//!
//! Composition root that registers Things with the runtime and serves them.
//!
//! ## Responsibilities
//! - Load configuration (`webthing.toml`, env vars)
//! - Initialise `tracing` with the configured filter
//! - Build the Thing runtime and register the demo Things
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT): close every Thing so live
//!   channels end, then let in-flight requests drain
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No Thing logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use webthing_adapter_http_axum::state::AppState;
use webthing_app::runtime::Runtime;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("could not load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Things
    let runtime = Arc::new(Runtime::new(config.runtime.clone()));
    webthing_adapter_virtual::register(&runtime, config.virtual_things())
        .context("could not register demo things")?;

    // HTTP
    let app = webthing_adapter_http_axum::router::build(AppState::new(Arc::clone(&runtime)));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("could not bind {bind_addr}"))?;
    tracing::info!(address = %bind_addr, base_path = runtime.config().href_prefix(), "webthingd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&runtime)))
        .await
        .context("server error")?;

    tracing::info!("webthingd stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM, after closing every Thing.
async fn shutdown_signal(runtime: Arc<Runtime>) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(%err, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown requested");
    runtime.shutdown();
}
