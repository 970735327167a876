mod api;
mod middleware;

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use revlens_analyzer::Analyzer;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(revlens_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let analyzer = Analyzer::from_config(&config)?;
    // A placeholder key would fail every request; refuse to start instead.
    analyzer.ensure_credential()?;
    tracing::info!(
        env = %config.env,
        model = analyzer.model_name(),
        contract_version = analyzer.contract_version(),
        selector = %analyzer.selector(),
        max_batch_size = analyzer.max_batch_size(),
        "analyzer ready"
    );

    let shutdown = CancellationToken::new();
    let state = AppState {
        analyzer: Arc::new(analyzer),
        analyze_timeout: Duration::from_secs(config.analyze_timeout_secs),
        shutdown: shutdown.clone(),
    };
    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(state, rate_limit, config.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels in-flight analysis runs so the
/// graceful shutdown does not wait on upstream calls.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, cancelling in-flight analyses");
    shutdown.cancel();
}
