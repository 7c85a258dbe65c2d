use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use crate::broker::orchestrator::TokenBroker;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;
use crate::server::request_token::TokenState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub token_state: TokenState,
}

impl AppState {
    pub async fn new(broker: TokenBroker, settings_config: &SettingsConfig) -> Self {
        let metrics = get_metrics().await;
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            token_state: TokenState::new(broker, &settings_config.server.path),
        }
    }
}

/// Token route plus the metrics route when enabled.
pub async fn router(broker: TokenBroker, settings_config: &SettingsConfig) -> Router {
    let state = AppState::new(broker, settings_config).await;
    Router::new()
        .merge(state.token_state.router())
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn start(settings_config: &SettingsConfig, broker: TokenBroker) -> Result<()> {
    let app = router(broker, settings_config).await;

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!("listening on {}, token path {}", bind_addr, settings_config.server.path);

    let metrics = get_metrics().await;
    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;
    metrics.up.set(0);

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
