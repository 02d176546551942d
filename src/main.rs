use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use workspace_alert_bridge::config::Config;
use workspace_alert_bridge::filter::{ResponseTable, Trigger};
use workspace_alert_bridge::http_server::{self, AppState};
use workspace_alert_bridge::sender::WorkspaceClient;
use workspace_alert_bridge::verification::WebhookSigner;

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workspace_alert_bridge=info,tower_http=info".into()),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "starting workspace-alert-bridge");

    // Secrets are checked here, before anything binds.
    let config = Config::from_env().context("failed to load configuration")?;

    let state = build_state(&config)?;

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, api_url = %config.api_url, "listening");

    http_server::serve(listener, state)
        .await
        .context("HTTP server error")?;

    info!("server stopped");
    Ok(())
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let client = WorkspaceClient::from_config(config).context("failed to build HTTP client")?;

    Ok(AppState::new(
        WebhookSigner::new(config.webhook_secret.as_bytes()),
        Trigger::new(config.trigger.clone()),
        ResponseTable::new(config.responses.clone()),
        Arc::new(client),
    )
    .halt_on_auth_failure(config.halt_on_auth_failure))
}
