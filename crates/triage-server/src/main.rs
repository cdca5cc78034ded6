use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use triage_server::config::ServerConfig;
use triage_server::state::AppState;
use triage_store::IncidentStore;

#[tokio::main]
async fn main() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "triage-server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("triage_server=info,triage_core=info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = IncidentStore::open(&config.db_path)?;
    let provider = Arc::new(triage_provider::custom(&config.api_key, &config.base_url));
    let state = AppState::new(provider, store, &config.model);

    triage_server::serve(state, &config.bind).await
}
