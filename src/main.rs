use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use cinematch::config::Config;
use cinematch::db::JsonFileStore;
use cinematch::services::gateway::HttpGateway;
use cinematch::services::session::Session;
use cinematch::ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let gateway = Arc::new(HttpGateway::new(
        config.api_base_url.clone(),
        Duration::from_secs(config.recs_timeout_secs),
    ));
    let store = Arc::new(JsonFileStore::new(&config.store_path));
    let session = Session::new(gateway, store, Duration::from_millis(config.intro_delay_ms));

    session.start().await;
    ui::run(&session).await
}
