use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_app::config::Config;
use news_app::fetcher::Fetcher;
use news_app::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_app=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWS_APP_CONFIG").unwrap_or_else(|_| "news.toml".to_string());
    let mut config = Config::load(&config_path)?;
    if let Ok(api_key) = std::env::var("NEWS_API_KEY") {
        config.api.api_key = api_key;
    }
    info!("Loaded configuration from {}", config_path);

    let request_url = config.api.request_url()?;
    info!("Querying {}", config.api.endpoint);

    let fetcher = Arc::new(Fetcher::new(&config.http, config.field_policy())?);
    let state = Arc::new(AppState::new(
        fetcher,
        request_url,
        config.http.connect_timeout(),
    ));

    // Initial load; later loads are triggered from the page
    tokio::spawn(routes::load_in_background(state.clone()));

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server starting on http://{}", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
