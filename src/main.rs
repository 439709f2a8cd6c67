use flowsplit::{api, config::Config, EventSource, IndexerClient};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    let indexer = IndexerClient::new(
        config.indexer_base_url.clone(),
        config.flow_network.clone(),
        config.contract.clone(),
    )
    .with_auth(config.indexer_auth())
    .with_retry_budget(config.indexer_retry_max);
    let events: Arc<dyn EventSource> = Arc::new(indexer);

    tracing::info!(
        "Using {} profile against {} ({}), contract {}.{}",
        config.split_profile.as_str(),
        config.indexer_base_url,
        config.flow_network,
        config.contract.address,
        config.contract.name
    );

    // Create router
    let app = api::create_router(api::AppState::new(config, events));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
