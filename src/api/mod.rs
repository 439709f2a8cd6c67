pub mod health;
pub mod split;
pub mod summary;
pub mod transactions;

use crate::config::Config;
use crate::datasource::EventSource;
use crate::domain::Address;
use crate::engine::SplitProfile;
use crate::error::AppError;
use axum::{
    routing::{get, post},
    Router,
};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub events: Arc<dyn EventSource>,
    pub profile: SplitProfile,
}

impl AppState {
    pub fn new(config: Config, events: Arc<dyn EventSource>) -> Self {
        let profile = config.profile();
        Self {
            config,
            events,
            profile,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/transactions/:address",
            get(transactions::get_transactions),
        )
        .route("/v1/split/adjust", post(split::adjust))
        .route("/v1/split/suggest", post(split::suggest))
        .route("/v1/split/assemble", post(split::assemble))
        .route("/v1/summary/:address", get(summary::get_summary))
        .layer(cors)
        .with_state(state)
}

pub(crate) fn parse_address(raw: &str) -> Result<Address, AppError> {
    Address::from_str(raw.trim()).map_err(|_| AppError::BadRequest("Invalid Flow address".into()))
}
