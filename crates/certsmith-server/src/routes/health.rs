use axum::{routing::get, Router};

use crate::{handlers::health::health, state::AppState};

pub fn create_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
