use axum::{routing::get, Router};

use crate::{
    handlers::doc::{doc_index, openapi_json, OPENAPI_PATH},
    state::AppState,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/doc", get(doc_index))
        .route(OPENAPI_PATH, get(openapi_json))
}
