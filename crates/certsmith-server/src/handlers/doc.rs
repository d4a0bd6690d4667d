use axum::response::{Json, Redirect};
use utoipa::OpenApi;

use crate::routes::ApiDoc;

pub const OPENAPI_PATH: &str = "/doc/openapi.json";

pub async fn doc_index() -> Redirect {
    Redirect::permanent(OPENAPI_PATH)
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
