use axum::{routing::post, Router};
use utoipa::OpenApi;

use crate::{handlers::issue::issue_certificate, state::AppState};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::issue::issue_certificate,
    ),
    components(schemas(crate::models::issue::IssueRequest)),
    tags(
        (name = "Issuing", description = "Certificate issuing APIs")
    ),
)]
pub struct IssuingApi;

pub fn create_router() -> Router<AppState> {
    Router::new().route("/cert", post(issue_certificate))
}
