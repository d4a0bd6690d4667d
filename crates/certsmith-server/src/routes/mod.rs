mod doc;
mod health;
mod issuing;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{routes::issuing::IssuingApi, state::AppState};

#[derive(OpenApi)]
#[openapi(
    info(title = "certsmith", description = "X.509 certificate issuing service"),
    paths(crate::handlers::health::health),
    nest(
        (path = "/issuing", api = IssuingApi),
    ),
    tags(
        (name = "Health", description = "Health APIs")
    ),
)]
pub struct ApiDoc;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .merge(health::create_router())
        .merge(doc::create_router())
        .nest("/issuing", issuing::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use certsmith_core::{
        Issuer, IssuerConfig, RecordingInvoker, ScratchRoot, ToolStep,
    };
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "certsmith-test-boundary";
    const CONFIG: &[u8] = b"[req]\ndistinguished_name=dn\n[dn]\nCN=example.com\n";

    struct TestApp {
        _temp_dir: TempDir,
        invoker: Arc<RecordingInvoker>,
        router: Router,
    }

    fn app(invoker: RecordingInvoker) -> TestApp {
        let temp_dir = TempDir::new().unwrap();
        let root_cert = temp_dir.path().join("root.crt");
        let root_key = temp_dir.path().join("root.key");
        std::fs::write(&root_cert, b"ROOT").unwrap();
        std::fs::write(&root_key, b"KEY").unwrap();
        let scratch = ScratchRoot::init(temp_dir.path().join("scratch")).unwrap();

        let invoker = Arc::new(invoker);
        let issuer =
            Issuer::new(IssuerConfig::new(root_cert, root_key, scratch, invoker.clone())).unwrap();
        let router = create_routes(AppState::new(issuer, None));
        TestApp {
            _temp_dir: temp_dir,
            invoker,
            router,
        }
    }

    fn form(days: &str, files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"days\"\r\n\r\n{days}\r\n"
            )
            .as_bytes(),
        );
        for (name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.pem\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn issue_request(accept: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/issuing/cert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn error_message(response: axum::response::Response) -> String {
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_issue_from_config_returns_tar() {
        let app = app(RecordingInvoker::new());
        let response = app
            .router
            .oneshot(issue_request(Some("*/*"), form("365", &[("config", CONFIG)])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/x-tar"
        );

        let bytes = body_bytes(response).await;
        let mut archive = tar::Archive::new(&bytes[..]);
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["server.conf", "prv.pem", "pub.pem", "csr.pem", "cert.pem", "ca-cert.pem"]
        );
        assert_eq!(app.invoker.invocations().len(), 4);
    }

    #[tokio::test]
    async fn test_issue_from_csr_returns_zip() {
        let app = app(RecordingInvoker::new());
        let response = app
            .router
            .oneshot(issue_request(
                Some("application/zip"),
                form("30", &[("csr", &b"-----BEGIN CERTIFICATE REQUEST-----\n"[..])]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");

        let bytes = body_bytes(response).await;
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"csr.pem"));
        assert!(!names.contains(&"prv.pem"));
        assert!(!names.contains(&"server.conf"));
    }

    #[tokio::test]
    async fn test_both_inputs_rejected_before_issuing() {
        let app = app(RecordingInvoker::new());
        let response = app
            .router
            .oneshot(issue_request(
                None,
                form("30", &[("csr", &b"csr"[..]), ("config", CONFIG)]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(response)
            .await
            .contains("either should be present csr or config"));
        assert!(app.invoker.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_zero_days_rejected() {
        let app = app(RecordingInvoker::new());
        let response = app
            .router
            .oneshot(issue_request(None, form("0", &[("config", CONFIG)])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.invoker.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_accept_is_406() {
        let app = app(RecordingInvoker::new());
        let response = app
            .router
            .oneshot(issue_request(
                Some("text/html"),
                form("30", &[("config", CONFIG)]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert!(app.invoker.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_tool_failure_is_500() {
        let app = app(RecordingInvoker::new().fail_on(ToolStep::KeyGen));
        let response = app
            .router
            .oneshot(issue_request(None, form("30", &[("config", CONFIG)])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_message(response)
            .await
            .starts_with("key generation failed"));
        assert_eq!(app.invoker.steps(), vec![ToolStep::KeyGen]);
    }

    #[tokio::test]
    async fn test_health_and_docs() {
        let app = app(RecordingInvoker::new());

        let response = app
            .router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .router
            .clone()
            .oneshot(Request::get("/doc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/doc/openapi.json");

        let response = app
            .router
            .oneshot(Request::get("/doc/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(doc["paths"].get("/issuing/cert").is_some());
    }
}
