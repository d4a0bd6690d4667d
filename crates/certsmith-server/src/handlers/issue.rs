//! Certificate issuing handler

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use certsmith_core::{RequestContext, RequestId};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    archive::{self, ArchiveFormat},
    error::{AppError, Result},
    models::issue::IssueRequest,
    state::AppState,
};

/// Issue a certificate and return the bundle as an archive
///
/// Send either a `config` file, to have a private key and signing request
/// generated, or a `csr` file to be signed as is. The `Accept` header selects
/// a tar (`*/*`, `application/x-tar`, `application/*`) or zip
/// (`application/zip`) archive.
#[utoipa::path(
    post,
    path = "/cert",
    request_body(content = IssueRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Certificate bundle as a tar or zip archive"),
        (status = 400, description = "Invalid form"),
        (status = 406, description = "Unsupported Accept header"),
        (status = 500, description = "Issuance failed"),
        (status = 503, description = "Issuance canceled or timed out"),
    ),
    tag = "Issuing"
)]
pub async fn issue_certificate(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response> {
    let (days, input) = read_form(multipart).await?.into_input()?;

    let accept = match headers.get(header::ACCEPT) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::NotAcceptable("unreadable accept header".to_string()))?,
        ),
        None => None,
    };
    let format = ArchiveFormat::negotiate(accept).ok_or_else(|| {
        AppError::NotAcceptable(format!("cannot produce {}", accept.unwrap_or_default()))
    })?;

    let request_id = RequestId::new();
    // Cancels the running tool if the client goes away.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let mut ctx = RequestContext::new(request_id).with_cancel(cancel);
    if let Some(timeout) = state.request_timeout {
        ctx = ctx.with_timeout(timeout);
    }

    let bundle = state.issuer.issue(&ctx, days, input).await?;
    let body = archive::pack(&bundle, format)?;

    info!(
        request_id = %request_id,
        format = ?format,
        size = body.len(),
        "certificate bundle delivered"
    );

    let disposition = format!(
        "attachment; filename=\"certificate-{}.{}\"",
        request_id,
        format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn read_form(mut multipart: Multipart) -> Result<IssueRequest> {
    let mut days: Option<u32> = None;
    let mut request = IssueRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "days" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read days: {}", e)))?;
                days = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("days must be a positive integer, got {:?}", text))
                })?);
            }
            "csr" | "config" => {
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::BadRequest(format!("Failed to read {}: {}", field_name, e))
                    })?
                    .to_vec();
                if field_name == "csr" {
                    request.csr = Some(body);
                } else {
                    request.config = Some(body);
                }
            }
            _ => {}
        }
    }

    request.days = days.ok_or_else(|| AppError::BadRequest("Missing days".to_string()))?;
    Ok(request)
}
