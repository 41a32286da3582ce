use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use log::info;
use serde::Deserialize;

use super::{AppState, parse_body};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::mail::Email;
use crate::render::{html_document, markdown_to_html};

#[derive(Debug, Deserialize)]
struct ExportRequest {
    summary: String,
}

/// Exports are only offered to callers whose session carries an email address
fn authorize(auth: Result<AuthUser, ApiError>, method: &Method) -> ApiResult<AuthUser> {
    let user = auth?;
    if user.email.is_none() {
        return Err(ApiError::Unauthenticated);
    }
    if *method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }
    Ok(user)
}

/// `POST /api/emailMe`
pub(super) async fn email_me(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    method: Method,
    body: Bytes,
) -> ApiResult<Json<&'static str>> {
    let user = authorize(auth, &method)?;
    let request: ExportRequest = parse_body(&body)?;

    let settings = &state.config.email;
    let email = Email {
        from: settings.from.clone(),
        to: settings.to.clone(),
        subject: settings.subject.clone(),
        html_body: markdown_to_html(&request.summary),
    };
    state.mailer.send(&email).await?;

    info!("Emailed summary for {}", user.user_id);
    Ok(Json("success"))
}

/// `POST /api/downloadAsPdf`
pub(super) async fn download_as_pdf(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    method: Method,
    body: Bytes,
) -> ApiResult<Response> {
    let user = authorize(auth, &method)?;
    let request: ExportRequest = parse_body(&body)?;

    let html = html_document("Video summary", &markdown_to_html(&request.summary));
    let pdf = state.pdf.render(&html).await?;

    info!("Rendered {} byte PDF for {}", pdf.len(), user.user_id);
    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "application/pdf"),
            (CONTENT_DISPOSITION, "attachment; filename=summary.pdf"),
        ],
        pdf,
    )
        .into_response())
}
