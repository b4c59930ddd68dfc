//! HTTP error mapping.
//!
//! Handlers return [`ApiError`], which carries the domain error to the
//! response as an [`ErrorReport`] extension. The [`error_envelope`]
//! middleware then renders the JSON envelope, since only it knows the
//! request path.

use axum::{
    Json,
    extract::{FromRequest, Request, State, rejection::JsonRejection},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use legacore_core::error::LegacoreError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::state::AppState;

const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// Startup failures of the server binary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("database error: {0}")]
    Database(#[from] legacore_db::DbError),

    #[error("initialisation error: {0}")]
    Init(#[from] LegacoreError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A domain error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub LegacoreError);

impl From<LegacoreError> for ApiError {
    fn from(err: LegacoreError) -> Self {
        Self(err)
    }
}

impl From<legacore_auth::AuthError> for ApiError {
    fn from(err: legacore_auth::AuthError) -> Self {
        Self(err.into())
    }
}

/// What the envelope middleware needs to render an error response.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub detail: String,
    pub operational: bool,
}

impl From<&LegacoreError> for ErrorReport {
    fn from(err: &LegacoreError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let operational = err.is_operational();
        let detail = err.to_string();
        let message = if operational {
            detail.clone()
        } else {
            GENERIC_MESSAGE.to_string()
        };
        Self {
            status,
            kind: err.kind(),
            message,
            detail,
            operational,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = ErrorReport::from(&self.0);
        let mut response = report.status.into_response();
        response.extensions_mut().insert(report);
        response
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    message: &'a str,
    code: &'static str,
    status_code: u16,
    timestamp: String,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

fn render(report: &ErrorReport, path: &str, expose_details: bool) -> Response {
    let details = (expose_details && !report.operational).then_some(report.detail.as_str());
    let body = ErrorBody {
        message: &report.message,
        code: report.kind,
        status_code: report.status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        path,
        details,
    };
    (report.status, Json(json!({ "error": body }))).into_response()
}

/// Render every [`ErrorReport`]-tagged response as the error envelope.
pub async fn error_envelope(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let response = next.run(req).await;

    let Some(report) = response.extensions().get::<ErrorReport>() else {
        return response;
    };

    if report.operational {
        warn!(
            %method,
            %path,
            status = report.status.as_u16(),
            kind = report.kind,
            message = %report.message,
            "request failed"
        );
    } else {
        error!(
            %method,
            %path,
            status = report.status.as_u16(),
            kind = report.kind,
            detail = %report.detail,
            "request failed"
        );
    }

    render(report, &path, state.config.environment.exposes_details())
}

/// Unmatched routes.
pub async fn fallback(uri: Uri) -> ApiError {
    ApiError(LegacoreError::not_found("Route", uri.path()))
}

/// JSON body extractor whose rejections are validation errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(LegacoreError::validation(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )))),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
