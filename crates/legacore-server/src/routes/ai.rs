use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use legacore_core::ai::{Completion, Prompt};
use legacore_core::error::LegacoreError;
use tracing::info;

use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

fn require_user_prompt(prompt: &Prompt) -> Result<(), LegacoreError> {
    if prompt.user.trim().is_empty() {
        return Err(LegacoreError::validation("Missing required fields: user"));
    }
    Ok(())
}

pub async fn complete(
    State(state): State<AppState>,
    ApiJson(prompt): ApiJson<Prompt>,
) -> ApiResult<Json<Completion>> {
    require_user_prompt(&prompt)?;
    let completion = state.ai.generate_completion(&prompt).await?;
    info!(
        model = completion.model.as_deref().unwrap_or("unknown"),
        "Completion generated"
    );
    Ok(Json(completion))
}

/// Completion streamed as plain-text chunks.
pub async fn stream(
    State(state): State<AppState>,
    ApiJson(prompt): ApiJson<Prompt>,
) -> ApiResult<Response> {
    require_user_prompt(&prompt)?;
    let chunks = state.ai.generate_stream(&prompt).map(|chunk| chunk.map(Bytes::from));
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(chunks),
    )
        .into_response())
}
