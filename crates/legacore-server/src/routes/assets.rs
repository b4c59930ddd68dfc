//! Tenant documents, exposed as `/assets`.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use legacore_core::aggregate::{DocumentStats, ListEnvelope, document_stats};
use legacore_core::error::require_fields;
use legacore_core::models::EnumField;
use legacore_core::models::document::{CreateDocument, Document, DocumentType};
use legacore_core::query::{DOCUMENT_QUERY, ListQuery, QueryParams, Scope};
use legacore_core::repository::DocumentRepository;
use serde::Deserialize;

use super::{Created, created, parse_opt_id, present};
use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;
use crate::tenant::Tenant;

const DEFAULT_FILENAME: &str = "asset.jpg";
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub filename: Option<String>,
    pub filepath: Option<String>,
    pub filesize: Option<u64>,
    pub mime_type: Option<String>,
    pub url: Option<String>,
    pub case_id: Option<String>,
    pub uploaded_by_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    Query(raw): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<ListEnvelope<Document>>> {
    let params = QueryParams::from(raw);
    let page = state
        .documents
        .list(ListQuery::build(&DOCUMENT_QUERY, &params, Scope::Tenant(company.id)))
        .await?;
    Ok(Json(ListEnvelope::from_page(page)))
}

/// Register an uploaded asset. File metadata left out of the request
/// falls back to an image placeholder under `/assets/`.
pub async fn create(
    State(state): State<AppState>,
    Tenant(company): Tenant,
    ApiJson(body): ApiJson<CreateAssetRequest>,
) -> ApiResult<Created<Document>> {
    require_fields(&[("title", present(&body.title))])?;

    let doc_type = match body.doc_type.as_deref() {
        Some(raw) => DocumentType::parse(raw)?,
        None => DocumentType::Other,
    };
    let filepath = body
        .filepath
        .unwrap_or_else(|| format!("/assets/{}.jpg", Utc::now().timestamp_millis()));

    let document = state
        .documents
        .create(CreateDocument {
            company_id: company.id,
            case_id: parse_opt_id("caseId", body.case_id.as_deref())?,
            title: body.title.unwrap_or_default(),
            description: body.description,
            doc_type,
            filename: body.filename.unwrap_or_else(|| DEFAULT_FILENAME.into()),
            filepath,
            filesize: body.filesize.unwrap_or(0),
            mime_type: body.mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.into()),
            url: body.url,
            uploaded_by_id: parse_opt_id("uploadedById", body.uploaded_by_id.as_deref())?,
        })
        .await?;
    Ok(created(document))
}

pub async fn stats(
    State(state): State<AppState>,
    Tenant(company): Tenant,
) -> ApiResult<Json<DocumentStats>> {
    let documents = state.documents.all(company.id).await?;
    Ok(Json(document_stats(&documents)))
}
