//! Document (asset) domain model. File bytes live outside the platform;
//! only metadata is recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EnumField, UserRef};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Contract,
    Invoice,
    Report,
    Legal,
    Financial,
    Image,
    Video,
    Other,
}

impl EnumField for DocumentType {
    const FIELD: &'static str = "type";
    const ALL: &'static [Self] = &[
        Self::Contract,
        Self::Invoice,
        Self::Report,
        Self::Legal,
        Self::Financial,
        Self::Image,
        Self::Video,
        Self::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "CONTRACT",
            Self::Invoice => "INVOICE",
            Self::Report => "REPORT",
            Self::Legal => "LEGAL",
            Self::Financial => "FINANCIAL",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub company_id: Uuid,
    pub case_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub filename: String,
    pub filepath: String,
    pub filesize: u64,
    pub mime_type: String,
    pub url: Option<String>,
    pub uploaded_by_id: Option<Uuid>,
    pub uploaded_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub company_id: Uuid,
    pub case_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub doc_type: DocumentType,
    pub filename: String,
    pub filepath: String,
    pub filesize: u64,
    pub mime_type: String,
    pub url: Option<String>,
    pub uploaded_by_id: Option<Uuid>,
}
