//! SurrealDB implementation of [`DocumentRepository`].

use chrono::{DateTime, Utc};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::EnumField;
use legacore_core::models::document::{CreateDocument, Document, DocumentType};
use legacore_core::query::ListQuery;
use legacore_core::repository::{DocumentRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::user::user_refs;
use crate::error::{DbError, parse_opt_uuid, parse_uuid};
use crate::filter::{fetch_all_for_tenant, fetch_page};

const ENTITY: &str = "Document";
const TABLE: &str = "document";

#[derive(Debug, SurrealValue)]
struct DocumentRowWithId {
    record_id: String,
    company_id: String,
    case_id: Option<String>,
    title: String,
    description: Option<String>,
    doc_type: String,
    filename: String,
    filepath: String,
    filesize: u64,
    mime_type: String,
    url: Option<String>,
    uploaded_by_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRowWithId {
    fn try_into_document(self) -> Result<Document, DbError> {
        let doc_type =
            DocumentType::parse(&self.doc_type).map_err(|e| DbError::Corrupt(e.to_string()))?;
        Ok(Document {
            id: parse_uuid(&self.record_id, "document")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            case_id: parse_opt_uuid(self.case_id, "case")?,
            title: self.title,
            description: self.description,
            doc_type,
            filename: self.filename,
            filepath: self.filepath,
            filesize: self.filesize,
            mime_type: self.mime_type,
            url: self.url,
            uploaded_by_id: parse_opt_uuid(self.uploaded_by_id, "uploader")?,
            uploaded_by: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    #[allow(dead_code)]
    record_id: String,
}

/// SurrealDB implementation of the Document repository.
#[derive(Clone)]
pub struct SurrealDocumentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn case_in_tenant(&self, company_id: Uuid, case_id: Uuid) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id \
                 FROM type::record('legal_case', $id) \
                 WHERE company_id = $company_id",
            )
            .bind(("id", case_id.to_string()))
            .bind(("company_id", company_id.to_string()))
            .await?;
        let rows: Vec<IdRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    async fn attach_uploaders(
        &self,
        company_id: Uuid,
        documents: &mut [Document],
    ) -> Result<(), DbError> {
        let ids: Vec<Uuid> = documents.iter().filter_map(|d| d.uploaded_by_id).collect();
        let refs = user_refs(&self.db, company_id, &ids).await?;
        for doc in documents {
            doc.uploaded_by = doc.uploaded_by_id.and_then(|id| refs.get(&id).cloned());
        }
        Ok(())
    }
}

impl<C: Connection> DocumentRepository for SurrealDocumentRepository<C> {
    async fn create(&self, input: CreateDocument) -> LegacoreResult<Document> {
        if let Some(uploader) = input.uploaded_by_id {
            let found = user_refs(&self.db, input.company_id, &[uploader]).await?;
            if !found.contains_key(&uploader) {
                return Err(LegacoreError::validation(
                    "Uploading user does not belong to this company",
                ));
            }
        }
        if let Some(case_id) = input.case_id {
            if !self.case_in_tenant(input.company_id, case_id).await? {
                return Err(LegacoreError::validation(
                    "Linked case does not belong to this company",
                ));
            }
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let company_id = input.company_id;

        let result = self
            .db
            .query(
                "CREATE type::record('document', $id) SET \
                 company_id = $company_id, case_id = $case_id, \
                 title = $title, description = $description, \
                 doc_type = $doc_type, filename = $filename, \
                 filepath = $filepath, filesize = $filesize, \
                 mime_type = $mime_type, url = $url, \
                 uploaded_by_id = $uploaded_by_id; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('document', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("company_id", company_id.to_string()))
            .bind(("case_id", input.case_id.map(|u| u.to_string())))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("doc_type", input.doc_type.as_str().to_string()))
            .bind(("filename", input.filename))
            .bind(("filepath", input.filepath))
            .bind(("filesize", input.filesize))
            .bind(("mime_type", input.mime_type))
            .bind(("url", input.url))
            .bind((
                "uploaded_by_id",
                input.uploaded_by_id.map(|u| u.to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        // Statement 0 is the CREATE, statement 1 re-reads with the id.
        let rows: Vec<DocumentRowWithId> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        let mut docs = [row.try_into_document()?];
        self.attach_uploaders(company_id, &mut docs).await?;
        let [doc] = docs;
        info!(document_id = %doc.id, company_id = %company_id, "Document recorded");
        Ok(doc)
    }

    async fn list(&self, query: ListQuery) -> LegacoreResult<PaginatedResult<Document>> {
        let company_id = query.filter.tenant_id().ok_or(LegacoreError::TenantContext)?;
        let (rows, total) = fetch_page::<C, DocumentRowWithId>(&self.db, TABLE, &query).await?;

        let mut items = rows
            .into_iter()
            .map(|row| row.try_into_document())
            .collect::<Result<Vec<_>, DbError>>()?;
        self.attach_uploaders(company_id, &mut items).await?;

        Ok(PaginatedResult {
            items,
            total,
            page: query.page,
        })
    }

    async fn all(&self, company_id: Uuid) -> LegacoreResult<Vec<Document>> {
        let rows: Vec<DocumentRowWithId> =
            fetch_all_for_tenant(&self.db, TABLE, company_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_document())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
