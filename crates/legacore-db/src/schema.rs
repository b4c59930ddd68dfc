//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Every tenant-owned table carries a
//! `company_id` column with an index.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Companies (global scope; each one is a tenant)
-- =======================================================================
DEFINE TABLE company SCHEMAFULL;
DEFINE FIELD name ON TABLE company TYPE string;
DEFINE FIELD slug ON TABLE company TYPE string;
DEFINE FIELD domain ON TABLE company TYPE option<string>;
DEFINE FIELD logo ON TABLE company TYPE option<string>;
DEFINE FIELD description ON TABLE company TYPE option<string>;
DEFINE FIELD industry ON TABLE company TYPE option<string>;
DEFINE FIELD active ON TABLE company TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE company TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_company_slug ON TABLE company COLUMNS slug UNIQUE;
DEFINE INDEX idx_company_name ON TABLE company COLUMNS name UNIQUE;

-- =======================================================================
-- Users (owned by a company; email is globally unique)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD company_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE option<string>;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD salt ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['ADMIN', 'MANAGER', 'USER'];
DEFINE FIELD active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_company ON TABLE user COLUMNS company_id;

-- =======================================================================
-- Cases (tenant-scoped)
-- =======================================================================
DEFINE TABLE legal_case SCHEMAFULL;
DEFINE FIELD company_id ON TABLE legal_case TYPE string;
DEFINE FIELD case_number ON TABLE legal_case TYPE string;
DEFINE FIELD title ON TABLE legal_case TYPE string;
DEFINE FIELD description ON TABLE legal_case TYPE option<string>;
DEFINE FIELD status ON TABLE legal_case TYPE string \
    ASSERT $value IN ['OPEN', 'IN_PROGRESS', 'PENDING', 'CLOSED', 'ARCHIVED'];
DEFINE FIELD priority ON TABLE legal_case TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD amount ON TABLE legal_case TYPE option<float>;
DEFINE FIELD currency ON TABLE legal_case TYPE string DEFAULT 'USD';
DEFINE FIELD assigned_to_id ON TABLE legal_case TYPE option<string>;
DEFINE FIELD due_date ON TABLE legal_case TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE legal_case TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE legal_case TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_case_number ON TABLE legal_case \
    COLUMNS case_number UNIQUE;
DEFINE INDEX idx_case_company ON TABLE legal_case COLUMNS company_id;

-- =======================================================================
-- Documents / assets (tenant-scoped)
-- =======================================================================
DEFINE TABLE document SCHEMAFULL;
DEFINE FIELD company_id ON TABLE document TYPE string;
DEFINE FIELD case_id ON TABLE document TYPE option<string>;
DEFINE FIELD title ON TABLE document TYPE string;
DEFINE FIELD description ON TABLE document TYPE option<string>;
DEFINE FIELD doc_type ON TABLE document TYPE string \
    ASSERT $value IN ['CONTRACT', 'INVOICE', 'REPORT', 'LEGAL', \
    'FINANCIAL', 'IMAGE', 'VIDEO', 'OTHER'];
DEFINE FIELD filename ON TABLE document TYPE string;
DEFINE FIELD filepath ON TABLE document TYPE string;
DEFINE FIELD filesize ON TABLE document TYPE int ASSERT $value >= 0;
DEFINE FIELD mime_type ON TABLE document TYPE string;
DEFINE FIELD url ON TABLE document TYPE option<string>;
DEFINE FIELD uploaded_by_id ON TABLE document TYPE option<string>;
DEFINE FIELD created_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_document_company ON TABLE document COLUMNS company_id;

-- =======================================================================
-- Projects (tenant-scoped)
-- =======================================================================
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD company_id ON TABLE project TYPE string;
DEFINE FIELD name ON TABLE project TYPE string;
DEFINE FIELD description ON TABLE project TYPE option<string>;
DEFINE FIELD status ON TABLE project TYPE string DEFAULT 'active';
DEFINE FIELD budget ON TABLE project TYPE option<float>;
DEFINE FIELD currency ON TABLE project TYPE string DEFAULT 'USD';
DEFINE FIELD start_date ON TABLE project TYPE datetime;
DEFINE FIELD end_date ON TABLE project TYPE option<datetime>;
DEFINE FIELD metadata ON TABLE project TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_company ON TABLE project COLUMNS company_id;

-- =======================================================================
-- Analytics records (tenant-scoped)
-- =======================================================================
DEFINE TABLE analytics SCHEMAFULL;
DEFINE FIELD company_id ON TABLE analytics TYPE string;
DEFINE FIELD metric_name ON TABLE analytics TYPE string;
DEFINE FIELD metric_value ON TABLE analytics TYPE float;
DEFINE FIELD period ON TABLE analytics TYPE string;
DEFINE FIELD metadata ON TABLE analytics TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD recorded_at ON TABLE analytics TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_analytics_company ON TABLE analytics COLUMNS company_id;

-- =======================================================================
-- Contract opportunities (global scope)
-- =======================================================================
DEFINE TABLE contract_opportunity SCHEMAFULL;
DEFINE FIELD solicitation ON TABLE contract_opportunity TYPE string;
DEFINE FIELD title ON TABLE contract_opportunity TYPE string;
DEFINE FIELD agency ON TABLE contract_opportunity TYPE string;
DEFINE FIELD description ON TABLE contract_opportunity \
    TYPE option<string>;
DEFINE FIELD posted_date ON TABLE contract_opportunity TYPE datetime;
DEFINE FIELD response_deadline ON TABLE contract_opportunity \
    TYPE datetime;
DEFINE FIELD set_value ON TABLE contract_opportunity TYPE option<float>;
DEFINE FIELD place_of_performance ON TABLE contract_opportunity \
    TYPE option<string>;
DEFINE FIELD naics_code ON TABLE contract_opportunity TYPE option<string>;
DEFINE FIELD psc_code ON TABLE contract_opportunity TYPE option<string>;
DEFINE FIELD contact_info ON TABLE contract_opportunity \
    TYPE option<string>;
DEFINE FIELD url ON TABLE contract_opportunity TYPE option<string>;
DEFINE FIELD ai_score ON TABLE contract_opportunity TYPE float \
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD ai_summary ON TABLE contract_opportunity TYPE option<string>;
DEFINE FIELD metadata ON TABLE contract_opportunity TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE contract_opportunity TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE contract_opportunity TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_opportunity_solicitation ON TABLE contract_opportunity \
    COLUMNS solicitation UNIQUE;

-- =======================================================================
-- Credit accounts (one per company) and their transaction log
-- =======================================================================
DEFINE TABLE credit SCHEMAFULL;
DEFINE FIELD company_id ON TABLE credit TYPE string;
DEFINE FIELD balance ON TABLE credit TYPE int ASSERT $value >= 0;
DEFINE FIELD total_purchased ON TABLE credit TYPE int DEFAULT 0;
DEFINE FIELD total_used ON TABLE credit TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE credit TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE credit TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_credit_company ON TABLE credit \
    COLUMNS company_id UNIQUE;

DEFINE TABLE credit_transaction SCHEMAFULL;
DEFINE FIELD credit_id ON TABLE credit_transaction TYPE string;
DEFINE FIELD company_id ON TABLE credit_transaction TYPE string;
DEFINE FIELD kind ON TABLE credit_transaction TYPE string \
    ASSERT $value IN ['PURCHASE', 'USAGE'];
DEFINE FIELD amount ON TABLE credit_transaction TYPE int \
    ASSERT $value > 0;
DEFINE FIELD description ON TABLE credit_transaction TYPE option<string>;
DEFINE FIELD user_id ON TABLE credit_transaction TYPE option<string>;
DEFINE FIELD created_at ON TABLE credit_transaction TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_credit_tx_company ON TABLE credit_transaction \
    COLUMNS company_id;
";

/// Run all pending migrations in version order.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
