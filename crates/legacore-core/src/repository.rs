//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories take
//! the tenant id explicitly, or read it from a tenant-scoped
//! [`ListQuery`]; a list query without a tenant scope is rejected with
//! [`LegacoreError::TenantContext`](crate::error::LegacoreError::TenantContext).

use uuid::Uuid;

use crate::error::LegacoreResult;
use crate::models::{
    analytics::{AnalyticsRecord, CreateAnalyticsRecord},
    case::{Case, CreateCase, UpdateCase},
    company::{Company, CompanyCounts, CreateCompany},
    credit::{CreateCreditTransaction, CreditAccount, CreditTransaction},
    document::{CreateDocument, Document},
    opportunity::{ContractOpportunity, CreateContractOpportunity},
    project::{CreateProject, Project},
    user::{CreateUser, User},
};
use crate::query::{ListQuery, PageRequest};

/// A page of results plus the total count under the same filter.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: PageRequest,
}

// ---------------------------------------------------------------------------
// Companies (global scope)
// ---------------------------------------------------------------------------

pub trait CompanyRepository: Send + Sync {
    /// Create the company and open its zero-balance credit account as one
    /// atomic unit. Fails with `AlreadyExists` if the slug or the name is
    /// taken, and then neither record is written.
    fn create(&self, input: CreateCompany) -> impl Future<Output = LegacoreResult<Company>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LegacoreResult<Company>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = LegacoreResult<Company>> + Send;
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<Company>>> + Send;
    /// Users, cases and documents owned by the company.
    fn counts(&self, id: Uuid) -> impl Future<Output = LegacoreResult<CompanyCounts>> + Send;
}

// ---------------------------------------------------------------------------
// Users (owned by a company; listed globally with a companyId filter)
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = LegacoreResult<User>> + Send;
    fn get_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LegacoreResult<User>> + Send;
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped business records
// ---------------------------------------------------------------------------

pub trait CaseRepository: Send + Sync {
    fn create(&self, input: CreateCase) -> impl Future<Output = LegacoreResult<Case>> + Send;
    fn get_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LegacoreResult<Case>> + Send;
    fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateCase,
    ) -> impl Future<Output = LegacoreResult<Case>> + Send;
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<Case>>> + Send;
    /// Every case of the company, for dashboard summaries.
    fn all(&self, company_id: Uuid) -> impl Future<Output = LegacoreResult<Vec<Case>>> + Send;
}

pub trait DocumentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDocument,
    ) -> impl Future<Output = LegacoreResult<Document>> + Send;
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<Document>>> + Send;
    fn all(&self, company_id: Uuid)
    -> impl Future<Output = LegacoreResult<Vec<Document>>> + Send;
}

pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject)
    -> impl Future<Output = LegacoreResult<Project>> + Send;
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<Project>>> + Send;
    fn all(&self, company_id: Uuid) -> impl Future<Output = LegacoreResult<Vec<Project>>> + Send;
}

pub trait AnalyticsRepository: Send + Sync {
    fn record(
        &self,
        input: CreateAnalyticsRecord,
    ) -> impl Future<Output = LegacoreResult<AnalyticsRecord>> + Send;
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<AnalyticsRecord>>> + Send;
}

// ---------------------------------------------------------------------------
// Contract opportunities (global)
// ---------------------------------------------------------------------------

pub trait OpportunityRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the solicitation number is taken.
    fn create(
        &self,
        input: CreateContractOpportunity,
    ) -> impl Future<Output = LegacoreResult<ContractOpportunity>> + Send;
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<ContractOpportunity>>> + Send;
    fn all(&self) -> impl Future<Output = LegacoreResult<Vec<ContractOpportunity>>> + Send;
}

// ---------------------------------------------------------------------------
// Credits (tenant-scoped, one account per company)
// ---------------------------------------------------------------------------

pub trait CreditRepository: Send + Sync {
    fn get_account(
        &self,
        company_id: Uuid,
    ) -> impl Future<Output = LegacoreResult<CreditAccount>> + Send;
    /// Apply a purchase or usage and append its transaction record as one
    /// atomic unit. A usage larger than the balance is rejected and leaves
    /// the account untouched.
    fn apply(
        &self,
        input: CreateCreditTransaction,
    ) -> impl Future<Output = LegacoreResult<(CreditAccount, CreditTransaction)>> + Send;
    /// Most recent transactions first.
    fn transactions(
        &self,
        company_id: Uuid,
        page: PageRequest,
    ) -> impl Future<Output = LegacoreResult<PaginatedResult<CreditTransaction>>> + Send;
}
