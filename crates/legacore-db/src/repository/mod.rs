//! SurrealDB repository implementations.

mod analytics;
mod case;
mod company;
mod credit;
mod document;
mod opportunity;
mod project;
mod user;

pub use analytics::SurrealAnalyticsRepository;
pub use case::SurrealCaseRepository;
pub use company::SurrealCompanyRepository;
pub use credit::SurrealCreditRepository;
pub use document::SurrealDocumentRepository;
pub use opportunity::SurrealOpportunityRepository;
pub use project::SurrealProjectRepository;
pub use user::SurrealUserRepository;
