//! Shared application state injected into every handler.

use std::sync::Arc;

use legacore_core::ai::{CompletionClient, create_client};
use legacore_core::error::LegacoreResult;
use legacore_db::DbManager;
use legacore_db::repository::{
    SurrealAnalyticsRepository, SurrealCaseRepository, SurrealCompanyRepository,
    SurrealCreditRepository, SurrealDocumentRepository, SurrealOpportunityRepository,
    SurrealProjectRepository, SurrealUserRepository,
};
use surrealdb::engine::any::Any;

use crate::config::ServerConfig;

/// Repositories over one shared SurrealDB handle, plus configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub companies: SurrealCompanyRepository<Any>,
    pub users: SurrealUserRepository<Any>,
    pub cases: SurrealCaseRepository<Any>,
    pub documents: SurrealDocumentRepository<Any>,
    pub projects: SurrealProjectRepository<Any>,
    pub analytics: SurrealAnalyticsRepository<Any>,
    pub credits: SurrealCreditRepository<Any>,
    pub opportunities: SurrealOpportunityRepository<Any>,
    pub ai: Arc<dyn CompletionClient>,
}

impl AppState {
    pub fn new(db: &DbManager, config: ServerConfig) -> LegacoreResult<Self> {
        let client = db.client().clone();
        let ai: Arc<dyn CompletionClient> = Arc::from(create_client(&config.ai)?);
        Ok(Self {
            companies: SurrealCompanyRepository::new(client.clone()),
            users: SurrealUserRepository::with_credentials(
                client.clone(),
                config.credentials.clone(),
            ),
            cases: SurrealCaseRepository::new(client.clone()),
            documents: SurrealDocumentRepository::new(client.clone()),
            projects: SurrealProjectRepository::new(client.clone()),
            analytics: SurrealAnalyticsRepository::new(client.clone()),
            credits: SurrealCreditRepository::new(client.clone()),
            opportunities: SurrealOpportunityRepository::new(client),
            ai,
            config: Arc::new(config),
        })
    }
}
