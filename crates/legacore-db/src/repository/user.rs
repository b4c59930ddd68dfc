//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords are hashed by `legacore_auth` before storage; the hash and
//! its salt are carried on [`User`] but never serialized.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use legacore_auth::{CredentialConfig, hash_password};
use legacore_core::error::{LegacoreError, LegacoreResult};
use legacore_core::models::user::{CreateUser, User, UserRole};
use legacore_core::models::{EnumField, UserRef};
use legacore_core::query::ListQuery;
use legacore_core::repository::{PaginatedResult, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};
use crate::filter::fetch_page;

const ENTITY: &str = "User";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    company_id: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    salt: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let role = UserRole::parse(&self.role).map_err(|e| DbError::Corrupt(e.to_string()))?;
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            company_id: parse_uuid(&self.company_id, "company")?,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            salt: self.salt,
            role,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct UserRefRow {
    record_id: String,
    name: Option<String>,
    email: String,
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    #[allow(dead_code)]
    record_id: String,
}

/// Look up the users among `ids` that belong to `company_id`.
///
/// Ids owned by another company are simply absent from the map.
pub(crate) async fn user_refs<C: Connection>(
    db: &Surreal<C>,
    company_id: Uuid,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserRef>, DbError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let id_strs: Vec<String> = ids.iter().map(Uuid::to_string).collect();

    let mut result = db
        .query(
            "SELECT meta::id(id) AS record_id, name, email FROM user \
             WHERE company_id = $company_id AND meta::id(id) IN $ids",
        )
        .bind(("company_id", company_id.to_string()))
        .bind(("ids", id_strs))
        .await?;
    let rows: Vec<UserRefRow> = result.take(0)?;

    rows.into_iter()
        .map(|row| {
            let id = parse_uuid(&row.record_id, "user")?;
            Ok((
                id,
                UserRef {
                    id,
                    name: row.name,
                    email: row.email,
                },
            ))
        })
        .collect()
}

/// Whether `company_id` names an existing company.
pub(crate) async fn company_exists<C: Connection>(
    db: &Surreal<C>,
    company_id: Uuid,
) -> Result<bool, DbError> {
    let mut result = db
        .query("SELECT meta::id(id) AS record_id FROM type::record('company', $id)")
        .bind(("id", company_id.to_string()))
        .await?;
    let rows: Vec<IdRow> = result.take(0)?;
    Ok(!rows.is_empty())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    credentials: CredentialConfig,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            credentials: CredentialConfig::default(),
        }
    }

    pub fn with_credentials(db: Surreal<C>, credentials: CredentialConfig) -> Self {
        Self { db, credentials }
    }

    async fn email_taken(&self, email: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let rows: Vec<IdRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> LegacoreResult<User> {
        if !company_exists(&self.db, input.company_id).await? {
            return Err(LegacoreError::not_found("Company", input.company_id.to_string()));
        }
        if self.email_taken(&input.email).await? {
            return Err(LegacoreError::already_exists(ENTITY));
        }

        let digest = hash_password(&input.password, &self.credentials)?;
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 company_id = $company_id, email = $email, name = $name, \
                 password_hash = $password_hash, salt = $salt, \
                 role = $role, active = $active",
            )
            .bind(("id", id_str.clone()))
            .bind(("company_id", input.company_id.to_string()))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("password_hash", digest.hash))
            .bind(("salt", digest.salt))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("active", input.active))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, ENTITY))?;

        let user = self.get_by_id(input.company_id, id).await?;
        info!(user_id = %user.id, company_id = %user.company_id, "User created");
        Ok(user)
    }

    async fn get_by_id(&self, company_id: Uuid, id: Uuid) -> LegacoreResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user', $id) \
                 WHERE company_id = $company_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn list(&self, query: ListQuery) -> LegacoreResult<PaginatedResult<User>> {
        let (rows, total) = fetch_page::<C, UserRowWithId>(&self.db, "user", &query).await?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            page: query.page,
        })
    }
}
