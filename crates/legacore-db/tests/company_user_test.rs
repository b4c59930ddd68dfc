//! Integration tests for the Company and User repositories using
//! in-memory SurrealDB.

use legacore_auth::verify_password;
use legacore_core::error::LegacoreError;
use legacore_core::models::company::CreateCompany;
use legacore_core::models::user::{CreateUser, UserRole};
use legacore_core::query::{COMPANY_QUERY, ListQuery, QueryParams, Scope, USER_QUERY};
use legacore_core::repository::{CompanyRepository, UserRepository};
use legacore_core::tenant::resolve_tenant;
use legacore_db::repository::{SurrealCompanyRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    legacore_db::run_migrations(&db).await.unwrap();
    db
}

fn company(name: &str, slug: &str) -> CreateCompany {
    CreateCompany {
        name: name.into(),
        slug: slug.into(),
        domain: None,
        logo: None,
        description: None,
        industry: Some("Asset Recovery".into()),
        active: true,
    }
}

fn user(company_id: Uuid, email: &str) -> CreateUser {
    CreateUser {
        company_id,
        email: email.into(),
        name: Some("Test User".into()),
        password: "correct-horse".into(),
        role: UserRole::User,
        active: true,
    }
}

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

// -----------------------------------------------------------------------
// Company tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_company() {
    let db = setup().await;
    let repo = SurrealCompanyRepository::new(db);

    let acme = repo.create(company("ACME Corp", "acme")).await.unwrap();
    assert_eq!(acme.slug, "acme");
    assert!(acme.active);

    let fetched = repo.get_by_id(acme.id).await.unwrap();
    assert_eq!(fetched.name, "ACME Corp");

    let by_slug = repo.get_by_slug("acme").await.unwrap();
    assert_eq!(by_slug.id, acme.id);
}

#[tokio::test]
async fn duplicate_slug_is_conflict_and_first_record_unchanged() {
    let db = setup().await;
    let repo = SurrealCompanyRepository::new(db);

    let first = repo.create(company("ACME Corp", "acme")).await.unwrap();
    let result = repo.create(company("Other Name", "acme")).await;
    assert!(
        matches!(result, Err(LegacoreError::AlreadyExists { .. })),
        "duplicate slug should be a conflict"
    );

    let after = repo.get_by_slug("acme").await.unwrap();
    assert_eq!(after.id, first.id);
    assert_eq!(after.name, "ACME Corp");
}

#[tokio::test]
async fn duplicate_name_is_conflict() {
    let db = setup().await;
    let repo = SurrealCompanyRepository::new(db);

    repo.create(company("ACME Corp", "acme")).await.unwrap();
    let result = repo.create(company("ACME Corp", "acme-2")).await;
    assert!(matches!(result, Err(LegacoreError::AlreadyExists { .. })));
}

#[tokio::test]
async fn resolve_tenant_fails_closed() {
    let db = setup().await;
    let repo = SurrealCompanyRepository::new(db);

    let acme = repo.create(company("ACME Corp", "acme")).await.unwrap();
    assert_eq!(resolve_tenant(&repo, "acme").await.unwrap().id, acme.id);

    let unknown = resolve_tenant(&repo, "nope").await;
    assert!(matches!(unknown, Err(LegacoreError::NotFound { .. })));

    repo.create(CreateCompany {
        active: false,
        ..company("Dormant Holdings", "dormant")
    })
    .await
    .unwrap();
    let inactive = resolve_tenant(&repo, "dormant").await;
    assert!(matches!(inactive, Err(LegacoreError::NotFound { .. })));
}

#[tokio::test]
async fn list_companies_with_search_and_pagination() {
    let db = setup().await;
    let repo = SurrealCompanyRepository::new(db);

    for i in 0..5 {
        repo.create(company(&format!("Recovery {i}"), &format!("recovery-{i}")))
            .await
            .unwrap();
    }
    repo.create(CreateCompany {
        industry: Some("Legal Services".into()),
        ..company("Legal Partners", "legal")
    })
    .await
    .unwrap();

    let page = repo
        .list(ListQuery::build(
            &COMPANY_QUERY,
            &params(&[("search", "RECOVERY"), ("limit", "2"), ("page", "2")]),
            Scope::Global,
        ))
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page.page, 2);
    assert!(page.items.iter().all(|c| c.slug.starts_with("recovery-")));
}

#[tokio::test]
async fn company_counts() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let acme = companies.create(company("ACME Corp", "acme")).await.unwrap();
    users.create(user(acme.id, "a@acme.com")).await.unwrap();
    users.create(user(acme.id, "b@acme.com")).await.unwrap();

    let counts = companies.counts(acme.id).await.unwrap();
    assert_eq!(counts.users, 2);
    assert_eq!(counts.cases, 0);
    assert_eq!(counts.documents, 0);
}

// -----------------------------------------------------------------------
// User tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_user_hashes_password() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let acme = companies.create(company("ACME Corp", "acme")).await.unwrap();
    let created = users.create(user(acme.id, "admin@acme.com")).await.unwrap();

    assert_ne!(created.password_hash, "correct-horse");
    assert!(created.password_hash.contains(&created.salt));
    assert!(verify_password("correct-horse", &created.password_hash, None).unwrap());

    let json = serde_json::to_value(&created).unwrap();
    assert!(json.get("passwordHash").is_none());
    assert!(json.get("salt").is_none());

    let fetched = users.get_by_id(acme.id, created.id).await.unwrap();
    assert_eq!(fetched.email, "admin@acme.com");
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let acme = companies.create(company("ACME Corp", "acme")).await.unwrap();
    let other = companies.create(company("Other", "other")).await.unwrap();
    users.create(user(acme.id, "dup@example.com")).await.unwrap();

    let result = users.create(user(other.id, "dup@example.com")).await;
    assert!(matches!(result, Err(LegacoreError::AlreadyExists { .. })));
}

#[tokio::test]
async fn user_for_unknown_company_is_not_found() {
    let db = setup().await;
    let users = SurrealUserRepository::new(db);

    let result = users.create(user(Uuid::new_v4(), "x@example.com")).await;
    assert!(matches!(result, Err(LegacoreError::NotFound { .. })));
}

#[tokio::test]
async fn get_user_is_tenant_scoped() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let acme = companies.create(company("ACME Corp", "acme")).await.unwrap();
    let other = companies.create(company("Other", "other")).await.unwrap();
    let u = users.create(user(acme.id, "a@acme.com")).await.unwrap();

    assert!(users.get_by_id(acme.id, u.id).await.is_ok());
    let result = users.get_by_id(other.id, u.id).await;
    assert!(result.is_err(), "user must not be visible from another tenant");
}

#[tokio::test]
async fn list_users_filters_by_company_and_role() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let acme = companies.create(company("ACME Corp", "acme")).await.unwrap();
    let other = companies.create(company("Other", "other")).await.unwrap();
    users
        .create(CreateUser {
            role: UserRole::Admin,
            ..user(acme.id, "admin@acme.com")
        })
        .await
        .unwrap();
    users.create(user(acme.id, "user@acme.com")).await.unwrap();
    users.create(user(other.id, "user@other.com")).await.unwrap();

    let acme_id = acme.id.to_string();
    let page = users
        .list(ListQuery::build(
            &USER_QUERY,
            &params(&[("companyId", acme_id.as_str()), ("role", "ADMIN")]),
            Scope::Global,
        ))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].email, "admin@acme.com");
}
