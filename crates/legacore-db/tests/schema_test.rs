//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    legacore_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "company",
        "user",
        "legal_case",
        "document",
        "project",
        "analytics",
        "contract_opportunity",
        "credit",
        "credit_transaction",
        "_migration",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    legacore_db::run_migrations(&db).await.unwrap();
    legacore_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn case_priority_is_bounded_by_schema() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    legacore_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE legal_case SET company_id = 'c', case_number = 'X-1', \
             title = 't', status = 'OPEN', priority = 9",
        )
        .await
        .unwrap();
    assert!(result.check().is_err(), "priority 9 should be rejected");
}

#[tokio::test]
async fn credit_balance_cannot_go_negative_in_schema() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    legacore_db::run_migrations(&db).await.unwrap();

    let result = db
        .query("CREATE credit SET company_id = 'c', balance = -1")
        .await
        .unwrap();
    assert!(result.check().is_err(), "negative balance should be rejected");
}
