//! End-to-end tests driving the axum router over an in-memory SurrealDB.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use legacore_db::{DbConfig, DbManager, run_migrations};
use legacore_server::config::ServerConfig;
use legacore_server::router;
use legacore_server::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

const DEFAULT_TENANT: &str = "acme";

async fn app() -> Router {
    let db = DbManager::connect(&DbConfig::default()).await.unwrap();
    run_migrations(db.client()).await.unwrap();
    let config = ServerConfig {
        tenant_slug: DEFAULT_TENANT.into(),
        ..ServerConfig::default()
    };
    router(AppState::new(&db, config).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn company(app: &Router, name: &str, slug: &str) -> Value {
    let (status, body) = post(app, "/api/companies", json!({ "name": name, "slug": slug })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn assert_error_envelope(body: &Value, status: StatusCode, code: &str, path: &str) {
    let error = &body["error"];
    assert_eq!(error["statusCode"], status.as_u16());
    assert_eq!(error["code"], code);
    assert_eq!(error["path"], path);
    assert!(error["timestamp"].is_string());
    assert!(error["message"].is_string());
}

#[tokio::test]
async fn health_is_unscoped() {
    let app = app().await;
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn company_create_opens_empty_credit_account() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;

    let (status, body) = get(&app, "/api/tenants/acme/credits").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["balance"], 0);
    assert_eq!(body["transactions"], json!([]));
}

#[tokio::test]
async fn duplicate_slug_is_conflict_with_envelope() {
    let app = app().await;
    let first = company(&app, "ACME Corp", "acme").await;

    let (status, body) = post(
        &app,
        "/api/companies",
        json!({ "name": "Someone Else", "slug": "acme" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error_envelope(&body, status, "ConflictError", "/api/companies");

    let (_, list) = get(&app, "/api/companies?search=acme").await;
    assert_eq!(list["pagination"]["total"], 1);
    assert_eq!(list["data"][0]["id"], first["id"]);
    assert_eq!(list["data"][0]["name"], "ACME Corp");
    assert_eq!(list["data"][0]["_count"]["users"], 0);
}

#[tokio::test]
async fn missing_fields_are_listed() {
    let app = app().await;
    let (status, body) = post(&app, "/api/companies", json!({ "domain": "x.com" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Missing required fields: name, slug");
    assert_eq!(body["error"]["code"], "ValidationError");
}

#[tokio::test]
async fn malformed_json_is_validation_error() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/companies")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "ValidationError");
}

#[tokio::test]
async fn user_payloads_never_carry_credentials() {
    let app = app().await;
    let acme = company(&app, "ACME Corp", "acme").await;

    let (status, user) = post(
        &app,
        "/api/users",
        json!({
            "email": "admin@acme.com",
            "password": "correct-horse",
            "companyId": acme["id"],
            "role": "ADMIN",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");
    assert_eq!(user["role"], "ADMIN");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("salt").is_none());

    let uri = format!("/api/users?companyId={}", acme["id"].as_str().unwrap());
    let (_, list) = get(&app, &uri).await;
    assert_eq!(list["pagination"]["total"], 1);
    for user in list["data"].as_array().unwrap() {
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("salt").is_none());
    }
}

#[tokio::test]
async fn invalid_role_names_allowed_values() {
    let app = app().await;
    let acme = company(&app, "ACME Corp", "acme").await;
    let (status, body) = post(
        &app,
        "/api/users",
        json!({
            "email": "x@acme.com",
            "password": "correct-horse",
            "companyId": acme["id"],
            "role": "OWNER",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Invalid role. Must be one of: ADMIN, MANAGER, USER"
    );
}

#[tokio::test]
async fn tenant_routes_keep_tenants_apart() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;
    company(&app, "Lumora", "lumora").await;

    for title in ["Lien A", "Lien B"] {
        let (status, _) = post(&app, "/api/cases", json!({ "title": title })).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, other) = post(
        &app,
        "/api/tenants/lumora/cases",
        json!({ "title": "Lumora only" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(other["caseNumber"].as_str().unwrap().starts_with("LUM-"));

    let (_, acme_cases) = get(&app, "/api/tenants/acme/cases").await;
    assert_eq!(acme_cases["pagination"]["total"], 2);
    let acme_data = acme_cases["data"].as_array().unwrap();
    assert!(acme_data.iter().all(|c| c["title"] != "Lumora only"));

    let (_, lumora_cases) = get(&app, "/api/tenants/lumora/cases?search=lien").await;
    assert_eq!(lumora_cases["pagination"]["total"], 0);
    assert_eq!(lumora_cases["pagination"]["pages"], 0);
}

#[tokio::test]
async fn case_status_filter_clamps_limit() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;

    for (title, status) in [("One", "OPEN"), ("Two", "CLOSED"), ("Three", "OPEN")] {
        let (code, _) = post(
            &app,
            "/api/cases",
            json!({ "title": title, "status": status }),
        )
        .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/cases?status=OPEN&limit=200").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["total"], 2);
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|c| c["status"] == "OPEN")
    );

    let (_, stats) = get(&app, "/api/cases/stats").await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["open"], 2);
    assert_eq!(stats["closed"], 1);
}

#[tokio::test]
async fn far_out_pages_are_empty() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;
    let (code, _) = post(&app, "/api/cases", json!({ "title": "Only" })).await;
    assert_eq!(code, StatusCode::CREATED);

    for uri in [
        "/api/cases?page=99999999999999999999",
        "/api/cases?page=100000000000000000&limit=100",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
        assert_eq!(body["data"], json!([]), "{uri}");
        assert_eq!(body["pagination"]["total"], 1, "{uri}");
    }
}

#[tokio::test]
async fn case_priority_out_of_range_is_rejected() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;
    let (status, body) = post(&app, "/api/cases", json!({ "title": "x", "priority": 9 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ValidationError");
}

#[tokio::test]
async fn case_patch_clears_assignee() {
    let app = app().await;
    let acme = company(&app, "ACME Corp", "acme").await;
    let (_, agent) = post(
        &app,
        "/api/users",
        json!({
            "email": "agent@acme.com",
            "password": "correct-horse",
            "companyId": acme["id"],
        }),
    )
    .await;

    let (_, case) = post(
        &app,
        "/api/cases",
        json!({ "title": "Recovery", "assignedToId": agent["id"] }),
    )
    .await;
    assert_eq!(case["assignedTo"]["email"], "agent@acme.com");

    let uri = format!("/api/cases/{}", case["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "assignedToId": null, "status": "IN_PROGRESS" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["status"], "IN_PROGRESS");
    assert!(updated["assignedToId"].is_null());
    assert_eq!(updated["caseNumber"], case["caseNumber"]);
}

#[tokio::test]
async fn unknown_tenant_is_not_found() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;

    let (status, body) = get(&app, "/api/tenants/ghost/cases").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, status, "NotFoundError", "/api/tenants/ghost/cases");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unconfigured_default_tenant_is_not_found() {
    let app = app().await;
    let (status, body) = get(&app, "/api/projects").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Company not found");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app().await;
    let (status, body) = get(&app, "/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body, status, "NotFoundError", "/api/nothing-here");
}

#[tokio::test]
async fn credits_purchase_then_reject_overdraw() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;

    let (status, receipt) = post(
        &app,
        "/api/credits/purchase",
        json!({ "amount": 50, "description": "top-up" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["account"]["balance"], 50);
    assert_eq!(receipt["transaction"]["type"], "PURCHASE");

    let (status, _) = post(&app, "/api/credits/use", json!({ "amount": 20 })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(&app, "/api/credits/use", json!({ "amount": 31 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ValidationError");

    let (_, statement) = get(&app, "/api/credits").await;
    let account = &statement["account"];
    assert_eq!(account["balance"], 30);
    assert_eq!(account["totalPurchased"], 50);
    assert_eq!(account["totalUsed"], 20);
    assert_eq!(statement["transactions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn analytics_list_carries_grouped_series() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;

    for (period, value) in [("2024-01", 10.0), ("2024-02", 30.0)] {
        let (status, _) = post(
            &app,
            "/api/analytics",
            json!({ "metricName": "recovered", "metricValue": value, "period": period }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/analytics").await;
    assert_eq!(status, StatusCode::OK);
    let groups = body["aggregated"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["name"], "recovered");
    assert_eq!(groups[0]["total"], 40.0);
    assert_eq!(groups[0]["avg"], 20.0);
}

#[tokio::test]
async fn assets_apply_placeholder_defaults() {
    let app = app().await;
    company(&app, "ACME Corp", "acme").await;

    let (status, asset) = post(&app, "/api/assets", json!({ "title": "Vault photo" })).await;
    assert_eq!(status, StatusCode::CREATED, "{asset}");
    assert_eq!(asset["type"], "OTHER");
    assert_eq!(asset["filename"], "asset.jpg");
    assert_eq!(asset["mimeType"], "image/jpeg");
    assert!(asset["filepath"].as_str().unwrap().starts_with("/assets/"));

    let (_, stats) = get(&app, "/api/assets/stats").await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["byType"]["OTHER"], 1);
}

#[tokio::test]
async fn opportunities_rank_by_score_then_deadline() {
    let app = app().await;

    for (solicitation, description, deadline) in [
        ("S-1", "AI ML cloud cybersecurity data analytics", "2031-06-01"),
        ("S-2", "AI ML cloud cybersecurity data analytics", "2031-01-01"),
        ("S-3", "cloud cybersecurity data analytics ML", "2030-01-01"),
    ] {
        let (status, body) = post(
            &app,
            "/api/opportunities",
            json!({
                "solicitation": solicitation,
                "title": format!("Contract {solicitation}"),
                "agency": "Department of Energy",
                "description": description,
                "postedDate": "2030-01-01",
                "responseDeadline": deadline,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = get(&app, "/api/opportunities?minScore=90").await;
    assert_eq!(status, StatusCode::OK);
    let solicitations: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["solicitation"].as_str().unwrap())
        .collect();
    assert_eq!(solicitations, ["S-2", "S-1"]);

    let (_, everything) = get(&app, "/api/opportunities?agency=energy").await;
    assert_eq!(everything["pagination"]["total"], 3);
    assert_eq!(everything["data"][2]["aiScore"], 83.0);

    let (status, _) = post(
        &app,
        "/api/opportunities",
        json!({
            "solicitation": "S-1",
            "title": "Again",
            "agency": "DOE",
            "postedDate": "2030-01-01",
            "responseDeadline": "2030-02-01",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn mock_completion_round_trip() {
    let app = app().await;
    let (status, body) = post(
        &app,
        "/api/ai/completions",
        json!({ "user": "summarise case" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Mock AI Response for: summarise case");
    assert_eq!(body["usage"]["totalTokens"], 150);
}
