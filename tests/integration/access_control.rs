//! Router-level access checks.
//!
//! Every request here is rejected before any query runs, so the pool is
//! connected lazily and no database is needed. Tokens are resolved by an
//! in-memory principal source instead of the users table.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use labdesk_server::{
    config::AppConfig,
    create_router,
    error::{AppError, AppResult},
    models::{Role, UserClaims},
    repository::Repository,
    services::{auth::PrincipalSource, Services},
    AppState,
};

/// Accounts exactly as their tokens describe them
struct TokenPrincipals;

#[async_trait]
impl PrincipalSource for TokenPrincipals {
    async fn resolve(&self, claims: UserClaims) -> AppResult<UserClaims> {
        Ok(claims)
    }
}

/// Accounts rejected since their token was issued
struct RejectedPrincipals;

#[async_trait]
impl PrincipalSource for RejectedPrincipals {
    async fn resolve(&self, _claims: UserClaims) -> AppResult<UserClaims> {
        Err(AppError::Authentication("Account is REJECTED".to_string()))
    }
}

fn app() -> Router {
    app_with(Arc::new(TokenPrincipals))
}

fn app_with(principals: Arc<dyn PrincipalSource>) -> Router {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    let services = Services::new(Repository::new(pool), &config)
        .expect("services")
        .with_principals(principals);
    create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

fn token(role: Role, department_id: Option<Uuid>) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: "someone@example.edu".to_string(),
        user_id: Uuid::new_v4(),
        role,
        department_id,
        lab_id: None,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&AppConfig::default().auth.jwt_secret)
    .expect("token")
}

async fn send(method: Method, uri: &str, bearer: Option<String>, body: Option<Value>) -> (StatusCode, Value) {
    send_to(app(), method, uri, bearer, body).await
}

async fn send_to(
    app: Router,
    method: Method,
    uri: &str,
    bearer: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_needs_no_database() {
    let (status, body) = send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let (status, body) = send(Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
    assert_eq!(body["code"], 2);

    let (status, _) = send(Method::GET, "/api/stats", Some("not-a-jwt".to_string()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejected_account_loses_access_before_token_expires() {
    let (status, body) = send_to(
        app_with(Arc::new(RejectedPrincipals)),
        Method::GET,
        "/api/stats",
        Some(token(Role::Dean, None)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account is REJECTED");
}

#[tokio::test]
async fn hod_cannot_create_assets() {
    let body = json!({
        "name": "Workstation",
        "asset_number": "CSE-DT-0001",
        "asset_type": "DESKTOP",
        "department_id": Uuid::new_v4(),
    });
    let (status, _) = send(
        Method::POST,
        "/api/assets",
        Some(token(Role::Hod, Some(Uuid::new_v4()))),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dean_has_no_ticket_view() {
    let (status, _) = send(Method::GET, "/api/tickets", Some(token(Role::Dean, None)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn lab_incharge_has_no_request_view() {
    let (status, _) = send(Method::GET, "/api/requests", Some(token(Role::LabIncharge, None)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_hods_file_requests() {
    let body = json!({
        "title": "New lab",
        "description": "Networking lab for final years",
        "request_type": "LAB_SETUP",
    });
    for role in [Role::Dean, Role::Admin, Role::LabIncharge] {
        let (status, _) = send(Method::POST, "/api/requests", Some(token(role, None)), Some(body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", role);
    }
}

#[tokio::test]
async fn hod_cannot_change_request_status() {
    let uri = format!("/api/requests/{}", Uuid::new_v4());
    let (status, _) = send(
        Method::PATCH,
        &uri,
        Some(token(Role::Hod, Some(Uuid::new_v4()))),
        Some(json!({ "status": "APPROVED" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_the_dean_deletes_users() {
    let uri = format!("/api/users/{}", Uuid::new_v4());
    for role in [Role::Admin, Role::Hod] {
        let (status, _) = send(Method::DELETE, &uri, Some(token(role, None)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", role);
    }
}

#[tokio::test]
async fn lab_incharge_registration_needs_dean_token() {
    let body = json!({
        "name": "Priya",
        "email": "priya@example.edu",
        "password": "long-enough-password",
        "role": "LAB_INCHARGE",
    });
    let (status, _) = send(Method::POST, "/api/register", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let hod = token(Role::Hod, Some(Uuid::new_v4()));
    let (status, _) = send(Method::POST, "/api/register", Some(hod), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_cannot_self_register() {
    let body = json!({
        "name": "Mallory",
        "email": "mallory@example.edu",
        "password": "long-enough-password",
        "role": "ADMIN",
    });
    let (status, _) = send(Method::POST, "/api/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_password_fails_validation() {
    let body = json!({
        "name": "Ravi",
        "email": "ravi@example.edu",
        "password": "short",
        "department_name": "Physics",
    });
    let (status, _) = send(Method::POST, "/api/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/requests/{id}"]["patch"].is_object());
}
