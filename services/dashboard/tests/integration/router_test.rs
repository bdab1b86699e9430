use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::middleware::{Next, from_fn};
use axum::routing::{get, post};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::Value;

use havenz_auth_types::identity::Identity;
use havenz_auth_types::permission::Operation;
use havenz_core::config::Config as _;
use havenz_core::tasks::BackgroundTasks;
use havenz_domain::role::RoleCode;

use havenz_dashboard::config::DashboardConfig;
use havenz_dashboard::error::DashboardError;
use havenz_dashboard::handlers::user::UserResponse;
use havenz_dashboard::infra::email::AppEmailSender;
use havenz_dashboard::infra::identity::HttpIdentityDirectory;
use havenz_dashboard::router::{build_router, gated};
use havenz_dashboard::state::AppState;

use crate::helpers::{actor, test_shop, test_user, verifier};

async fn ok() -> StatusCode {
    StatusCode::OK
}

async fn rejects_phone() -> Result<StatusCode, DashboardError> {
    Err(DashboardError::validation("phone", "must be in the format 555-555-5555"))
}

/// Permission-gated routes behind a stand-in for the authentication middleware.
fn gated_server(identity: Option<Identity>) -> TestServer {
    let router = Router::new()
        .route(
            "/users",
            gated(get(ok), Operation::UsersList).merge(gated(post(ok), Operation::UsersCreate)),
        )
        .route(
            "/workorders",
            gated(get(ok), Operation::WorkOrdersList)
                .merge(gated(post(ok), Operation::WorkOrdersCreate)),
        )
        .route("/me", gated(get(ok), Operation::MeGet))
        .route("/invalid", get(rejects_phone))
        .layer(from_fn(move |mut req: Request, next: Next| {
            let identity = identity.clone();
            async move {
                if let Some(identity) = identity {
                    req.extensions_mut().insert(identity);
                }
                next.run(req).await
            }
        }));
    TestServer::new(router).unwrap()
}

fn config() -> DashboardConfig {
    let vars = [
        ("DATABASE_URL", "postgres://localhost/havenz"),
        ("TOKEN_ISSUER", "https://securetoken.test/havenz"),
        ("TOKEN_AUDIENCE", "havenz-test"),
        ("TOKEN_HS256_SECRET", "havenz-test-secret"),
        ("IDENTITY_API_URL", "http://127.0.0.1:9"),
        ("IDENTITY_PROJECT_ID", "havenz-test"),
        ("CORS_ALLOWED_ORIGINS", "https://dashboard.havenzsure.ca, http://localhost:3000"),
    ];
    DashboardConfig::from_iter(vars.map(|(k, v)| (k.to_owned(), v.to_owned()))).unwrap()
}

/// Full router over a state whose database is never reached by these requests.
fn app_server() -> TestServer {
    let config = config();
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        verifier: verifier(),
        directory: HttpIdentityDirectory::open(&config).unwrap(),
        email: AppEmailSender::open(&config),
        tasks: BackgroundTasks::new(),
    };
    TestServer::new(build_router(state, &config).unwrap()).unwrap()
}

// ── Permission gate ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_admin_through_user_routes() {
    let s1 = test_shop("S1");
    let server = gated_server(Some(actor(RoleCode::Admin, Some(&s1))));

    server.get("/users").await.assert_status_ok();
    server.post("/users").await.assert_status_ok();
}

#[tokio::test]
async fn should_forbid_staff_on_user_routes() {
    let s1 = test_shop("S1");
    let server = gated_server(Some(actor(RoleCode::Adjuster, Some(&s1))));

    let resp = server.get("/users").await;
    resp.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(resp.json::<Value>()["kind"], "FORBIDDEN");
    server.get("/me").await.assert_status_ok();
}

#[tokio::test]
async fn should_follow_table_for_work_order_intake() {
    let s1 = test_shop("S1");

    let adjuster = gated_server(Some(actor(RoleCode::Adjuster, Some(&s1))));
    adjuster.post("/workorders").await.assert_status_ok();

    let bodyman = gated_server(Some(actor(RoleCode::Bodyman, Some(&s1))));
    bodyman.get("/workorders").await.assert_status_ok();
    bodyman
        .post("/workorders")
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_gated_route_without_identity() {
    let server = gated_server(None);
    server
        .get("/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_render_field_errors_as_json() {
    let server = gated_server(None);
    let resp = server.get("/invalid").await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body = resp.json::<Value>();
    assert_eq!(body["kind"], "VALIDATION");
    assert_eq!(body["field"], "phone");
}

// ── Full router ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_liveness_without_credentials() {
    let server = app_server();
    let resp = server.get("/healthz").await;

    resp.assert_status_ok();
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_echo_client_request_id() {
    let server = app_server();
    let resp = server
        .get("/healthz")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-123"),
        )
        .await;
    assert_eq!(resp.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn should_reject_api_call_without_bearer() {
    let server = app_server();
    let resp = server.get("/users").await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body = resp.json::<Value>();
    assert_eq!(body["kind"], "UNAUTHORIZED");
    assert_eq!(body["message"], "unauthorized");
}

#[tokio::test]
async fn should_reject_tampered_bearer_with_same_response() {
    let server = app_server();
    let resp = server
        .get("/me")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer not.a.jwt"))
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json::<Value>()["message"], "unauthorized");
}

#[tokio::test]
async fn should_answer_cors_preflight_for_allowed_origin() {
    let server = app_server();
    let resp = server
        .method(Method::OPTIONS, "/users")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("https://dashboard.havenzsure.ca"),
        )
        .add_header(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        )
        .await;

    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://dashboard.havenzsure.ca"
    );
}

// ── Response shape ───────────────────────────────────────────────────────────

#[test]
fn should_serialize_user_in_camel_case_with_millisecond_timestamps() {
    let s1 = test_shop("S1");
    let user = test_user(RoleCode::Adjuster, Some(&s1));
    let json = serde_json::to_value(UserResponse::from(user.clone())).unwrap();

    assert_eq!(json["id"], user.id.to_string());
    assert_eq!(json["roleCode"], "adjuster");
    assert_eq!(json["roleName"], "Adjuster");
    assert_eq!(json["shop"]["code"], "S1");
    assert_eq!(json["isActive"], true);
    assert!(json["deactivatedAt"].is_null());
    assert!(json.get("externalId").is_none());
    assert!(json.get("tokenVersion").is_none());

    let created = json["createdAt"].as_str().unwrap();
    assert!(created.ends_with('Z'));
    assert_eq!(created.split('.').nth(1).map(str::len), Some(4));
}
