mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use jobboard_api::auth::service as auth;
use jobboard_api::auth::validation::ValidSignup;
use jobboard_api::auth::TokenService;
use jobboard_api::jobs::service as jobs;
use jobboard_api::jobs::validation::NewJob;
use jobboard_api::models::job::JobStatus;
use jobboard_api::models::user::Role;
use jobboard_api::routes::build_router;

use common::{lazy_pool, TestApp, TEST_SECRET};

fn app() -> (TestApp, Router) {
    let test_app = TestApp::new(lazy_pool());
    let router = build_router(test_app.state.clone());
    (test_app, router)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

const BOUNDARY: &str = "apply-form-boundary";

/// Builds a `multipart/form-data` body. Parts are `(name, Some((file_name, content_type)), data)`.
fn multipart_body(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((file_name, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn apply_request(auth: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/applications")
        .header(header::AUTHORIZATION, auth)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn assert_error_envelope(body: &Value) {
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
    assert!(body["errors"].is_array());
    assert!(body["object"].is_null());
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, router) = app();
    let (status, body) = send(router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "jobboard-api");
}

#[tokio::test]
async fn me_without_token_is_401_envelope() {
    let (_, router) = app();
    let (status, body) = send(router, get("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn garbage_bearer_token_is_401() {
    let (_, router) = app();
    let (status, body) = send(router, get("/api/auth/me", Some("Bearer not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn expired_session_token_is_401_token_expired() {
    let (_, router) = app();
    let stale = TokenService::new(TEST_SECRET, -120, 3600)
        .issue_session(uuid::Uuid::new_v4(), "old@example.com", Role::Company)
        .unwrap();
    let auth = format!("Bearer {}", stale.token);
    let (status, body) = send(router, get("/api/jobs/my-jobs", Some(&auth))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let (_, router) = app();
    let forged = TokenService::new("another-secret", 3600, 3600)
        .issue_session(uuid::Uuid::new_v4(), "x@example.com", Role::Company)
        .unwrap();
    let auth = format!("Bearer {}", forged.token);
    let (status, _) = send(router, get("/api/jobs/my-jobs", Some(&auth))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn applicant_cannot_create_job() {
    let (test_app, router) = app();
    let auth = test_app.bearer(Role::Applicant);
    let request = json_request("POST", "/api/jobs", Some(&auth), r#"{"title":"Engineer"}"#);
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn company_cannot_apply() {
    let (test_app, router) = app();
    let auth = test_app.bearer(Role::Company);
    let request = Request::builder()
        .method("POST")
        .uri("/api/applications")
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=X")
        .body(Body::from("--X--\r\n"))
        .unwrap();
    let (status, _) = send(router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn applicant_cannot_change_application_status() {
    let (test_app, router) = app();
    let auth = test_app.bearer(Role::Applicant);
    let uri = format!("/api/applications/{}/status", uuid::Uuid::new_v4());
    let request = json_request("PUT", &uri, Some(&auth), r#"{"status":"HIRED"}"#);
    let (status, _) = send(router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn signup_validation_errors_are_aggregated() {
    let (_, router) = app();
    let request = json_request("POST", "/api/auth/signup", None, "{}");
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn weak_password_lists_every_missing_rule() {
    let (_, router) = app();
    let request = json_request(
        "POST",
        "/api/auth/signup",
        None,
        r#"{"name":"Jane Doe","email":"jane@x.com","password":"abc","role":"APPLICANT"}"#,
    );
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn malformed_json_uses_envelope() {
    let (_, router) = app();
    let request = json_request("POST", "/api/auth/login", None, "{not json");
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn malformed_job_id_uses_envelope() {
    let (_, router) = app();
    let (status, body) = send(router, get("/api/jobs/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn search_rejects_out_of_range_page_size() {
    let (_, router) = app();
    let (status, body) = send(router, get("/api/jobs/search?pageSize=0&page=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn my_jobs_rejects_unknown_status() {
    let (test_app, router) = app();
    let auth = test_app.bearer(Role::Company);
    let (status, body) = send(router, get("/api/jobs/my-jobs?status=PAUSED", Some(&auth))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "Invalid job status: PAUSED");
}

#[tokio::test]
async fn create_job_reports_field_errors() {
    let (test_app, router) = app();
    let auth = test_app.bearer(Role::Company);
    let request = json_request(
        "POST",
        "/api/jobs",
        Some(&auth),
        r#"{"title":"","description":"short"}"#,
    );
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn verify_email_requires_token() {
    let (_, router) = app();
    let (status, body) = send(router, get("/api/auth/verify-email", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn apply_form_without_fields_is_rejected() {
    let (test_app, router) = app();
    let auth = test_app.bearer(Role::Applicant);
    let body = "--X\r\nContent-Disposition: form-data; name=\"coverLetter\"\r\n\r\nHello\r\n--X--\r\n";
    let request = Request::builder()
        .method("POST")
        .uri("/api/applications")
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=X")
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        serde_json::json!(["Job ID is required", "Resume file is required"])
    );
}

#[tokio::test]
async fn apply_body_over_limit_is_file_size_error() {
    let (test_app, router) = app();
    let auth = test_app.bearer(Role::Applicant);
    let job_id = uuid::Uuid::new_v4().to_string();
    let resume = vec![b'%'; 11 * 1024 * 1024];
    let body = multipart_body(&[
        ("jobId", None, job_id.as_bytes()),
        ("resume", Some(("resume.pdf", "application/pdf")), &resume),
    ]);

    let (status, body) = send(router, apply_request(&auth, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);
    assert_eq!(body["message"], "File size exceeded");
    assert_eq!(test_app.store.len(), 0);
}

#[sqlx::test(migrator = "jobboard_api::db::MIGRATOR")]
#[ignore]
async fn apply_through_router_stores_resume(pool: PgPool) {
    let test_app = TestApp::new(pool);
    let s = &test_app.state;
    let signup = |name: &str, email: &str, role| ValidSignup {
        name: name.to_string(),
        email: email.to_string(),
        password: "P@ssw0rd1".to_string(),
        role,
    };
    let company = auth::signup(
        &s.db,
        &s.tokens,
        &s.notifier,
        signup("Acme Corp", "hr@acme.com", Role::Company),
    )
    .await
    .unwrap();
    let applicant = auth::signup(
        &s.db,
        &s.tokens,
        &s.notifier,
        signup("Jane Doe", "jane@x.com", Role::Applicant),
    )
    .await
    .unwrap();
    let job = jobs::create_job(
        &s.db,
        company.id,
        NewJob {
            title: "Engineer".to_string(),
            description: "Design, build and run our backend services.".to_string(),
            location: None,
            status: JobStatus::Open,
        },
    )
    .await
    .unwrap();

    let auth = test_app.bearer_for(applicant.id, "jane@x.com", Role::Applicant);
    let job_id = job.id.to_string();
    let body = multipart_body(&[
        ("jobId", None, job_id.as_bytes()),
        ("coverLetter", None, b"Keen to join."),
        ("resume", Some(("resume.pdf", "application/pdf")), b"%PDF-1.4 resume"),
    ]);
    let router = build_router(s.clone());

    let (status, body) = send(router, apply_request(&auth, body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["object"]["status"], "APPLIED");
    assert_eq!(body["object"]["jobId"], job_id);
    assert_eq!(body["object"]["coverLetter"], "Keen to join.");
    assert_eq!(test_app.store.len(), 1);
}
