//! Admin sign-in and authorization gate tests.

#![allow(clippy::expect_used)]

use localguide_integration_tests::{PASSWORD, ServerOptions, TestServer, location};
use reqwest::StatusCode;

async fn get(server: &TestServer, path: &str) -> reqwest::Response {
    server
        .client
        .get(server.url(path))
        .send()
        .await
        .expect("request")
}

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await;

    let live = get(&server, "/health").await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.expect("body"), "ok");

    assert_eq!(get(&server, "/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_reaches_listing_after_sign_in() {
    let server = TestServer::start().await;
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let response = get(&server, "/admin/submissions").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sign_in_redirects_to_next() {
    let server = TestServer::start().await;
    server.identity.add_account("admin@example.com");

    let response = server
        .client
        .post(server.url("/admin/login"))
        .form(&[
            ("email", "admin@example.com"),
            ("password", PASSWORD),
            ("next", "/admin/submissions?status=denied"),
        ])
        .send()
        .await
        .expect("login");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/submissions?status=denied");
}

#[tokio::test]
async fn test_offsite_next_is_replaced() {
    let server = TestServer::start().await;
    server.identity.add_account("admin@example.com");

    let response = server
        .client
        .post(server.url("/admin/login"))
        .form(&[
            ("email", "admin@example.com"),
            ("password", PASSWORD),
            ("next", "//evil.example.com/phish"),
        ])
        .send()
        .await
        .expect("login");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/submissions");
}

#[tokio::test]
async fn test_wrong_password_rerenders_form() {
    let server = TestServer::start().await;
    server.identity.add_account("admin@example.com");

    let response = server
        .client
        .post(server.url("/admin/login"))
        .form(&[("email", "admin@example.com"), ("password", "nope")])
        .send()
        .await
        .expect("login");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let html = response.text().await.expect("body");
    assert!(html.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_empty_credentials_rejected() {
    let server = TestServer::start().await;

    let response = server
        .client
        .post(server.url("/admin/login"))
        .form(&[("email", ""), ("password", "")])
        .send()
        .await
        .expect("login");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.identity.lookups(), 0);
}

#[tokio::test]
async fn test_signed_in_without_profile_is_forbidden() {
    let server = TestServer::start().await;
    server.identity.add_account("new@example.com");
    server.sign_in("new@example.com").await;

    let response = get(&server, "/admin/submissions").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions&forbidden=1&reason=no_profile"
    );
}

#[tokio::test]
async fn test_profile_lookup_failure_is_forbidden() {
    let server = TestServer::start().await;
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;
    server.profiles.set_failing(true);

    let response = get(&server, "/admin/submissions").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions&forbidden=1&reason=profile_error"
    );
}

#[tokio::test]
async fn test_role_match_is_exact() {
    let server = TestServer::start().await;
    server
        .sign_in_with_role("admin@example.com", Some("Admin"))
        .await;

    let response = get(&server, "/admin/submissions").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).ends_with("&forbidden=1&reason=not_admin"));
}

#[tokio::test]
async fn test_identity_outage_denies_without_forbidden() {
    let server = TestServer::start().await;
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;
    server.identity.set_unavailable(true);

    let response = get(&server, "/admin/submissions").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions&reason=identity_error"
    );
}

#[tokio::test]
async fn test_reason_hidden_in_production() {
    let server = TestServer::start_with(ServerOptions {
        production: true,
        ..ServerOptions::default()
    })
    .await;
    server
        .sign_in_with_role("editor@example.com", Some("editor"))
        .await;

    let response = get(&server, "/admin/submissions").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions&forbidden=1"
    );
}

#[tokio::test]
async fn test_login_page_shows_forbidden_notice() {
    let server = TestServer::start().await;

    let html = get(
        &server,
        "/admin/login?next=%2Fadmin%2Fsubmissions&forbidden=1&reason=not_admin",
    )
    .await
    .text()
    .await
    .expect("body");

    assert!(html.contains("does not have admin access"));
    assert!(html.contains("not_admin"));
    assert!(html.contains(r#"name="next" value="/admin/submissions""#));
}

#[tokio::test]
async fn test_login_page_drops_reason_in_production() {
    let server = TestServer::start_with(ServerOptions {
        production: true,
        ..ServerOptions::default()
    })
    .await;

    let html = get(&server, "/admin/login?forbidden=1&reason=not_admin")
        .await
        .text()
        .await
        .expect("body");

    assert!(html.contains("does not have admin access"));
    assert!(!html.contains("not_admin"));
}

#[tokio::test]
async fn test_logout_ends_admin_session() {
    let server = TestServer::start().await;
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;
    assert_eq!(
        get(&server, "/admin/submissions").await.status(),
        StatusCode::OK
    );

    let response = server
        .client
        .post(server.url("/admin/logout"))
        .send()
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");

    let after = get(&server, "/admin/submissions").await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert!(location(&after).ends_with("reason=no_session"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let server = TestServer::start().await;

    let response = get(&server, "/admin/login").await;

    let headers = response.headers();
    assert_eq!(
        headers
            .get("x-frame-options")
            .and_then(|v| v.to_str().ok()),
        Some("DENY")
    );
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_expired_token_treated_as_signed_out() {
    let server = TestServer::start().await;
    server.identity.set_token_lifetime(Some(0));
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let response = get(&server, "/admin/submissions").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions&reason=no_session"
    );
    assert_eq!(server.identity.lookups(), 0);
}
