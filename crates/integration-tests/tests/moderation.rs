//! Moderation console tests: listing, status changes, and the admin gate on
//! the write path.

#![allow(clippy::expect_used)]

use localguide_core::SubmissionStatus;
use localguide_integration_tests::{TestServer, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_admin_approves_pending_submission() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let response = server.set_status("abc123", "approved").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/submissions");
    assert_eq!(
        server.submissions.writes(),
        vec![("abc123".to_string(), SubmissionStatus::Approved)]
    );
    assert_eq!(
        server.submissions.status_of("abc123"),
        Some(SubmissionStatus::Approved)
    );
}

#[tokio::test]
async fn test_non_admin_write_is_forbidden_and_not_applied() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");
    server
        .sign_in_with_role("editor@example.com", Some("editor"))
        .await;

    let response = server.set_status("abc123", "approved").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions&forbidden=1&reason=not_admin"
    );
    assert!(server.submissions.writes().is_empty());
    assert_eq!(
        server.submissions.status_of("abc123"),
        Some(SubmissionStatus::Pending)
    );
}

#[tokio::test]
async fn test_unknown_status_rejected_before_any_lookup() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");

    let response = server.set_status("abc123", "archived").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.expect("body"), "Invalid status.");
    assert_eq!(server.identity.lookups(), 0);
    assert!(server.submissions.writes().is_empty());
}

#[tokio::test]
async fn test_missing_id_rejected() {
    let server = TestServer::start().await;
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let response = server.set_status("", "approved").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.expect("body"), "Missing id.");
    assert!(server.submissions.writes().is_empty());
}

#[tokio::test]
async fn test_write_without_session_redirects_to_login() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");

    let response = server.set_status("abc123", "denied").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions&reason=no_session"
    );
    assert!(server.submissions.writes().is_empty());
}

#[tokio::test]
async fn test_store_refusal_surfaces_message() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");
    server
        .submissions
        .fail_writes_with("new row violates row-level security policy");
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let response = server.set_status("abc123", "approved").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await.expect("body");
    assert!(body.contains("row-level security"), "body was {body}");
}

#[tokio::test]
async fn test_unmatched_id_still_redirects() {
    let server = TestServer::start().await;
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let response = server.set_status("does-not-exist", "denied").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/submissions");
    assert_eq!(server.submissions.writes().len(), 1);
}

#[tokio::test]
async fn test_listing_shows_submissions_and_filters() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");
    server.submissions.add_pending("def456", "Harbor Hardware");
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let page = server
        .client
        .get(server.url("/admin/submissions"))
        .send()
        .await
        .expect("listing request");
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await.expect("body");
    assert!(html.contains("Corner Bakery"));
    assert!(html.contains("Harbor Hardware"));

    let approved = server
        .client
        .get(server.url("/admin/submissions?status=approved"))
        .send()
        .await
        .expect("filtered request");
    assert_eq!(approved.status(), StatusCode::OK);
    let html = approved.text().await.expect("body");
    assert!(!html.contains("Corner Bakery"));

    let invalid = server
        .client
        .get(server.url("/admin/submissions?status=archived"))
        .send()
        .await
        .expect("invalid filter request");
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_change_invalidates_cached_listing() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let pending_url = server.url("/admin/submissions?status=pending");
    let first = server
        .client
        .get(&pending_url)
        .send()
        .await
        .expect("first listing")
        .text()
        .await
        .expect("body");
    assert!(first.contains("Corner Bakery"));

    // Served from cache.
    server
        .client
        .get(&pending_url)
        .send()
        .await
        .expect("second listing");
    assert_eq!(server.submissions.list_calls(), 1);

    let response = server.set_status("abc123", "approved").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let after = server
        .client
        .get(&pending_url)
        .send()
        .await
        .expect("listing after write")
        .text()
        .await
        .expect("body");
    assert_eq!(server.submissions.list_calls(), 2);
    assert!(!after.contains("Corner Bakery"));
}

#[tokio::test]
async fn test_listing_requires_admin() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/admin/submissions?status=pending"))
        .send()
        .await
        .expect("listing request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/login?next=%2Fadmin%2Fsubmissions%3Fstatus%3Dpending&reason=no_session"
    );
    assert_eq!(server.submissions.list_calls(), 0);
}

#[tokio::test]
async fn test_render_racing_a_write_is_not_cached() {
    let server = TestServer::start().await;
    server.submissions.add_pending("abc123", "Corner Bakery");
    server
        .sign_in_with_role("admin@example.com", Some("admin"))
        .await;

    let pending_url = server.url("/admin/submissions?status=pending");
    let mut hold = server.submissions.hold_next_list();

    let client = server.client.clone();
    let url = pending_url.clone();
    let render = tokio::spawn(async move {
        client
            .get(url)
            .send()
            .await
            .expect("listing during write")
            .text()
            .await
            .expect("body")
    });

    // The listing has read the row as pending; approve it before it renders.
    hold.snapshot_taken().await;
    let response = server.set_status("abc123", "approved").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    hold.release();

    let during = render.await.expect("render task");
    assert!(during.contains("Corner Bakery"));

    let after = server
        .client
        .get(&pending_url)
        .send()
        .await
        .expect("listing after write")
        .text()
        .await
        .expect("body");
    assert_eq!(server.submissions.list_calls(), 2);
    assert!(!after.contains("Corner Bakery"));
}
