//! Payment-intent API tests.

#![allow(clippy::expect_used, clippy::indexing_slicing)]

use localguide_core::catalog::{CLAIM_LISTING, FEATURED_LISTING};
use localguide_integration_tests::{ServerOptions, TestServer};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn json_body(response: reqwest::Response) -> Value {
    response.json().await.expect("json body")
}

#[tokio::test]
async fn test_service_intent_returns_client_secret() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/api/payments/service-intent",
            &json!({ "serviceId": "website-5" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, json!({ "clientSecret": "pi_test_1_secret_website-5" }));

    let requests = server.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].product.id, "website-5");
    assert_eq!(requests[0].product.price.amount_minor, 49_900);
    assert!(requests[0].receipt_email.is_none());
}

#[tokio::test]
async fn test_client_supplied_amount_is_ignored() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/api/payments/service-intent",
            &json!({ "serviceId": "logo-design", "amount": 1, "currency": "jpy" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let requests = server.gateway.requests();
    assert_eq!(requests[0].product.price.amount_minor, 14_900);
    assert_eq!(requests[0].product.price.currency.as_api_str(), "usd");
}

#[tokio::test]
async fn test_unknown_service_rejected() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/api/payments/service-intent",
            &json!({ "serviceId": "website-500" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Invalid service" })
    );
    assert!(server.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_featured_listing_carries_receipt_email() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/api/payments/featured-listing-intent",
            &json!({ "email": "owner@example.com" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let requests = server.gateway.requests();
    assert_eq!(requests[0].product, FEATURED_LISTING);
    assert_eq!(
        requests[0].receipt_email.as_ref().map(|e| e.as_str()),
        Some("owner@example.com")
    );
}

#[tokio::test]
async fn test_claim_listing_invalid_email_never_reaches_processor() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/api/payments/claim-listing-intent",
            &json!({ "email": "not-an-email" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Please enter a valid email address." })
    );
    assert!(server.gateway.requests().is_empty());
}

#[tokio::test]
async fn test_claim_listing_uses_catalog_price() {
    let server = TestServer::start().await;

    let response = server
        .post_json(
            "/api/payments/claim-listing-intent",
            &json!({ "email": "owner@example.com" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.gateway.requests()[0].product, CLAIM_LISTING);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let server = TestServer::start().await;

    let response = server
        .client
        .post(server.url("/api/payments/service-intent"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Invalid request body" })
    );
}

#[tokio::test]
async fn test_processor_error_message_returned() {
    let server = TestServer::start().await;
    server.gateway.decline_with("Your card was declined.");

    let response = server
        .post_json(
            "/api/payments/service-intent",
            &json!({ "serviceId": "seo-audit" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Your card was declined." })
    );
}

#[tokio::test]
async fn test_payments_not_configured() {
    let server = TestServer::start_with(ServerOptions {
        payments: false,
        ..ServerOptions::default()
    })
    .await;

    let response = server
        .post_json(
            "/api/payments/service-intent",
            &json!({ "serviceId": "website-5" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Payments are not configured" })
    );
}

#[tokio::test]
async fn test_price_list() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/api/payments/services"))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let services = body["services"].as_array().expect("services array");
    assert_eq!(services.len(), 5);
    assert_eq!(services[0]["id"], "website-5");
    assert_eq!(services[0]["price"], "$499.00");
    assert_eq!(body["listingOffers"][0]["id"], "featured-listing");
    assert_eq!(body["listingOffers"][1]["amount"], 1_900);
}
