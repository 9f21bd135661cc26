//! Integration tests for the session bridge middleware.
//!
//! These drive the assembled router and check how the provider session and
//! the backend token cookie are reconciled per request.

use axum::http::StatusCode;

use xano_bridge_integration_tests::{
    INVALID_CREDENTIAL, TestContext, TestRequest, USER_ID, clears_token, json_body, location,
    set_cookies,
};

// =============================================================================
// Signed out with a stale token
// =============================================================================

#[tokio::test]
async fn test_logout_landing_passes_through_and_strips_token() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            TestRequest::get("/")
                .with_token("stale")
                .with_referer("http://localhost:3000/app/dashboard")
                .build(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_token(&response), "token should be stripped");
    let body = json_body(response).await;
    assert_eq!(body["signed_in"], false);
}

#[tokio::test]
async fn test_stale_token_on_protected_route_redirects_to_sign_in() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(TestRequest::get("/app/dashboard").with_token("stale").build())
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sign-in");
    assert!(clears_token(&response));
}

#[tokio::test]
async fn test_stale_token_on_public_route_is_stripped() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            TestRequest::get("/")
                .with_token("stale")
                .with_referer("https://news.example.com/")
                .build(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_token(&response));
}

#[tokio::test]
async fn test_invalid_credential_counts_as_signed_out() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            TestRequest::get("/app")
                .signed_in_as(INVALID_CREDENTIAL)
                .with_token("stale")
                .build(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sign-in");
    assert!(clears_token(&response));
}

// =============================================================================
// Signed out without a token
// =============================================================================

#[tokio::test]
async fn test_public_route_untouched() {
    let ctx = TestContext::new().await;

    let response = ctx.send(TestRequest::get("/").build()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_protected_page_redirects_to_sign_in_with_return_url() {
    let ctx = TestContext::new().await;

    let response = ctx.send(TestRequest::get("/app?tab=1").build()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/sign-in?redirect_url=http%3A%2F%2Flocalhost%3A3000%2Fapp%3Ftab%3D1"
    );
}

#[tokio::test]
async fn test_protected_api_returns_401_json() {
    let ctx = TestContext::new().await;

    let response = ctx.send(TestRequest::get("/api/get-xano-cookie").build()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Unauthorized - Please sign in");
}

// =============================================================================
// Signed in
// =============================================================================

#[tokio::test]
async fn test_missing_token_redirects_to_sync() {
    let ctx = TestContext::new().await;

    let response = ctx.send(TestRequest::get("/app").signed_in().build()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/api/sync-xano?redirect=http%3A%2F%2Flocalhost%3A3000%2Fapp"
    );
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_sync_exempt_route_skips_sync() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(TestRequest::get("/api/logout").signed_in().build())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_signed_in_with_token_reaches_handler() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            TestRequest::get("/app/dashboard")
                .signed_in()
                .with_token("tok")
                .build(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user_id"], USER_ID);
    assert_eq!(body["backend_session"], true);
}

#[tokio::test]
async fn test_signed_in_landing() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            TestRequest::get("/?error=sync-failed&message=nope")
                .signed_in()
                .build(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["signed_in"], true);
    assert_eq!(body["error"], "sync-failed");
    assert_eq!(body["message"], "nope");
}

// =============================================================================
// Outside the bridge
// =============================================================================

#[tokio::test]
async fn test_health_is_not_bridged() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(TestRequest::get("/health").with_token("stale").build())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_static_assets_skip_the_bridge() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(TestRequest::get("/favicon.ico").with_token("stale").build())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(set_cookies(&response).is_empty());

    let response = ctx
        .send(TestRequest::get("/assets/app.css").signed_in().build())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx.send(TestRequest::get("/api/export.csv").build()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_readiness_reflects_xano_settings() {
    let ctx = TestContext::new().await;
    let response = ctx.send(TestRequest::get("/health/ready").build()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let ctx = TestContext::with_env(&[("XANO_USERS_API_ROUTE", "")]).await;
    let response = ctx.send(TestRequest::get("/health/ready").build()).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let ctx = TestContext::new().await;

    let response = ctx.send(TestRequest::get("/app").build()).await;

    assert!(response.headers().contains_key("x-request-id"));
}
