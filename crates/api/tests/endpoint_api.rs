//! Endpoint CRUD API tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{body_json, build_test_app, request, seed_user_with_token, StubRunner};

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_endpoint_crud_roundtrip(pool: PgPool) {
    let (_, token) = seed_user_with_token(&pool, "owner@example.com").await;
    let (app, _) = build_test_app(pool.clone(), StubRunner::default());

    // Create.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/endpoints",
            &token,
            Some(json!({ "name": "edge router", "address": "192.168.1.1" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let endpoint_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["address"], "192.168.1.1");

    // Update address.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/endpoints/{endpoint_id}"),
            &token,
            Some(json!({ "address": "gateway.internal.example.com" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["address"], "gateway.internal.example.com");
    assert_eq!(body["data"]["name"], "edge router");

    // List.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/endpoints", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);

    // Delete.
    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/v1/endpoints/{endpoint_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/endpoints/{endpoint_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_endpoint_address_syntax_is_validated(pool: PgPool) {
    let (_, token) = seed_user_with_token(&pool, "owner@example.com").await;
    let (app, _) = build_test_app(pool.clone(), StubRunner::default());

    for bad in ["", "not a host", "999.999.1.1 extra", "-bad-.example.com"] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/endpoints",
                &token,
                Some(json!({ "name": "x", "address": bad })),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "address {bad:?} should be rejected"
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_endpoints_are_owner_scoped(pool: PgPool) {
    let (_, owner_token) = seed_user_with_token(&pool, "owner@example.com").await;
    let (_, other_token) = seed_user_with_token(&pool, "other@example.com").await;
    let (app, _) = build_test_app(pool.clone(), StubRunner::default());

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/endpoints",
            &owner_token,
            Some(json!({ "name": "mine", "address": "10.0.0.1" })),
        ))
        .await
        .unwrap();
    let endpoint_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/v1/endpoints/{endpoint_id}"),
            &other_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
