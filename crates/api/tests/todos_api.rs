//! Integration tests for `/api/todos`.
//!
//! The test app runs against the in-memory gateway scoped to
//! `common::TEST_TENANT` / `common::TEST_PROJECT`.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch_json, post_json, TEST_PROJECT, TEST_TENANT};
use serde_json::json;
use webmarket_db::repositories::todo_repo::TODOS_TABLE;

async fn create(app: &common::TestApp, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(app.router(), "/api/todos", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["error"].is_null());
    json["data"].clone()
}

fn titles(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Test: create and read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_stamps_scope_and_get_returns_row() {
    let app = common::build_test_app();

    let todo = create(
        &app,
        json!({"title": "Launch site", "priority": "high", "tenantid": "intruder"}),
    )
    .await;
    assert_eq!(todo["tenantid"], TEST_TENANT);
    assert_eq!(todo["projectid"], TEST_PROJECT);
    assert_eq!(todo["completed"], false);

    let id = todo["id"].as_str().unwrap();
    let response = get(app.router(), &format!("/api/todos/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Launch site");
    assert!(json["error"].is_null());
    assert!(json.get("count").is_none());
}

#[tokio::test]
async fn get_missing_todo_reports_upstream_error() {
    let app = common::build_test_app();

    let response = get(app.router(), "/api/todos/not-a-real-id").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert!(json["data"].is_null());
    assert_eq!(json["error"]["code"], "PGRST116");
}

#[tokio::test]
async fn blank_title_is_rejected_before_the_database() {
    let app = common::build_test_app();

    let response = post_json(app.router(), "/api/todos", json!({"title": "  "})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
    assert_eq!(app.gateway.row_count(TODOS_TABLE).await, 0);
}

// ---------------------------------------------------------------------------
// Test: listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_newest_first_with_count_and_pagination() {
    let app = common::build_test_app();
    for title in ["one", "two", "three"] {
        create(&app, json!({"title": title})).await;
    }

    let json = body_json(get(app.router(), "/api/todos").await).await;
    assert_eq!(titles(&json), ["three", "two", "one"]);
    assert_eq!(json["count"], 3);

    let page = body_json(get(app.router(), "/api/todos?page=2&pageSize=2").await).await;
    assert_eq!(titles(&page), ["one"]);
    assert_eq!(page["count"], 3);

    let sorted = body_json(get(app.router(), "/api/todos?sort=title&ascending=true").await).await;
    assert_eq!(titles(&sorted), ["one", "three", "two"]);
}

#[tokio::test]
async fn list_rejects_unknown_sort_column_and_zero_page() {
    let app = common::build_test_app();

    let response = get(app.router(), "/api/todos?sort=tenantid;drop").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app.router(), "/api/todos?page=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]["message"].as_str().unwrap().contains("page"));
}

#[tokio::test]
async fn filters_with_no_match_return_empty_list_and_null_error() {
    let app = common::build_test_app();
    create(&app, json!({"title": "Buy milk", "priority": "low"})).await;

    let by_priority = body_json(get(app.router(), "/api/todos/priority/urgent").await).await;
    assert_eq!(by_priority["data"], json!([]));
    assert!(by_priority["error"].is_null());

    let search = body_json(get(app.router(), "/api/todos/search?q=bread").await).await;
    assert_eq!(search["data"], json!([]));
    assert!(search["error"].is_null());

    let filtered = body_json(get(app.router(), "/api/todos?priority=high&completed=false").await).await;
    assert_eq!(filtered["count"], 0);
}

#[tokio::test]
async fn search_and_incomplete_listing() {
    let app = common::build_test_app();
    create(&app, json!({"title": "Write copy", "priority": "medium"})).await;
    create(&app, json!({"title": "Fix footer", "description": "copy is wrong", "priority": "urgent"})).await;
    create(&app, json!({"title": "Ship", "priority": "high", "completed": true})).await;

    let search = body_json(get(app.router(), "/api/todos/search?q=COPY").await).await;
    assert_eq!(titles(&search), ["Fix footer", "Write copy"]);

    let open = body_json(get(app.router(), "/api/todos/incomplete").await).await;
    assert_eq!(titles(&open), ["Fix footer", "Write copy"]);
}

#[tokio::test]
async fn invalid_priority_path_returns_400() {
    let app = common::build_test_app();
    let response = get(app.router(), "/api/todos/priority/critical").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: tenant isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rows_of_other_tenants_are_invisible() {
    let app = common::build_test_app();
    create(&app, json!({"title": "mine"})).await;
    app.gateway
        .seed(
            TODOS_TABLE,
            [json!({
                "id": "foreign-1",
                "tenantid": "someone-else",
                "projectid": TEST_PROJECT,
                "title": "theirs",
                "completed": false,
                "priority": "urgent",
                "created_at": "2030-01-01T00:00:00Z",
                "updated_at": "2030-01-01T00:00:00Z",
            })],
        )
        .await;

    let list = body_json(get(app.router(), "/api/todos").await).await;
    assert_eq!(titles(&list), ["mine"]);

    let stats = body_json(get(app.router(), "/api/todos/stats").await).await;
    assert_eq!(stats["data"]["total"], 1);

    let response = delete(app.router(), "/api/todos/foreign-1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.gateway.row_count(TODOS_TABLE).await, 2);
}

// ---------------------------------------------------------------------------
// Test: updates and deletes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_toggle_and_delete() {
    let app = common::build_test_app();
    let todo = create(&app, json!({"title": "Draft"})).await;
    let id = todo["id"].as_str().unwrap();

    let updated = body_json(
        patch_json(app.router(), &format!("/api/todos/{id}"), json!({"title": "Final"})).await,
    )
    .await;
    assert_eq!(updated["data"]["title"], "Final");

    let empty_patch = patch_json(app.router(), &format!("/api/todos/{id}"), json!({})).await;
    assert_eq!(empty_patch.status(), StatusCode::BAD_REQUEST);

    let toggled = body_json(
        post_json(app.router(), &format!("/api/todos/{id}/toggle"), json!({"completed": true})).await,
    )
    .await;
    assert_eq!(toggled["data"]["completed"], true);
    assert_eq!(toggled["data"]["title"], "Final");

    let response = delete(app.router(), &format!("/api/todos/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["error"].is_null());
    assert_eq!(app.gateway.row_count(TODOS_TABLE).await, 0);
}

#[tokio::test]
async fn bulk_delete_removes_listed_ids() {
    let app = common::build_test_app();
    let a = create(&app, json!({"title": "a"})).await;
    let b = create(&app, json!({"title": "b"})).await;
    create(&app, json!({"title": "c"})).await;

    let response = post_json(
        app.router(),
        "/api/todos/bulk-delete",
        json!({"ids": [a["id"], b["id"]]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], 2);

    let list = body_json(get(app.router(), "/api/todos").await).await;
    assert_eq!(titles(&list), ["c"]);

    let empty = post_json(app.router(), "/api/todos/bulk-delete", json!({"ids": []})).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stats_are_consistent() {
    let app = common::build_test_app();
    create(&app, json!({"title": "a", "priority": "low", "completed": true})).await;
    create(&app, json!({"title": "b", "priority": "urgent"})).await;
    create(&app, json!({"title": "c", "priority": "urgent"})).await;
    create(&app, json!({"title": "d"})).await;

    let response = get(app.router(), "/api/todos/stats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await["data"].clone();

    let total = stats["total"].as_i64().unwrap();
    assert_eq!(total, 4);
    assert_eq!(
        stats["completed"].as_i64().unwrap() + stats["incomplete"].as_i64().unwrap(),
        total
    );
    let by_priority = &stats["byPriority"];
    let sum: i64 = ["low", "medium", "high", "urgent"]
        .iter()
        .map(|p| by_priority[*p].as_i64().unwrap())
        .sum();
    assert_eq!(sum, total);
    assert_eq!(by_priority["urgent"], 2);
    assert_eq!(by_priority["medium"], 1);
}
