//! Integration tests for the tenant-scoped data access layer.
//!
//! Runs the generic helpers and `TodoRepo` against the in-process gateway,
//! which enforces the same row-level policy as the hosted service.

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use webmarket_core::scope::ScopeClaims;
use webmarket_core::todo::TodoPriority;
use webmarket_db::error::{DbError, NOT_SINGLE_CODE, RLS_VIOLATION_CODE};
use webmarket_db::gateways::MemoryGateway;
use webmarket_db::generic;
use webmarket_db::models::todo::{CreateTodo, Todo, TodoFilter, UpdateTodo};
use webmarket_db::query::{Filter, FilterOperator, ListOptions, Pagination, Sort};
use webmarket_db::repositories::todo_repo::TODOS_TABLE;
use webmarket_db::repositories::TodoRepo;
use webmarket_db::{ScopedClient, ScopedCredential};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn client_for(gateway: &Arc<MemoryGateway>, tenant: &str, project: &str) -> ScopedClient {
    let claims = ScopeClaims::new(tenant, project);
    ScopedClient::new(
        gateway.clone(),
        ScopedCredential::local(claims.clone()),
        claims,
    )
}

fn setup() -> (Arc<MemoryGateway>, ScopedClient) {
    let gateway = Arc::new(MemoryGateway::new().with_table(TODOS_TABLE));
    let client = client_for(&gateway, "tenant-a", "project-a");
    (gateway, client)
}

fn todo(title: &str, priority: TodoPriority, completed: bool) -> CreateTodo {
    CreateTodo {
        priority,
        completed,
        ..CreateTodo::new(title)
    }
}

async fn create(client: &ScopedClient, input: CreateTodo) -> Todo {
    TodoRepo::create(client, &input)
        .await
        .into_result()
        .unwrap()
        .expect("insert returns the row")
}

// ---------------------------------------------------------------------------
// Test: stamping and isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_insert_is_stamped_with_scope() {
    let (_gateway, client) = setup();

    let created = create(&client, CreateTodo::new("Write tests")).await;

    assert_eq!(created.tenantid, "tenant-a");
    assert_eq!(created.projectid, "project-a");
    assert_eq!(created.priority, TodoPriority::Medium);
    assert!(!created.completed);
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn test_other_tenants_rows_are_invisible() {
    let (gateway, client) = setup();
    let other = client_for(&gateway, "tenant-b", "project-a");

    let mine = create(&client, CreateTodo::new("mine")).await;
    let theirs = create(&other, CreateTodo::new("theirs")).await;

    let listed = TodoRepo::list(&client, &TodoFilter::default(), None, None).await;
    let ids: Vec<String> = listed.into_result().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, [mine.id.clone()]);

    let fetched = TodoRepo::find_by_id(&client, &theirs.id).await;
    assert_matches!(fetched.error, Some(ref e) if e.code() == Some(NOT_SINGLE_CODE));
    assert!(fetched.data.is_none());

    // Deleting an invisible row succeeds but removes nothing.
    assert!(TodoRepo::delete(&client, &theirs.id).await.is_ok());
    assert_eq!(gateway.row_count(TODOS_TABLE).await, 2);
}

#[tokio::test]
async fn test_out_of_scope_insert_is_rejected() {
    let (gateway, client) = setup();

    // A client whose write scope disagrees with its credential.
    let mismatched = ScopedClient::new(
        gateway.clone(),
        ScopedCredential::local(ScopeClaims::new("tenant-a", "project-a")),
        ScopeClaims::new("tenant-z", "project-a"),
    );
    let response = TodoRepo::create(&mismatched, &CreateTodo::new("nope")).await;

    assert_matches!(response.error, Some(ref e) if e.code() == Some(RLS_VIOLATION_CODE));
    assert_eq!(gateway.row_count(TODOS_TABLE).await, 0);
    assert!(TodoRepo::list(&client, &TodoFilter::default(), None, None)
        .await
        .into_result()
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Test: listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_defaults_to_newest_first_with_count() {
    let (_gateway, client) = setup();
    let a = create(&client, CreateTodo::new("a")).await;
    let b = create(&client, CreateTodo::new("b")).await;
    let c = create(&client, CreateTodo::new("c")).await;

    let response = TodoRepo::list(&client, &TodoFilter::default(), None, None).await;
    assert_eq!(response.count, Some(3));
    let ids: Vec<String> = response.into_result().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, [c.id, b.id, a.id]);
}

#[tokio::test]
async fn test_fetch_all_applies_no_default_sort() {
    let (_gateway, client) = setup();
    let titles = ["b", "c", "a"];
    for title in titles {
        create(&client, CreateTodo::new(title)).await;
    }

    let unsorted: Vec<Todo> = generic::fetch_all(&client, TODOS_TABLE, &ListOptions::default())
        .await
        .into_result()
        .unwrap();
    let order: Vec<&str> = unsorted.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(order, titles);

    let sorted: Vec<Todo> = generic::fetch_all(
        &client,
        TODOS_TABLE,
        &ListOptions {
            sort: Some(Sort::asc("title")),
            ..Default::default()
        },
    )
    .await
    .into_result()
    .unwrap();
    let order: Vec<&str> = sorted.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(order, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_fetch_all_paginates_and_filters() {
    let (_gateway, client) = setup();
    for i in 0..5 {
        create(&client, todo(&format!("t{i}"), TodoPriority::High, i % 2 == 0)).await;
    }

    let options = ListOptions {
        pagination: Some(Pagination { page: 2, page_size: 2 }),
        sort: Some(Sort::asc("title")),
        filters: vec![Filter::new("title", FilterOperator::Neq, "t4")],
    };
    let response = generic::fetch_all::<Todo>(&client, TODOS_TABLE, &options).await;

    assert_eq!(response.count, Some(4));
    let titles: Vec<String> = response.into_result().unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, ["t2", "t3"]);
}

#[tokio::test]
async fn test_list_incomplete_orders_by_priority_text_then_due_date() {
    let (_gateway, client) = setup();
    let soon = chrono::Utc::now() + chrono::Duration::days(1);
    let later = soon + chrono::Duration::days(1);

    create(&client, todo("done", TodoPriority::Urgent, true)).await;
    create(&client, todo("high", TodoPriority::High, false)).await;
    create(
        &client,
        CreateTodo {
            due_date: Some(later),
            ..todo("urgent later", TodoPriority::Urgent, false)
        },
    )
    .await;
    create(
        &client,
        CreateTodo {
            due_date: Some(soon),
            ..todo("urgent soon", TodoPriority::Urgent, false)
        },
    )
    .await;
    create(&client, todo("urgent undated", TodoPriority::Urgent, false)).await;
    create(&client, todo("low", TodoPriority::Low, false)).await;

    let titles: Vec<String> = TodoRepo::list_incomplete(&client)
        .await
        .into_result()
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();

    assert_eq!(
        titles,
        ["urgent soon", "urgent later", "urgent undated", "low", "high"]
    );
}

#[tokio::test]
async fn test_priority_filter_and_search_with_no_match_are_empty() {
    let (_gateway, client) = setup();
    create(&client, todo("Buy milk", TodoPriority::Low, false)).await;

    let by_priority = TodoRepo::list_by_priority(&client, TodoPriority::Urgent).await;
    assert!(by_priority.error.is_none());
    assert_eq!(by_priority.data.as_deref(), Some(&[][..]));

    let search = TodoRepo::search(&client, "bread").await;
    assert!(search.error.is_none());
    assert_eq!(search.data.map(|d| d.len()), Some(0));
}

#[tokio::test]
async fn test_search_matches_title_or_description() {
    let (_gateway, client) = setup();
    create(&client, CreateTodo::new("Buy MILK")).await;
    create(
        &client,
        CreateTodo {
            description: Some("remember the milk".into()),
            ..CreateTodo::new("Groceries")
        },
    )
    .await;
    create(&client, CreateTodo::new("Walk dog")).await;

    let titles: Vec<String> = TodoRepo::search(&client, "milk")
        .await
        .into_result()
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["Groceries", "Buy MILK"]);

    let filtered = TodoRepo::list(
        &client,
        &TodoFilter {
            search: Some("milk".into()),
            completed: Some(false),
            priority: Some(TodoPriority::Medium),
        },
        None,
        Some(Sort::asc("title")),
    )
    .await;
    assert_eq!(filtered.count, Some(2));
}

// ---------------------------------------------------------------------------
// Test: updates and deletes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_update_and_toggle() {
    let (_gateway, client) = setup();
    let created = create(&client, CreateTodo::new("Draft")).await;

    let updated = TodoRepo::update(
        &client,
        &created.id,
        &UpdateTodo {
            title: Some("Final".into()),
            priority: Some(TodoPriority::High),
            ..Default::default()
        },
    )
    .await
    .into_result()
    .unwrap()
    .unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.priority, TodoPriority::High);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);

    let toggled = TodoRepo::toggle(&client, &created.id, true)
        .await
        .into_result()
        .unwrap()
        .unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.title, "Final");
}

#[tokio::test]
async fn test_update_of_missing_row_reports_single_row_error() {
    let (_gateway, client) = setup();
    let response = TodoRepo::toggle(&client, "does-not-exist", true).await;
    assert_matches!(
        response.error,
        Some(DbError::Api { status: 406, .. })
    );
}

#[tokio::test]
async fn test_delete_many_removes_only_listed_rows() {
    let (gateway, client) = setup();
    let a = create(&client, CreateTodo::new("a")).await;
    let b = create(&client, CreateTodo::new("b")).await;
    let c = create(&client, CreateTodo::new("c")).await;

    let removed = TodoRepo::delete_many(&client, &[a.id.clone(), c.id.clone()])
        .await
        .into_result()
        .unwrap();
    assert_eq!(removed, Some(2));
    assert_eq!(gateway.row_count(TODOS_TABLE).await, 1);

    let remaining = TodoRepo::find_by_id(&client, &b.id).await;
    assert!(remaining.is_ok());

    let none = TodoRepo::delete_many(&client, &[]).await.into_result().unwrap();
    assert_eq!(none, Some(0));
}

// ---------------------------------------------------------------------------
// Test: stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_stats_are_consistent() {
    let (gateway, client) = setup();
    create(&client, todo("a", TodoPriority::Low, true)).await;
    create(&client, todo("b", TodoPriority::High, false)).await;
    create(&client, todo("c", TodoPriority::High, true)).await;
    create(&client, todo("d", TodoPriority::Urgent, false)).await;
    gateway
        .seed(
            TODOS_TABLE,
            [json!({"id": "foreign", "tenantid": "tenant-b", "projectid": "project-a",
                    "title": "x", "completed": true, "priority": "low"})],
        )
        .await;

    let stats = TodoRepo::stats(&client).await.into_result().unwrap().unwrap();

    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.incomplete, 2);
    assert_eq!(stats.completed + stats.incomplete, stats.total);
    assert_eq!(stats.by_priority.sum(), stats.total);
    assert_eq!(stats.by_priority.high, 2);
    assert_eq!(stats.by_priority.medium, 0);
}

#[tokio::test]
async fn test_rows_with_null_defaulted_columns_still_load() {
    let (gateway, client) = setup();
    create(&client, todo("fresh", TodoPriority::High, false)).await;
    gateway
        .seed(
            TODOS_TABLE,
            [json!({"id": "legacy", "tenantid": "tenant-a", "projectid": "project-a",
                    "title": "legacy", "completed": null, "priority": null, "tags": null,
                    "created_at": null, "updated_at": null})],
        )
        .await;

    let response = TodoRepo::list(&client, &TodoFilter::default(), None, None).await;
    assert!(response.error.is_none());
    assert_eq!(response.count, Some(2));
    let rows = response.data.unwrap();
    // Null `created_at` sorts first when descending.
    assert_eq!(rows[0].id, "legacy");
    assert!(!rows[0].completed);
    assert_eq!(rows[0].priority, TodoPriority::Medium);
    assert!(rows[0].tags.is_empty());
    assert_eq!(rows[1].title, "fresh");

    let found = TodoRepo::search(&client, "LEG").await.into_result().unwrap();
    assert_eq!(found.len(), 1);

    // A null `completed` is counted in neither bucket.
    let stats = TodoRepo::stats(&client).await.into_result().unwrap().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 0);
    assert_eq!(stats.incomplete, 1);
}

#[tokio::test]
async fn test_stats_on_unknown_table_fails_in_envelope() {
    let gateway = Arc::new(MemoryGateway::new());
    let client = client_for(&gateway, "tenant-a", "project-a");

    let response = TodoRepo::stats(&client).await;

    assert!(response.data.is_none());
    assert_matches!(response.error, Some(DbError::Api { status: 404, .. }));
}
