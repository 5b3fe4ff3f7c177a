//! User management over real HTTP

use mockito::{Matcher, Server};
use serde_json::json;

use rafactory_admin::models::UserRole;
use rafactory_admin::pages::ActionOutcome;

use crate::test_harness::*;

#[tokio::test]
async fn test_create_operator_then_list() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", endpoint("/users").as_str())
        .match_query(first_page(10))
        .match_header("authorization", "Bearer access-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [user_json(ALICE, "op@acme.test", "Operator")],
                "total_count": 1
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;
    let create = server
        .mock("POST", endpoint("/users").as_str())
        .match_header("authorization", "Bearer access-1")
        .match_body(Matcher::Json(json!({
            "email": "op@acme.test",
            "role": "Operator",
            "pin": "123456"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(user_json(ALICE, "op@acme.test", "Operator").to_string())
        .expect(1)
        .create_async()
        .await;

    let app = app_at(&server, "/users", Some(session("access-1"))).await;
    app.boot().await;

    let page = app.users_page();
    page.open_create().await;
    page.edit_form(|form| {
        form.email = "op@acme.test".into();
        form.role = UserRole::Operator;
        form.pin = "123456".into();
    })
    .await;
    assert_eq!(page.submit().await, ActionOutcome::Completed);

    create.assert_async().await;
    // Initial render plus the refresh after saving
    list.assert_async().await;
    assert!(page.form().await.is_none());
    assert!(app.view().await.contains("op@acme.test | Operator"));
}

#[tokio::test]
async fn test_create_conflict_keeps_form() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", endpoint("/users").as_str())
        .match_query(first_page(10))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    mock_json(
        &mut server,
        "POST",
        "/users",
        409,
        &json!({"detail": "Email already registered"}),
    )
    .await;

    let app = app_at(&server, "/users", Some(session("access-1"))).await;
    app.boot().await;

    let page = app.users_page();
    page.open_create().await;
    page.edit_form(|form| form.email = "dup@acme.test".into()).await;

    assert_eq!(
        page.submit().await,
        ActionOutcome::Failed("Error: Email already registered".into())
    );
    assert_eq!(page.form().await.unwrap().email, "dup@acme.test");
}
