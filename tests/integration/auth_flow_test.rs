//! Login, token refresh and logout over real HTTP

use mockito::{Matcher, Server};
use serde_json::json;

use rafactory_admin::pages::ActionOutcome;

use crate::test_harness::*;

#[tokio::test]
async fn test_rejected_login_stores_no_session() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", endpoint("/auth/login").as_str())
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "email": "admin@acme.test",
            "password": "wrong"
        })))
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({"detail": "Invalid credentials"}).to_string())
        .create_async()
        .await;

    let app = app_at(&server, "/login", None).await;
    app.boot().await;

    let outcome = app
        .login_page()
        .submit("admin@acme.test", "wrong")
        .await;

    login.assert_async().await;
    assert_eq!(outcome, ActionOutcome::Failed("Invalid credentials".into()));
    assert!(app.view().await.contains("Invalid credentials"));
    assert!(app.auth().current_session().await.is_none());
    assert_eq!(app.current_path(), "/login");
}

#[tokio::test]
async fn test_login_persists_session_and_opens_dashboard() {
    let mut server = Server::new_async().await;
    let login = mock_json(
        &mut server,
        "POST",
        "/auth/login",
        200,
        &json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "role": "SystemAdmin",
            "expires_in": 3600
        }),
    )
    .await;

    let app = app_at(&server, "/login", None).await;
    app.boot().await;

    assert_eq!(
        app.login_page().submit("root@acme.test", "secret").await,
        ActionOutcome::Completed
    );
    assert!(app.settle().await);

    login.assert_async().await;
    let session = app.auth().current_session().await.unwrap();
    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.role, "SystemAdmin");
    assert_eq!(app.current_path(), "/");
    // Unmocked dashboard endpoints answer 501, the page still renders
    let view = app.view().await;
    assert_eq!(view.title, "Dashboard");
    assert!(view.contains("SystemAdmin"));
}

#[tokio::test]
async fn test_unauthorized_request_is_retried_after_refresh() {
    let mut server = Server::new_async().await;
    let stale = server
        .mock("GET", endpoint("/users").as_str())
        .match_query(first_page(10))
        .match_header("authorization", "Bearer stale")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", endpoint("/auth/refresh").as_str())
        .match_body(Matcher::Json(json!({"refresh_token": "refresh-1"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"access_token": "fresh", "expires_in": 900}).to_string())
        .expect(1)
        .create_async()
        .await;
    let fresh = server
        .mock("GET", endpoint("/users").as_str())
        .match_query(first_page(10))
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([user_json(ALICE, "alice@acme.test", "Operator")]).to_string())
        .expect(1)
        .create_async()
        .await;

    let app = app_at(&server, "/users", Some(session("stale"))).await;
    app.boot().await;

    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
    assert!(app.view().await.contains("alice@acme.test"));
    let session = app.auth().current_session().await.unwrap();
    assert_eq!(session.access_token, "fresh");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_failed_refresh_logs_out() {
    let mut server = Server::new_async().await;
    let users = server
        .mock("GET", endpoint("/users").as_str())
        .match_query(first_page(10))
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", endpoint("/auth/refresh").as_str())
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let app = app_at(&server, "/users", Some(session("stale"))).await;
    app.boot().await;
    assert!(app.settle().await);

    users.assert_async().await;
    refresh.assert_async().await;
    assert!(app.auth().current_session().await.is_none());
    assert_eq!(app.current_path(), "/login");
    assert_eq!(app.view().await.title, "Login");
}
