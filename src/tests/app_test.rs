//! Boot guard, login and logout flows

use serde_json::json;

use super::*;
use crate::api::HttpMethod;
use crate::events::AuthEvent;
use crate::pages::ActionOutcome;

#[tokio::test]
async fn test_boot_without_session_redirects_to_login() {
    let t = build("/users", None).await;
    t.app.boot().await;

    assert_eq!(t.app.current_path(), "/login");
    let view = t.app.view().await;
    assert_eq!(view.title, "Login");
    assert!(view.contains("Admin Login"));
    // No session means nothing to refresh
    assert!(t.http.get_requests().is_empty());
}

#[tokio::test]
async fn test_boot_on_login_page_skips_guard() {
    let t = build("/login", None).await;
    t.app.boot().await;
    assert_eq!(t.app.current_path(), "/login");
    assert!(!t.app.settle().await);
}

#[tokio::test]
async fn test_boot_refreshes_expired_session_once() {
    let t = build("/users", Some(expired_session())).await;
    t.http.mock_json(
        HttpMethod::POST,
        url("/auth/refresh"),
        200,
        &json!({"access_token": "access-2", "expires_in": 900}),
    );
    t.http
        .mock_json(HttpMethod::GET, url("/users?page=1&size=10"), 200, &json!([]));

    t.app.boot().await;

    assert_eq!(t.app.current_path(), "/users");
    assert_eq!(
        t.http
            .requests_to(HttpMethod::POST, &url("/auth/refresh"))
            .len(),
        1
    );
    let list = &t.http.requests_to(HttpMethod::GET, &url("/users?page=1&size=10"))[0];
    assert_eq!(list.header("Authorization"), Some("Bearer access-2"));
    assert!(t.app.view().await.contains("No users found"));
}

#[tokio::test]
async fn test_boot_with_unrefreshable_session_goes_to_login() {
    let t = build("/", Some(expired_session())).await;
    t.http
        .mock_response(HttpMethod::POST, url("/auth/refresh"), 401, "");

    t.app.boot().await;

    assert_eq!(t.app.current_path(), "/login");
    assert!(t.stored_session().await.is_none());
}

#[tokio::test]
async fn test_wrong_password_shows_detail_and_stores_nothing() {
    let t = build("/login", None).await;
    t.app.boot().await;
    t.http.mock_json(
        HttpMethod::POST,
        url("/auth/login"),
        400,
        &json!({"detail": "Invalid credentials"}),
    );

    let outcome = t
        .app
        .login_page()
        .submit("admin@example.com", "wrong")
        .await;

    assert_eq!(outcome, ActionOutcome::Failed("Invalid credentials".into()));
    let view = t.app.view().await;
    assert!(view.contains("Invalid credentials"));
    assert!(!view.button("login").unwrap().disabled);
    assert_eq!(view.field("email").unwrap().value, "admin@example.com");
    assert!(t.stored_session().await.is_none());
    assert!(!t.app.settle().await);
    assert_eq!(t.app.current_path(), "/login");
}

#[tokio::test]
async fn test_successful_login_reboots_into_dashboard() {
    let t = build("/login", None).await;
    t.app.boot().await;
    t.http.mock_json(
        HttpMethod::POST,
        url("/auth/login"),
        200,
        &json!({
            "access_token": "a1",
            "refresh_token": "r1",
            "role": "CompanyAdmin",
            "expires_in": 3600
        }),
    );

    let outcome = t.app.login_page().submit("admin@example.com", "secret").await;
    assert_eq!(outcome, ActionOutcome::Completed);
    assert!(t.app.settle().await);

    assert_eq!(t.app.current_path(), "/");
    let view = t.app.view().await;
    assert_eq!(view.title, "Dashboard");
    // Dashboard endpoints are not scripted, every tile degrades on its own
    assert!(view.contains("Workstations: ?"));
    assert!(view.contains("CompanyAdmin"));
    assert_eq!(t.stored_session().await.unwrap().access_token, "a1");
}

#[tokio::test]
async fn test_logout_clears_session_and_shows_login() {
    let t = build("/users", Some(valid_session())).await;
    t.http
        .mock_json(HttpMethod::GET, url("/users?page=1&size=10"), 200, &json!([]));
    t.app.boot().await;
    assert_eq!(t.app.view().await.title, "Users");

    t.app.logout().await;

    assert_eq!(t.app.current_path(), "/login");
    assert_eq!(t.app.view().await.title, "Login");
    assert!(t.stored_session().await.is_none());
}

#[tokio::test]
async fn test_expired_session_during_action_ends_on_login() {
    let t = build("/users", Some(valid_session())).await;
    t.http
        .mock_json(HttpMethod::GET, url("/users?page=1&size=10"), 200, &json!([]));
    t.http.mock_response(HttpMethod::POST, url("/users"), 401, "");
    t.http
        .mock_response(HttpMethod::POST, url("/auth/refresh"), 401, "");
    t.app.boot().await;

    let page = t.app.users_page();
    page.open_create().await;
    page.edit_form(|form| form.email = "x@y.com".into()).await;
    let outcome = page.submit().await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed("Error: Session expired. Please login again.".into())
    );
    assert!(t.app.settle().await);
    assert_eq!(t.app.current_path(), "/login");
    assert!(t.stored_session().await.is_none());
}

#[tokio::test]
async fn test_revoked_session_on_dashboard_logs_out_once() {
    let t = build("/", Some(valid_session())).await;
    for path in [
        "/companies/current",
        "/users?page=1&size=1",
        "/projects?page=1&size=1",
        "/workstations?page=1&size=1",
        "/companies",
        "/activity?limit=5",
        "/users?page=1&size=5",
    ] {
        t.http.mock_response(HttpMethod::GET, url(path), 401, "");
    }
    t.http
        .mock_response(HttpMethod::POST, url("/auth/refresh"), 401, "");
    let mut events = t.app.auth_events();

    t.app.boot().await;

    // The first 401 ends the session; nothing else goes out after that
    let sent = t.http.get_requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        t.http
            .requests_to(HttpMethod::POST, &url("/auth/refresh"))
            .len(),
        1
    );
    let mut logouts = 0;
    while let Ok(event) = events.try_recv() {
        if event == AuthEvent::LoggedOut {
            logouts += 1;
        }
    }
    assert_eq!(logouts, 1);

    assert!(t.app.settle().await);
    assert_eq!(t.app.current_path(), "/login");
    assert_eq!(t.app.view().await.title, "Login");
}

#[tokio::test]
async fn test_links_route_without_reboot() {
    let t = build("/users", Some(valid_session())).await;
    t.http
        .mock_json(HttpMethod::GET, url("/users?page=1&size=10"), 200, &json!([]));
    t.http.mock_json(
        HttpMethod::GET,
        url("/companies?page=1&size=10"),
        200,
        &json!([company_json(ACME, "Acme", "AC")]),
    );
    t.app.boot().await;
    let mut navigation = t.app.navigation_events();

    assert!(t.app.click("/companies").await);
    assert_eq!(t.app.view().await.title, "Companies");
    assert!(!t.app.settle().await);

    assert!(!t.app.click("https://rafactory.raworkshop.bg/docs").await);
    assert_eq!(t.app.current_path(), "/companies");

    assert!(t.app.back().await);
    assert_eq!(t.app.view().await.title, "Users");

    assert!(matches!(
        navigation.try_recv().unwrap(),
        crate::NavigationEvent::Navigated { ref path, .. } if path == "/companies"
    ));
}
