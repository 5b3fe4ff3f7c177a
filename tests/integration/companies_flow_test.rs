//! Company management over real HTTP

use mockito::{Mock, Server, ServerGuard};
use serde_json::json;
use uuid::Uuid;

use rafactory_admin::pages::ActionOutcome;

use crate::test_harness::*;

async fn company_list(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("GET", endpoint("/companies").as_str())
        .match_query(first_page(10))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([company_json(ACME, "Acme Manufacturing", "AM")]).to_string())
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_delete_no_content_refreshes_list() {
    let mut server = Server::new_async().await;
    let list = company_list(&mut server, 2).await;
    let delete = server
        .mock("DELETE", endpoint(&format!("/companies/{ACME}")).as_str())
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let app = app_at(&server, "/companies", Some(session("access-1"))).await;
    app.boot().await;

    let page = app.companies_page();
    page.request_delete(Uuid::parse_str(ACME).unwrap()).await;
    assert_eq!(page.confirm_delete().await, ActionOutcome::Completed);

    delete.assert_async().await;
    list.assert_async().await;
    assert!(!page.is_delete_dialog_open().await);
    assert!(page.alert().await.is_none());
}

#[tokio::test]
async fn test_delete_not_found_reports_and_skips_refresh() {
    let mut server = Server::new_async().await;
    let list = company_list(&mut server, 1).await;
    let delete = mock_json(
        &mut server,
        "DELETE",
        &format!("/companies/{ACME}"),
        404,
        &json!({"detail": "Company not found"}),
    )
    .await;

    let app = app_at(&server, "/companies", Some(session("access-1"))).await;
    app.boot().await;

    let page = app.companies_page();
    page.request_delete(Uuid::parse_str(ACME).unwrap()).await;
    assert_eq!(
        page.confirm_delete().await,
        ActionOutcome::Failed("Failed to delete company: Company not found".into())
    );

    delete.assert_async().await;
    list.assert_async().await;
    assert!(!page.is_delete_dialog_open().await);
    assert_eq!(page.companies().await.len(), 1);
}

#[tokio::test]
async fn test_list_falls_back_to_current_company() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", endpoint("/companies").as_str())
        .match_query(first_page(10))
        .with_status(404)
        .create_async()
        .await;
    let current = mock_json(
        &mut server,
        "GET",
        "/companies/current",
        200,
        &company_json(ACME, "Acme Manufacturing", "AM"),
    )
    .await;

    let app = app_at(&server, "/companies", Some(session("access-1"))).await;
    app.boot().await;

    current.assert_async().await;
    let view = app.view().await;
    assert!(view.contains("AM | Acme Manufacturing | Basic Plan | Trial"));
}
