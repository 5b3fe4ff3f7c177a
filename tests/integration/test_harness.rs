//! Integration test harness
//! Wires an `AdminApp` to a mockito server through `ReqwestHttpClient`

use std::sync::Arc;

use chrono::{Duration, Utc};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};

use rafactory_admin::{
    AdminApp, ApiConfig, Config, MemoryStorage, ReqwestHttpClient, Session, TokenStore,
};

/// Path prefix every endpoint lives under
pub const API_PREFIX: &str = "/api/v1";

pub const ACME: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
pub const ALICE: &str = "3f6c2a8e-1b4d-4c9a-8e2f-7a5b6c4d3e21";

pub fn endpoint(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

pub fn session(access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-1".to_string()),
        role: "CompanyAdmin".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// App pointed at `server`, starting at `path`
pub async fn app_at(server: &ServerGuard, path: &str, session: Option<Session>) -> AdminApp {
    let storage = Arc::new(MemoryStorage::new());
    if let Some(session) = session {
        TokenStore::new(storage.clone(), "auth")
            .save(&session)
            .await
            .expect("Failed to seed session");
    }

    let config = Config {
        api: ApiConfig::with_base_url(format!("{}{}", server.url(), API_PREFIX)),
        ..Default::default()
    };
    AdminApp::new(
        &config,
        Arc::new(ReqwestHttpClient::new()),
        storage,
        path,
    )
}

/// `page=1&size=<size>` query matcher
pub fn first_page(size: u32) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("page".into(), "1".into()),
        Matcher::UrlEncoded("size".into(), size.to_string()),
    ])
}

/// Mock a JSON reply
pub async fn mock_json(
    server: &mut ServerGuard,
    method: &str,
    path: &str,
    status: usize,
    body: &Value,
) -> Mock {
    server
        .mock(method, endpoint(path).as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

pub fn user_json(guid: &str, email: &str, role: &str) -> Value {
    json!({
        "guid": guid,
        "email": email,
        "role": role,
        "is_active": true,
        "created_at": "2025-04-28T10:00:00"
    })
}

pub fn company_json(guid: &str, name: &str, short_name: &str) -> Value {
    json!({
        "guid": guid,
        "name": name,
        "short_name": short_name,
        "subscription_tier": "Basic",
        "subscription_status": "trial",
        "created_at": "2024-03-01"
    })
}
