//! App-level tests: pages driven through the router against a scripted backend

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::api::http_client::mock::MockHttpClient;
use crate::auth::{MemoryStorage, Session, SessionStorage};
use crate::config::{ApiConfig, Config, SESSION_STORAGE_KEY};
use crate::AdminApp;

pub mod app_test;

pub const BASE: &str = "http://api.test/api/v1";

pub const ALICE: &str = "3f6c2a8e-1b4d-4c9a-8e2f-7a5b6c4d3e21";
pub const BOB: &str = "9a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
pub const ACME: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
pub const GLOBEX: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

pub struct TestApp {
    pub http: MockHttpClient,
    pub storage: Arc<MemoryStorage>,
    pub app: AdminApp,
}

impl TestApp {
    pub async fn stored_session(&self) -> Option<Session> {
        self.storage
            .get_item(SESSION_STORAGE_KEY)
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig::with_base_url(BASE),
        ..Default::default()
    }
}

pub fn valid_session() -> Session {
    Session {
        access_token: "access-1".into(),
        refresh_token: Some("refresh-1".into()),
        role: "CompanyAdmin".into(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

pub fn expired_session() -> Session {
    Session {
        expires_at: Utc::now() - Duration::minutes(1),
        ..valid_session()
    }
}

/// App at `path`, optionally with a session already stored
pub async fn build(path: &str, session: Option<Session>) -> TestApp {
    let http = MockHttpClient::new();
    let storage = Arc::new(MemoryStorage::new());
    if let Some(session) = session {
        storage
            .set_item(SESSION_STORAGE_KEY, serde_json::to_string(&session).unwrap())
            .await
            .unwrap();
    }
    let app = AdminApp::new(&test_config(), Arc::new(http.clone()), storage.clone(), path);
    TestApp { http, storage, app }
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
        "subscription_tier": "Professional",
        "subscription_status": "active",
        "created_at": "2024-01-15T08:30:00Z"
    })
}
