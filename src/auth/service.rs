use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::api::http_client::{HttpClient, HttpMethod, HttpRequest};
use crate::auth::storage::TokenStore;
use crate::auth::token::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, Session};
use crate::error::{extract_error_message, AdminError, AdminResult};
use crate::events::{AuthEvent, EventStream, Subscriber, EVENT_BUFFER_SIZE, EVENT_STREAM_CAPACITY};
use crate::router::Navigator;

const LOGIN_FAILED: &str = "Login failed";
const REFRESH_FAILED: &str = "Refresh token failed";
pub const LOGIN_PATH: &str = "/login";

/// Login, refresh and logout against the backend, backed by the token store
pub struct AuthService {
    http: Arc<dyn HttpClient>,
    base_url: String,
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
    events: EventStream<AuthEvent>,
    /// Keeps concurrent refreshes from interleaving their store writes
    refresh_lock: Mutex<()>,
}

impl AuthService {
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        store: TokenStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            store,
            navigator,
            events: EventStream::new(EVENT_STREAM_CAPACITY, EVENT_BUFFER_SIZE),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn subscribe(&self) -> Subscriber<AuthEvent> {
        self.events.subscribe()
    }

    /// The stored session, if any
    pub async fn current_session(&self) -> Option<Session> {
        self.store.load().await
    }

    fn json_request(&self, path: &str, body: String) -> HttpRequest {
        HttpRequest::new(HttpMethod::POST, format!("{}{}", self.base_url, path))
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Exchange credentials for a session and persist it
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> AdminResult<Session> {
        let body = serde_json::to_string(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let response = self
            .http
            .execute(self.json_request("/auth/login", body))
            .await
            .map_err(|e| {
                error!(error = %e, "Login request failed");
                AdminError::Network(e.to_string())
            })?;

        if !response.is_success() {
            let message = extract_error_message(response.body())
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!(status = response.status(), %message, "Login rejected");
            return Err(AdminError::Auth(message));
        }

        let login: LoginResponse = serde_json::from_str(response.body())?;
        let Some(session) = Session::from_login(login, Utc::now()) else {
            warn!("Login response carried an unusable token lifetime");
            return Err(AdminError::Auth(LOGIN_FAILED.to_string()));
        };
        self.store.save(&session).await?;

        info!(role = %session.role, expires_at = %session.expires_at, "Logged in");
        self.events
            .publish(AuthEvent::LoggedIn {
                role: session.role.clone(),
            })
            .await;

        Ok(session)
    }

    /// Whether a usable session exists.
    ///
    /// An expired session gets exactly one refresh attempt; if that fails the
    /// session is gone and the answer is false.
    #[instrument(skip(self))]
    pub async fn is_authenticated(&self) -> bool {
        let session = match self.store.load().await {
            Some(session) if session.has_access_token() => session,
            _ => {
                debug!("No stored session");
                return false;
            }
        };

        if !session.is_expired() {
            return true;
        }

        debug!(expires_at = %session.expires_at, "Access token expired, refreshing");
        let refresh_token = match session.refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                warn!("Expired session has no refresh token");
                self.clear_after_failed_refresh("no refresh token").await;
                return false;
            }
        };

        match self.refresh(&refresh_token).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Session could not be refreshed");
                false
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On success the stored session keeps its refresh token and role; on any
    /// failure the store is cleared.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> AdminResult<Session> {
        let _guard = self.refresh_lock.lock().await;

        let body = serde_json::to_string(&RefreshRequest {
            refresh_token: refresh_token.to_string(),
        })?;

        let response = match self.http.execute(self.json_request("/auth/refresh", body)).await {
            Ok(response) => response,
            Err(e) => {
                self.clear_after_failed_refresh(&e.to_string()).await;
                return Err(AdminError::Auth(REFRESH_FAILED.to_string()));
            }
        };

        if !response.is_success() {
            let reason = format!("refresh rejected with status {}", response.status());
            self.clear_after_failed_refresh(&reason).await;
            return Err(AdminError::Auth(REFRESH_FAILED.to_string()));
        }

        let refreshed: RefreshResponse = match serde_json::from_str(response.body()) {
            Ok(refreshed) => refreshed,
            Err(e) => {
                self.clear_after_failed_refresh(&e.to_string()).await;
                return Err(AdminError::Auth(REFRESH_FAILED.to_string()));
            }
        };

        // Logged out while the refresh was in flight
        let Some(mut session) = self.store.load().await else {
            self.clear_after_failed_refresh("session disappeared during refresh")
                .await;
            return Err(AdminError::Auth(REFRESH_FAILED.to_string()));
        };

        if !session.apply_refresh(refreshed, Utc::now()) {
            self.clear_after_failed_refresh("unusable token lifetime")
                .await;
            return Err(AdminError::Auth(REFRESH_FAILED.to_string()));
        }
        if let Err(e) = self.store.save(&session).await {
            self.clear_after_failed_refresh(&e.to_string()).await;
            return Err(AdminError::Auth(REFRESH_FAILED.to_string()));
        }

        info!(expires_at = %session.expires_at, "Access token refreshed");
        self.events
            .publish(AuthEvent::TokenRefreshed {
                expires_at: session.expires_at,
            })
            .await;

        Ok(session)
    }

    async fn clear_after_failed_refresh(&self, reason: &str) {
        warn!(reason, "Token refresh failed, clearing session");
        if let Err(e) = self.store.clear().await {
            error!(error = %e, "Failed to clear session after refresh failure");
        }
        self.events
            .publish(AuthEvent::RefreshFailed {
                reason: reason.to_string(),
            })
            .await;
    }

    /// Whether the session is gone and the shell is already on its way to
    /// another page. Nothing more should be sent to the backend then.
    pub async fn session_ended(&self) -> bool {
        self.navigator.pending_navigation().is_some() && self.store.load().await.is_none()
    }

    /// Drop the session and send the user to the login page.
    ///
    /// A no-op while the login page is already pending for a cleared session.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.navigator.pending_navigation().as_deref() == Some(LOGIN_PATH)
            && self.store.load().await.is_none()
        {
            debug!("Already logged out, login page pending");
            return;
        }
        if let Err(e) = self.store.clear().await {
            error!(error = %e, "Failed to clear session on logout");
        }
        info!("Logged out");
        self.events.publish(AuthEvent::LoggedOut).await;
        self.navigator.hard_navigate(LOGIN_PATH);
    }

    /// Authorization header for the stored session, empty when there is none
    pub async fn auth_header(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Some(session) = self.store.load().await {
            if session.has_access_token() {
                headers.insert("Authorization".to_string(), session.bearer());
            }
        }
        headers
    }
}
