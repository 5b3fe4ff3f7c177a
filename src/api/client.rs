use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::api::http_client::{HttpClient, HttpMethod, HttpRequest, SimpleHttpResponse};
use crate::auth::AuthService;
use crate::error::{extract_error_message, AdminError, AdminResult};

/// Authenticated JSON client for the backend API.
///
/// Every request carries the current bearer token. A 401 triggers one token
/// refresh and one retry of the identical request; if the refresh fails the
/// user is logged out.
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    auth: Arc<AuthService>,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: Arc<dyn HttpClient>, auth: Arc<AuthService>) -> Self {
        let base_url = auth.base_url().to_string();
        Self {
            http,
            auth,
            base_url,
        }
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    /// Absolute URL for an endpoint path plus query parameters
    pub fn url_for(&self, path: &str, query: &[(&str, String)]) -> AdminResult<String> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = reqwest::Url::parse(&raw).map_err(|e| AdminError::Config {
            key: "api.base_url".to_string(),
            reason: format!("cannot build request URL '{}': {}", raw, e),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.to_string())
    }

    async fn build_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&String>,
    ) -> HttpRequest {
        let mut request = HttpRequest::new(method, url)
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json");
        for (key, value) in self.auth.auth_header().await {
            request = request.with_header(key, value);
        }
        if let Some(body) = body {
            request = request.with_body(body.clone());
        }
        request
    }

    async fn send(&self, request: HttpRequest) -> AdminResult<SimpleHttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        self.http.execute(request).await.map_err(|e| {
            error!(%method, %url, error = %e, "Request failed before a response arrived");
            AdminError::Network(e.to_string())
        })
    }

    /// Issue a request and decode the JSON body.
    ///
    /// Returns `None` for 204 and for empty 2xx bodies.
    #[instrument(skip(self, method, body, query), fields(method = %method))]
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> AdminResult<Option<Value>> {
        if self.auth.session_ended().await {
            debug!(path, "Session already ended, not sending");
            return Err(AdminError::SessionExpired);
        }
        let url = self.url_for(path, query)?;
        let body = body.map(serde_json::to_string).transpose()?;

        let response = self
            .send(self.build_request(method, &url, body.as_ref()).await)
            .await?;
        if response.status() != 401 {
            return Self::handle_response(response);
        }

        debug!(%url, "Unauthorized, attempting token refresh");
        self.recover_session().await?;

        let retry = self
            .send(self.build_request(method, &url, body.as_ref()).await)
            .await?;
        if retry.status() == 401 {
            warn!(%url, "Still unauthorized after refresh");
            self.auth.logout().await;
            return Err(AdminError::SessionExpired);
        }
        Self::handle_response(retry)
    }

    /// One refresh attempt; failure ends the session
    async fn recover_session(&self) -> AdminResult<()> {
        let refresh_token = self
            .auth
            .current_session()
            .await
            .and_then(|session| session.refresh_token)
            .filter(|token| !token.is_empty());

        let Some(refresh_token) = refresh_token else {
            warn!("Unauthorized with no refresh token available");
            self.auth.logout().await;
            return Err(AdminError::SessionExpired);
        };

        match self.auth.refresh(&refresh_token).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Session could not be recovered");
                self.auth.logout().await;
                Err(AdminError::SessionExpired)
            }
        }
    }

    fn handle_response(response: SimpleHttpResponse) -> AdminResult<Option<Value>> {
        if response.is_success() {
            if response.status() == 204 || response.body().trim().is_empty() {
                return Ok(None);
            }
            return Ok(Some(response.json::<Value>().map_err(|e| {
                AdminError::Serialization(format!("invalid JSON in response: {}", e))
            })?));
        }

        let message =
            extract_error_message(response.body()).unwrap_or_else(|| response.status_text());
        debug!(status = response.status(), %message, "Request rejected");
        Err(AdminError::api(response.status(), message))
    }

    /// Request and decode into `T`; `None` when the body was empty
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> AdminResult<Option<T>> {
        match self.request(method, path, body, query).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AdminResult<Option<T>> {
        self.request_json(HttpMethod::GET, path, None, query).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<Option<T>> {
        let body = serde_json::to_value(body)?;
        self.request_json(HttpMethod::POST, path, Some(&body), &[])
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<Option<T>> {
        let body = serde_json::to_value(body)?;
        self.request_json(HttpMethod::PUT, path, Some(&body), &[])
            .await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<Option<T>> {
        let body = serde_json::to_value(body)?;
        self.request_json(HttpMethod::PATCH, path, Some(&body), &[])
            .await
    }

    pub async fn delete(&self, path: &str) -> AdminResult<()> {
        self.request(HttpMethod::DELETE, path, None, &[]).await?;
        Ok(())
    }
}
