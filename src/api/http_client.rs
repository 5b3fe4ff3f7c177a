use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP method enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::PATCH => "PATCH",
            Self::DELETE => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, kept intact so it can be reissued
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach a body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header case-insensitively
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A very simple version that only holds response data
#[derive(Debug, Clone)]
pub struct SimpleHttpResponse {
    /// HTTP status code
    status_code: u16,
    /// Response body
    body: String,
    /// Response headers
    headers: HashMap<String, String>,
}

impl SimpleHttpResponse {
    /// Create a new response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status_code: status,
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Get the status code
    pub fn status(&self) -> u16 {
        self.status_code
    }

    /// Get a reference to the response body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Get the body as text (consumes the response)
    pub fn text(self) -> String {
        self.body
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Check if successful (2xx status)
    pub fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }

    /// Canonical reason phrase for the status, e.g. "Not Found"
    pub fn status_text(&self) -> String {
        http::StatusCode::from_u16(self.status_code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", self.status_code))
    }
}

/// Transport abstraction so the API client can be driven by a mock
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Send the request and return the response; Err only for transport failures
    async fn execute(&self, request: HttpRequest) -> Result<SimpleHttpResponse>;
}

/// Implementation of HttpClient using reqwest
pub struct ReqwestHttpClient {
    /// Internal reqwest client
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a new ReqwestHttpClient
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Client with a per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<SimpleHttpResponse> {
        let method = match request.method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::DELETE => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await?;

        let result = headers
            .into_iter()
            .fold(SimpleHttpResponse::new(status, body), |resp, (k, v)| {
                resp.with_header(k, v)
            });

        Ok(result)
    }
}

/// Mock implementation of HttpClient for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    enum MockReply {
        Response(SimpleHttpResponse),
        TransportError(String),
    }

    /// A mock HTTP client that returns scripted responses.
    ///
    /// Responses are queued per method and URL. The last queued reply is
    /// sticky, so a single registration answers every call.
    #[derive(Clone, Default)]
    pub struct MockHttpClient {
        replies: Arc<Mutex<HashMap<(HttpMethod, String), VecDeque<MockReply>>>>,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        latency: Arc<Mutex<Option<Duration>>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(&self, method: HttpMethod, url: impl Into<String>, reply: MockReply) {
            self.replies
                .lock()
                .unwrap()
                .entry((method, url.into()))
                .or_default()
                .push_back(reply);
        }

        /// Queue a raw response
        pub fn mock_response(
            &self,
            method: HttpMethod,
            url: impl Into<String>,
            status: u16,
            body: impl Into<String>,
        ) {
            self.push(
                method,
                url,
                MockReply::Response(SimpleHttpResponse::new(status, body)),
            );
        }

        /// Queue a JSON response
        pub fn mock_json<T: serde::Serialize>(
            &self,
            method: HttpMethod,
            url: impl Into<String>,
            status: u16,
            data: &T,
        ) {
            let body = serde_json::to_string(data).unwrap();
            let response = SimpleHttpResponse::new(status, body)
                .with_header("content-type", "application/json");
            self.push(method, url, MockReply::Response(response));
        }

        /// Queue a transport failure
        pub fn mock_transport_error(
            &self,
            method: HttpMethod,
            url: impl Into<String>,
            message: impl Into<String>,
        ) {
            self.push(method, url, MockReply::TransportError(message.into()));
        }

        /// Drop everything registered for a URL
        pub fn reset(&self, method: HttpMethod, url: &str) {
            self.replies
                .lock()
                .unwrap()
                .remove(&(method, url.to_string()));
        }

        /// Delay every reply
        pub fn set_latency(&self, latency: Duration) {
            *self.latency.lock().unwrap() = Some(latency);
        }

        /// All recorded requests, oldest first
        pub fn get_requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Recorded requests for one method and URL
        pub fn requests_to(&self, method: HttpMethod, url: &str) -> Vec<HttpRequest> {
            self.get_requests()
                .into_iter()
                .filter(|r| r.method == method && r.url == url)
                .collect()
        }

        fn next_reply(&self, method: HttpMethod, url: &str) -> Result<MockReply> {
            let mut replies = self.replies.lock().unwrap();
            let queue = replies
                .get_mut(&(method, url.to_string()))
                .filter(|q| !q.is_empty())
                .ok_or_else(|| anyhow::anyhow!("No mock response configured for {} {}", method, url))?;
            let reply = if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            };
            Ok(reply)
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, request: HttpRequest) -> Result<SimpleHttpResponse> {
            self.requests.lock().unwrap().push(request.clone());

            let latency = *self.latency.lock().unwrap();
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }

            match self.next_reply(request.method, &request.url)? {
                MockReply::Response(response) => Ok(response),
                MockReply::TransportError(message) => Err(anyhow::anyhow!(message)),
            }
        }
    }
}
