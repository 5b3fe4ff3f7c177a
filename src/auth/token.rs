use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Client-held authentication state.
///
/// Exactly one of these lives in the token store at a time; a missing session
/// or an empty access token means "not authenticated".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential sent with every API request
    pub access_token: String,

    /// Credential exchanged for a new access token
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Role reported by the backend at login
    #[serde(default)]
    pub role: String,

    /// When the access token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// `now + expires_in` seconds, or `None` when the lifetime is not representable
pub fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(expires_in).and_then(|lifetime| now.checked_add_signed(lifetime))
}

impl Session {
    /// Build a session from a login response received at `now`.
    ///
    /// `None` when the reported lifetime overflows the clock.
    pub fn from_login(response: LoginResponse, now: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            expires_at: expiry_after(now, response.expires_in)?,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            role: response.role,
        })
    }

    /// Apply a refresh response: new access token and expiry, everything else kept.
    ///
    /// Returns false, leaving the session untouched, when the lifetime overflows.
    pub fn apply_refresh(&mut self, response: RefreshResponse, now: DateTime<Utc>) -> bool {
        let Some(expires_at) = expiry_after(now, response.expires_in) else {
            return false;
        };
        self.access_token = response.access_token;
        self.expires_at = expires_at;
        true
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Check if the token is expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Value for the Authorization header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful `POST /auth/login` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub role: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

/// Body of `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful `POST /auth/refresh` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}
