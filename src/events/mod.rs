use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod streams;
pub use streams::{EventStream, EventStreamStats, Subscriber};

pub const EVENT_STREAM_CAPACITY: usize = 64;
pub const EVENT_BUFFER_SIZE: usize = 32;

/// Session lifecycle events published by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    LoggedIn { role: String },
    TokenRefreshed { expires_at: DateTime<Utc> },
    RefreshFailed { reason: String },
    LoggedOut,
}

/// How the router arrived at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    /// First resolution after the shell booted
    Initial,
    /// In-app link, history pushed
    Push,
    /// Back or forward
    Pop,
    /// Full reload of the shell
    Reload,
}

/// Events published by the router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    Navigated { path: String, kind: NavigationKind },
    RenderFailed { path: String, reason: String },
}
