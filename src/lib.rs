//! Ra Factory admin console: session handling, an authenticated API client
//! with token refresh, a small router and the admin pages built on top.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod pages;
pub mod router;
pub mod view;

#[cfg(test)]
mod tests;

pub use api::{ApiClient, HttpClient, HttpMethod, ReqwestHttpClient};
pub use app::AdminApp;
pub use auth::{AuthService, FileStorage, MemoryStorage, Session, SessionStorage, TokenStore};
pub use config::{load_config, ApiConfig, Config, Environment, StorageConfig};
pub use error::{AdminError, AdminResult, ErrorCategory, ErrorCode};
pub use events::{AuthEvent, EventStream, NavigationEvent, NavigationKind};
pub use router::{History, Navigator, Router};
pub use view::{Container, Node, View};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
