pub mod service;
pub mod storage;
pub mod token;

pub use service::{AuthService, LOGIN_PATH};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, TokenStore};
pub use token::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, Session};
