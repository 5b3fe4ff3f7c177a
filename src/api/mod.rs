pub mod client;
pub mod companies;
pub mod dashboard;
pub mod http_client;
pub mod users;

pub use client::ApiClient;
pub use companies::CompanyApi;
pub use dashboard::{Count, DashboardApi, DashboardCounts, RECENT_ACTIVITY_LIMIT};
pub use http_client::{HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient, SimpleHttpResponse};
pub use users::{UserApi, DEFAULT_PAGE_SIZE};
