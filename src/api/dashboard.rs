use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::client::ApiClient;
use crate::api::companies::CompanyApi;
use crate::error::AdminResult;
use crate::models::{record_count, Activity, Company};

pub const RECENT_ACTIVITY_LIMIT: u32 = 5;

/// A dashboard tile value: a count, or unknown when the request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Count {
    Known(u64),
    Unknown,
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{}", n),
            Self::Unknown => f.write_str("?"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub users: Count,
    pub projects: Count,
    pub workstations: Count,
    pub companies: Count,
}

/// Read-only summary endpoints for the landing page
#[derive(Clone)]
pub struct DashboardApi {
    client: Arc<ApiClient>,
    companies: CompanyApi,
}

impl DashboardApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let companies = CompanyApi::new(client.clone());
        Self { client, companies }
    }

    async fn count(&self, resource: &'static str, path: &str, query: &[(&str, String)]) -> Count {
        match self.client.get::<Value>(path, query).await {
            Ok(Some(body)) => record_count(&body).map(Count::Known).unwrap_or(Count::Unknown),
            Ok(None) => Count::Unknown,
            Err(e) => {
                warn!(resource, error = %e, "Count unavailable");
                Count::Unknown
            }
        }
    }

    /// All four counts, fetched concurrently; each failure only affects its own tile
    pub async fn get_dashboard_counts(&self) -> DashboardCounts {
        let first_page = [("page", "1".to_string()), ("size", "1".to_string())];
        let (users, projects, workstations, companies) = futures::join!(
            self.count("users", "/users", &first_page),
            self.count("projects", "/projects", &first_page),
            self.count("workstations", "/workstations", &first_page),
            self.count("companies", "/companies", &[]),
        );

        let counts = DashboardCounts {
            users,
            projects,
            workstations,
            companies,
        };
        debug!(?counts, "Dashboard counts resolved");
        counts
    }

    /// The caller's company; any failure reads as "not available"
    pub async fn get_company_info(&self) -> Option<Company> {
        match self.companies.get_current_company().await {
            Ok(company) => company,
            Err(e) => {
                warn!(error = %e, "Company information unavailable");
                None
            }
        }
    }

    pub async fn get_recent_activity(&self, limit: u32) -> AdminResult<Vec<Activity>> {
        Ok(self
            .client
            .get("/activity", &[("limit", limit.to_string())])
            .await?
            .unwrap_or_default())
    }
}
