use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::api::client::ApiClient;
use crate::error::{AdminError, AdminResult};
use crate::models::{Company, CompanyPayload, ListResponse};

/// Company management endpoints
#[derive(Clone)]
pub struct CompanyApi {
    client: Arc<ApiClient>,
}

impl CompanyApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List companies.
    ///
    /// Roles without access to the full list get a 404; they see only their
    /// own company instead.
    #[instrument(skip(self))]
    pub async fn get_companies(&self, page: u32, size: u32) -> AdminResult<Vec<Company>> {
        let listed = self
            .client
            .get::<ListResponse<Company>>(
                "/companies",
                &[("page", page.to_string()), ("size", size.to_string())],
            )
            .await;

        match listed {
            Ok(list) => Ok(list.map(ListResponse::into_items).unwrap_or_default()),
            Err(e) if e.is_not_found() => {
                info!("Company list unavailable, falling back to current company");
                match self.get_current_company().await {
                    Ok(current) => Ok(current.into_iter().collect()),
                    Err(e) if e.is_not_found() => Ok(Vec::new()),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// The caller's own company, `None` when the backend has none
    pub async fn get_current_company(&self) -> AdminResult<Option<Company>> {
        let company = self.client.get("/companies/current", &[]).await?;
        debug!(found = company.is_some(), "Fetched current company");
        Ok(company)
    }

    pub async fn get_company(&self, id: Uuid) -> AdminResult<Company> {
        self.client
            .get(&format!("/companies/{}", id), &[])
            .await?
            .ok_or_else(|| AdminError::api(404, "Company not found"))
    }

    #[instrument(skip(self, payload))]
    pub async fn create_company(&self, payload: &CompanyPayload) -> AdminResult<Option<Company>> {
        self.client.post("/companies", payload).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_company(
        &self,
        id: Uuid,
        payload: &CompanyPayload,
    ) -> AdminResult<Option<Company>> {
        self.client
            .patch(&format!("/companies/{}", id), payload)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_company(&self, id: Uuid) -> AdminResult<()> {
        self.client.delete(&format!("/companies/{}", id)).await
    }
}
