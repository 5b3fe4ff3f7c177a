use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::api::client::ApiClient;
use crate::error::{AdminError, AdminResult};
use crate::models::{ListResponse, User, UserPayload};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// User management endpoints
#[derive(Clone)]
pub struct UserApi {
    client: Arc<ApiClient>,
}

impl UserApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn get_users(&self, page: u32, size: u32) -> AdminResult<Vec<User>> {
        let users = self
            .client
            .get::<ListResponse<User>>(
                "/users",
                &[("page", page.to_string()), ("size", size.to_string())],
            )
            .await?
            .map(ListResponse::into_items)
            .unwrap_or_default();
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    pub async fn get_user(&self, id: Uuid) -> AdminResult<User> {
        self.client
            .get(&format!("/users/{}", id), &[])
            .await?
            .ok_or_else(|| AdminError::api(404, "User not found"))
    }

    #[instrument(skip(self, payload), fields(role = %payload.role))]
    pub async fn create_user(&self, payload: &UserPayload) -> AdminResult<Option<User>> {
        self.client.post("/users", payload).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_user(&self, id: Uuid, payload: &UserPayload) -> AdminResult<Option<User>> {
        self.client.patch(&format!("/users/{}", id), payload).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> AdminResult<()> {
        self.client.delete(&format!("/users/{}", id)).await
    }
}
