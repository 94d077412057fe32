use async_trait::async_trait;
use uuid::Uuid;

use super::{collection_path, page_query, record_path, ResourceApi, UserAdmin};
use crate::error::AppResult;
use crate::http_client::HttpClient;
use crate::models::{Message, Page, ResourceKind, User, UserCreate, UserUpdate};

pub struct UsersService {
    http: HttpClient,
}

impl UsersService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// The user the API token belongs to.
    pub async fn me(&self) -> AppResult<User> {
        self.http.get_json("/users/me", &[]).await
    }
}

#[async_trait]
impl ResourceApi for UsersService {
    type Record = User;
    type Create = UserCreate;
    type Update = UserUpdate;

    async fn list(&self, skip: u64, limit: u64) -> AppResult<Page<User>> {
        self.http
            .get_json(&collection_path(ResourceKind::User), &page_query(skip, limit))
            .await
    }

    async fn get(&self, id: Uuid) -> AppResult<User> {
        self.http
            .get_json(&record_path(ResourceKind::User, id), &[])
            .await
    }

    async fn create(&self, body: &UserCreate) -> AppResult<User> {
        let user: User = self
            .http
            .post_json(&collection_path(ResourceKind::User), body)
            .await?;
        tracing::info!("CreateUser: id={}, email={}", user.user_id, user.email);
        Ok(user)
    }

    async fn update(&self, id: Uuid, body: &UserUpdate) -> AppResult<User> {
        let user: User = self
            .http
            .patch_json(&record_path(ResourceKind::User, id), body)
            .await?;
        tracing::info!("UpdateUser: id={}", id);
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Message> {
        let message: Message = self
            .http
            .delete_json(&record_path(ResourceKind::User, id))
            .await?;
        tracing::info!("DeleteUser: id={}", id);
        Ok(message)
    }
}

impl UserAdmin for UsersService {}
