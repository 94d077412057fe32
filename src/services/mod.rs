pub mod items_service;
pub mod rooms_service;
pub mod users_service;

pub use items_service::ItemsService;
pub use rooms_service::RoomsService;
pub use users_service::UsersService;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Item, Message, Page, Resource, ResourceKind, User, UserPermissionsUpdate, UserUpdate,
};
use crate::validation::Validate;

/// CRUD surface of one REST collection.
#[async_trait]
pub trait ResourceApi: Send + Sync + 'static {
    type Record: Resource;
    type Create: Serialize + Validate + Clone + Send + Sync;
    type Update: Serialize + Validate + Clone + Send + Sync;

    fn kind(&self) -> ResourceKind {
        <Self::Record as Resource>::KIND
    }

    async fn list(&self, skip: u64, limit: u64) -> AppResult<Page<Self::Record>>;

    async fn get(&self, id: Uuid) -> AppResult<Self::Record>;

    async fn create(&self, body: &Self::Create) -> AppResult<Self::Record>;

    async fn update(&self, id: Uuid, body: &Self::Update) -> AppResult<Self::Record>;

    async fn delete(&self, id: Uuid) -> AppResult<Message>;
}

/// Take/release of an item, each a single update call.
#[async_trait]
pub trait ItemCustody: ResourceApi<Record = Item> {
    async fn take(&self, id: Uuid, body: &crate::models::ItemTake) -> AppResult<Item>;

    async fn release(&self, id: Uuid) -> AppResult<Item>;
}

/// Permission edits on the users collection.
#[async_trait]
pub trait UserAdmin: ResourceApi<Record = User, Update = UserUpdate> {
    /// Writes only the lab flags of `id`.
    async fn update_permissions(
        &self,
        id: Uuid,
        permissions: UserPermissionsUpdate,
    ) -> AppResult<User> {
        self.update(id, &UserUpdate::from(permissions)).await
    }
}

fn collection_path(kind: ResourceKind) -> String {
    format!("/{}/", kind.path())
}

fn record_path(kind: ResourceKind, id: Uuid) -> String {
    format!("/{}/{}", kind.path(), id)
}

fn page_query(skip: u64, limit: u64) -> [(&'static str, String); 2] {
    [("skip", skip.to_string()), ("limit", limit.to_string())]
}
