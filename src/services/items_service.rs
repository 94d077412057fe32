use async_trait::async_trait;
use uuid::Uuid;

use super::{collection_path, page_query, record_path, ItemCustody, ResourceApi};
use crate::error::AppResult;
use crate::http_client::HttpClient;
use crate::models::{Item, ItemCreate, ItemTake, ItemUpdate, Message, Page, ResourceKind};

pub struct ItemsService {
    http: HttpClient,
}

impl ItemsService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ResourceApi for ItemsService {
    type Record = Item;
    type Create = ItemCreate;
    type Update = ItemUpdate;

    async fn list(&self, skip: u64, limit: u64) -> AppResult<Page<Item>> {
        let page: Page<Item> = self
            .http
            .get_json(&collection_path(ResourceKind::Item), &page_query(skip, limit))
            .await?;
        tracing::debug!(
            "ListItems: skip={}, limit={}, returned={}, count={:?}",
            skip,
            limit,
            page.data.len(),
            page.count
        );
        Ok(page)
    }

    async fn get(&self, id: Uuid) -> AppResult<Item> {
        self.http
            .get_json(&record_path(ResourceKind::Item, id), &[])
            .await
    }

    async fn create(&self, body: &ItemCreate) -> AppResult<Item> {
        let item: Item = self
            .http
            .post_json(&collection_path(ResourceKind::Item), body)
            .await?;
        tracing::info!("CreateItem: id={}, name={}", item.item_id, item.item_name);
        Ok(item)
    }

    async fn update(&self, id: Uuid, body: &ItemUpdate) -> AppResult<Item> {
        let item: Item = self
            .http
            .put_json(&record_path(ResourceKind::Item, id), body)
            .await?;
        tracing::info!("UpdateItem: id={}", id);
        Ok(item)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Message> {
        let message: Message = self
            .http
            .delete_json(&record_path(ResourceKind::Item, id))
            .await?;
        tracing::info!("DeleteItem: id={}, message={}", id, message.message);
        Ok(message)
    }
}

#[async_trait]
impl ItemCustody for ItemsService {
    async fn take(&self, id: Uuid, body: &ItemTake) -> AppResult<Item> {
        let item: Item = self
            .http
            .put_json(&format!("{}/take", record_path(ResourceKind::Item, id)), body)
            .await?;
        tracing::info!(
            "TakeItem: id={}, owner={:?}, room={:?}",
            id,
            item.current_owner_id,
            item.current_room
        );
        Ok(item)
    }

    async fn release(&self, id: Uuid) -> AppResult<Item> {
        let item: Item = self
            .http
            .put_json(
                &format!("{}/release", record_path(ResourceKind::Item, id)),
                &ItemTake::release(),
            )
            .await?;
        tracing::info!("ReleaseItem: id={}", id);
        Ok(item)
    }
}
