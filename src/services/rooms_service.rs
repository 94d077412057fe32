use async_trait::async_trait;
use uuid::Uuid;

use super::{collection_path, page_query, record_path, ResourceApi};
use crate::error::AppResult;
use crate::http_client::HttpClient;
use crate::models::{Message, Page, ResourceKind, Room, RoomCreate, RoomUpdate};

pub struct RoomsService {
    http: HttpClient,
}

impl RoomsService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ResourceApi for RoomsService {
    type Record = Room;
    type Create = RoomCreate;
    type Update = RoomUpdate;

    async fn list(&self, skip: u64, limit: u64) -> AppResult<Page<Room>> {
        self.http
            .get_json(&collection_path(ResourceKind::Room), &page_query(skip, limit))
            .await
    }

    async fn get(&self, id: Uuid) -> AppResult<Room> {
        self.http
            .get_json(&record_path(ResourceKind::Room, id), &[])
            .await
    }

    async fn create(&self, body: &RoomCreate) -> AppResult<Room> {
        let room: Room = self
            .http
            .post_json(&collection_path(ResourceKind::Room), body)
            .await?;
        tracing::info!("CreateRoom: id={}, number={}", room.room_id, room.room_number);
        Ok(room)
    }

    async fn update(&self, id: Uuid, body: &RoomUpdate) -> AppResult<Room> {
        self.http
            .put_json(&record_path(ResourceKind::Room, id), body)
            .await
    }

    async fn delete(&self, id: Uuid) -> AppResult<Message> {
        let message: Message = self
            .http
            .delete_json(&record_path(ResourceKind::Room, id))
            .await?;
        tracing::info!("DeleteRoom: id={}", id);
        Ok(message)
    }
}
