//! In-memory stand-ins for the REST collections, used by unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Item, ItemCreate, ItemTake, ItemUpdate, Message, Page, Resource, Room, RoomCreate, RoomUpdate,
    User, UserCreate, UserUpdate,
};
use crate::services::{ItemCustody, ResourceApi, UserAdmin};
use crate::validation::Validate;

/// How a fake collection builds and patches its records.
pub trait FakeRecord: Resource {
    type Create: serde::Serialize + Validate + Clone + Send + Sync;
    type Update: serde::Serialize + Validate + Clone + Send + Sync;

    fn from_create(id: Uuid, body: &Self::Create) -> Self;

    fn patch(&mut self, body: &Self::Update);
}

impl FakeRecord for Item {
    type Create = ItemCreate;
    type Update = ItemUpdate;

    fn from_create(id: Uuid, body: &ItemCreate) -> Self {
        Item {
            item_id: id,
            item_name: body.item_name.clone(),
            current_room: body.current_room,
            current_owner_id: None,
            table_name: body.table_name.clone(),
            system_name: body.system_name.clone(),
            taken_at: None,
            item_img_url: body.item_img_url.clone(),
            item_vendor: body.item_vendor.clone(),
            item_params: body.item_params.clone(),
            is_available: true,
        }
    }

    fn patch(&mut self, body: &ItemUpdate) {
        self.merge(body);
    }
}

impl FakeRecord for Room {
    type Create = RoomCreate;
    type Update = RoomUpdate;

    fn from_create(id: Uuid, body: &RoomCreate) -> Self {
        Room {
            room_id: id,
            room_number: body.room_number.clone(),
            room_place: body.room_place.clone(),
            room_owner_id: body.room_owner_id,
        }
    }

    fn patch(&mut self, body: &RoomUpdate) {
        self.merge(body);
    }
}

impl FakeRecord for User {
    type Create = UserCreate;
    type Update = UserUpdate;

    fn from_create(id: Uuid, body: &UserCreate) -> Self {
        User {
            user_id: id,
            email: body.email.clone(),
            is_active: body.is_active,
            is_superuser: body.is_superuser,
            full_name: body.full_name.clone(),
            is_part_of_lab: body.is_part_of_lab,
            can_edit_items: body.can_edit_items,
            can_edit_labs: body.can_edit_labs,
            can_edit_users: body.can_edit_users,
        }
    }

    fn patch(&mut self, body: &UserUpdate) {
        self.merge(body);
    }
}

/// Holds one list call between reading its records and returning them.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

pub struct FakeApi<R> {
    records: Mutex<Vec<R>>,
    gate: Mutex<Option<Gate>>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    write_calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl<R: FakeRecord> FakeApi<R> {
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            gate: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Makes the next call fail with a server error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// The next list call reads its page, signals `entered` and then
    /// waits for `release`.
    pub fn gate_next_list(&self) -> Gate {
        let gate = Gate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<R> {
        self.records.lock().unwrap().clone()
    }

    pub fn find(&self, id: Uuid) -> Option<R> {
        self.snapshot().into_iter().find(|r| r.id() == id)
    }

    fn check_failure(&self) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::Api {
                status: 500,
                detail: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }

    fn modify(&self, id: Uuid, f: impl FnOnce(&mut R)) -> AppResult<R> {
        self.check_failure()?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("{} not found", R::KIND.title())))?;
        f(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl<R: FakeRecord> ResourceApi for FakeApi<R> {
    type Record = R;
    type Create = R::Create;
    type Update = R::Update;

    async fn list(&self, skip: u64, limit: u64) -> AppResult<Page<R>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let page = {
            let records = self.records.lock().unwrap();
            let data = records
                .iter()
                .skip(skip as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            Page::new(data, Some(records.len() as u64))
        };
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Ok(page)
    }

    async fn get(&self, id: Uuid) -> AppResult<R> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.find(id)
            .ok_or_else(|| AppError::NotFound(format!("{} not found", R::KIND.title())))
    }

    async fn create(&self, body: &R::Create) -> AppResult<R> {
        self.check_failure()?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let record = R::from_create(Uuid::new_v4(), body);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, body: &R::Update) -> AppResult<R> {
        self.modify(id, |r| r.patch(body))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Message> {
        self.check_failure()?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(AppError::NotFound(format!("{} not found", R::KIND.title())));
        }
        Ok(Message {
            message: format!("{} deleted successfully", R::KIND.title()),
        })
    }
}

#[async_trait]
impl ItemCustody for FakeApi<Item> {
    async fn take(&self, id: Uuid, body: &ItemTake) -> AppResult<Item> {
        self.modify(id, |item| item.apply_custody(body))
    }

    async fn release(&self, id: Uuid) -> AppResult<Item> {
        self.modify(id, |item| item.apply_custody(&ItemTake::release()))
    }
}

impl UserAdmin for FakeApi<User> {}

pub fn user(email: &str) -> User {
    User::from_create(Uuid::new_v4(), &UserCreate::new(email, "password123"))
}

pub fn room(number: &str) -> Room {
    Room::from_create(
        Uuid::new_v4(),
        &RoomCreate {
            room_number: number.to_string(),
            room_place: "Main building".to_string(),
            room_owner_id: None,
        },
    )
}

pub fn item(name: &str) -> Item {
    Item::from_create(
        Uuid::new_v4(),
        &ItemCreate {
            item_name: name.to_string(),
            ..Default::default()
        },
    )
}

pub fn items(count: usize) -> Vec<Item> {
    (0..count).map(|n| item(&format!("item-{n:02}"))).collect()
}
