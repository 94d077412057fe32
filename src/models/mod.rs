pub mod item;
pub mod room;
pub mod user;

pub use item::*;
pub use room::*;
pub use user::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Item,
    Room,
}

impl ResourceKind {
    /// REST collection segment.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::User => "users",
            ResourceKind::Item => "items",
            ResourceKind::Room => "rooms",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Item => "item",
            ResourceKind::Room => "room",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::User => "User",
            ResourceKind::Item => "Item",
            ResourceKind::Room => "Room",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A record type served by one of the REST collections.
pub trait Resource:
    fmt::Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceKind;

    fn id(&self) -> Uuid;

    fn into_record(self) -> Record;
}

/// List envelope returned by every collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, count: Option<u64>) -> Self {
        Self { data, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// A record of any resource, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    User(User),
    Item(Item),
    Room(Room),
}

impl Record {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Record::User(_) => ResourceKind::User,
            Record::Item(_) => ResourceKind::Item,
            Record::Room(_) => ResourceKind::Room,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Record::User(user) => user.user_id,
            Record::Item(item) => item.item_id,
            Record::Room(room) => room.room_id,
        }
    }

    /// Headline text for lists and confirmations.
    pub fn title(&self) -> String {
        match self {
            Record::User(user) => user.display_name().to_string(),
            Record::Item(item) => item.item_name.clone(),
            Record::Room(room) => room.label(),
        }
    }
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> Uuid {
        self.user_id
    }

    fn into_record(self) -> Record {
        Record::User(self)
    }
}

impl Resource for Item {
    const KIND: ResourceKind = ResourceKind::Item;

    fn id(&self) -> Uuid {
        self.item_id
    }

    fn into_record(self) -> Record {
        Record::Item(self)
    }
}

impl Resource for Room {
    const KIND: ResourceKind = ResourceKind::Room;

    fn id(&self) -> Uuid {
        self.room_id
    }

    fn into_record(self) -> Record {
        Record::Room(self)
    }
}
