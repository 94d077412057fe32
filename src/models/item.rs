use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: Uuid,
    pub item_name: String,
    #[serde(default)]
    pub current_room: Option<Uuid>,
    #[serde(default)]
    pub current_owner_id: Option<Uuid>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub system_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_utc::deserialize")]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub item_img_url: Option<String>,
    #[serde(default)]
    pub item_vendor: Option<String>,
    #[serde(default)]
    pub item_params: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl Item {
    /// An item is unavailable exactly when it has both an owner and a
    /// taken-at time.
    pub fn is_consistent(&self) -> bool {
        let held = self.current_owner_id.is_some() && self.taken_at.is_some();
        self.is_available != held
    }

    pub fn is_held_by(&self, user_id: Uuid) -> bool {
        self.current_owner_id == Some(user_id)
    }

    pub fn merge(&mut self, update: &ItemUpdate) {
        if let Some(name) = &update.item_name {
            self.item_name = name.clone();
        }
        if let Some(url) = &update.item_img_url {
            self.item_img_url = Some(url.clone());
        }
        if let Some(vendor) = &update.item_vendor {
            self.item_vendor = Some(vendor.clone());
        }
        if let Some(params) = &update.item_params {
            self.item_params = Some(params.clone());
        }
    }

    /// Applies a take/release body. Custody fields always move together;
    /// location fields change only when supplied.
    pub fn apply_custody(&mut self, custody: &ItemTake) {
        if let Some(room) = custody.current_room {
            self.current_room = Some(room);
        }
        if let Some(table) = &custody.table_name {
            self.table_name = Some(table.clone());
        }
        if let Some(system) = &custody.system_name {
            self.system_name = Some(system.clone());
        }
        self.current_owner_id = custody.current_owner_id;
        self.taken_at = custody.taken_at;
        self.is_available = custody.is_available;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemCreate {
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_room: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_params: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_params: Option<String>,
}

impl From<&Item> for ItemUpdate {
    fn from(item: &Item) -> Self {
        ItemUpdate {
            item_name: Some(item.item_name.clone()),
            item_img_url: item.item_img_url.clone(),
            item_vendor: item.item_vendor.clone(),
            item_params: item.item_params.clone(),
        }
    }
}

/// Body of the take and release calls.
///
/// Owner, taken-at and availability are always sent, nulls included, so
/// the three custody fields are written as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTake {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_room: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
    pub current_owner_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_utc::deserialize")]
    pub taken_at: Option<DateTime<Utc>>,
    pub is_available: bool,
}

impl ItemTake {
    pub fn take(owner: Uuid, at: DateTime<Utc>, location: TakeLocation) -> Self {
        Self {
            current_room: location.current_room,
            table_name: location.table_name,
            system_name: location.system_name,
            current_owner_id: Some(owner),
            taken_at: Some(at),
            is_available: false,
        }
    }

    pub fn release() -> Self {
        Self {
            current_room: None,
            table_name: None,
            system_name: None,
            current_owner_id: None,
            taken_at: None,
            is_available: true,
        }
    }
}

/// Where a taken item will be: the take dialog's form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TakeLocation {
    pub current_room: Option<Uuid>,
    pub table_name: Option<String>,
    pub system_name: Option<String>,
}

impl From<&Item> for TakeLocation {
    fn from(item: &Item) -> Self {
        TakeLocation {
            current_room: item.current_room,
            table_name: item.table_name.clone(),
            system_name: item.system_name.clone(),
        }
    }
}

/// Accepts RFC 3339 timestamps and the naive UTC form the backend stores.
mod lenient_utc {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).map_err(de::Error::custom)).transpose()
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Ok(dt.with_timezone(&Utc)),
            Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
        }
    }
}
