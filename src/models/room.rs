use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: Uuid,
    pub room_number: String,
    pub room_place: String,
    #[serde(default)]
    pub room_owner_id: Option<Uuid>,
}

impl Room {
    /// "number - place", as shown in room pickers.
    pub fn label(&self) -> String {
        format!("{} - {}", self.room_number, self.room_place)
    }

    pub fn merge(&mut self, update: &RoomUpdate) {
        if let Some(number) = &update.room_number {
            self.room_number = number.clone();
        }
        if let Some(place) = &update.room_place {
            self.room_place = place.clone();
        }
        if let Some(owner) = update.room_owner_id {
            self.room_owner_id = Some(owner);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomCreate {
    pub room_number: String,
    pub room_place: String,
    /// The backend assigns the creating user when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_owner_id: Option<Uuid>,
}

impl From<&Room> for RoomUpdate {
    fn from(room: &Room) -> Self {
        RoomUpdate {
            room_number: Some(room.room_number.clone()),
            room_place: Some(room.room_place.clone()),
            room_owner_id: room.room_owner_id,
        }
    }
}
