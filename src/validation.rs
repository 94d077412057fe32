//! Client-side checks of the backend schema constraints.
//!
//! Runs before a body is submitted so obvious mistakes never make the round
//! trip. Messages follow the backend's wording.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult, FieldError};
use crate::models::{
    ItemCreate, ItemTake, ItemUpdate, RoomCreate, RoomUpdate, TakeLocation, UserCreate,
    UserPermissionsUpdate, UserUpdate,
};

pub const MAX_STRING_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 40;

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").unwrap()
});

pub trait Validate {
    fn validate(&self) -> AppResult<()>;
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            let unit = if min == 1 { "character" } else { "characters" };
            self.errors.push(FieldError::body(
                field,
                format!("String should have at least {} {}", min, unit),
                "string_too_short",
            ));
        } else if len > max {
            self.errors.push(FieldError::body(
                field,
                format!("String should have at most {} characters", max),
                "string_too_long",
            ));
        }
    }

    fn optional_length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        if let Some(value) = value {
            self.length(field, value, min, max);
        }
    }

    fn email(&mut self, value: &str) {
        if value.chars().count() > MAX_STRING_LEN {
            self.length("email", value, 0, MAX_STRING_LEN);
        } else if !RE_EMAIL.is_match(value) {
            self.errors.push(FieldError::body(
                "email",
                "value is not a valid email address",
                "value_error",
            ));
        }
    }

    fn password(&mut self, value: &str) {
        self.length("password", value, MIN_PASSWORD_LEN, MAX_PASSWORD_LEN);
    }

    fn required<T>(&mut self, field: &str, value: Option<T>, msg: &str) {
        if value.is_none() {
            self.errors.push(FieldError::body(field, msg, "missing"));
        }
    }

    fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

impl Validate for UserCreate {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        check.email(&self.email);
        check.password(&self.password);
        check.optional_length("full_name", self.full_name.as_deref(), 0, MAX_STRING_LEN);
        check.finish()
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        if let Some(email) = &self.email {
            check.email(email);
        }
        if let Some(password) = &self.password {
            check.password(password);
        }
        check.optional_length("full_name", self.full_name.as_deref(), 0, MAX_STRING_LEN);
        check.finish()
    }
}

impl Validate for UserPermissionsUpdate {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

impl Validate for ItemCreate {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        check.length("item_name", &self.item_name, 1, MAX_STRING_LEN);
        check.optional_length("table_name", self.table_name.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("system_name", self.system_name.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("item_img_url", self.item_img_url.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("item_vendor", self.item_vendor.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("item_params", self.item_params.as_deref(), 0, MAX_STRING_LEN);
        check.finish()
    }
}

impl Validate for ItemUpdate {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        check.optional_length("item_name", self.item_name.as_deref(), 1, MAX_STRING_LEN);
        check.optional_length("item_img_url", self.item_img_url.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("item_vendor", self.item_vendor.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("item_params", self.item_params.as_deref(), 0, MAX_STRING_LEN);
        check.finish()
    }
}

impl Validate for TakeLocation {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        check.required("current_room", self.current_room, "Current room is required.");
        check.optional_length("table_name", self.table_name.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("system_name", self.system_name.as_deref(), 0, MAX_STRING_LEN);
        check.finish()
    }
}

impl Validate for ItemTake {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        check.optional_length("table_name", self.table_name.as_deref(), 0, MAX_STRING_LEN);
        check.optional_length("system_name", self.system_name.as_deref(), 0, MAX_STRING_LEN);
        let held = self.current_owner_id.is_some() && self.taken_at.is_some();
        if self.is_available == held {
            check.errors.push(FieldError::body(
                "is_available",
                "Owner, taken-at and availability must change together",
                "value_error",
            ));
        }
        check.finish()
    }
}

impl Validate for RoomCreate {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        check.length("room_number", &self.room_number, 1, MAX_STRING_LEN);
        check.length("room_place", &self.room_place, 1, MAX_STRING_LEN);
        check.finish()
    }
}

impl Validate for RoomUpdate {
    fn validate(&self) -> AppResult<()> {
        let mut check = Checker::default();
        check.optional_length("room_number", self.room_number.as_deref(), 1, MAX_STRING_LEN);
        check.optional_length("room_place", self.room_place.as_deref(), 1, MAX_STRING_LEN);
        check.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn fields(result: AppResult<()>) -> Vec<String> {
        match result {
            Err(AppError::Validation(errors)) => errors
                .iter()
                .filter_map(|e| e.field().map(str::to_string))
                .collect(),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(()) => vec![],
        }
    }

    #[test]
    fn test_user_create_email_and_password() {
        assert!(UserCreate::new("ada@lab.example", "correct-horse").validate().is_ok());
        assert_eq!(
            fields(UserCreate::new("not-an-email", "short").validate()),
            vec!["email", "password"]
        );
        assert_eq!(
            fields(UserCreate::new("ada@lab.example", "x".repeat(41)).validate()),
            vec!["password"]
        );
    }

    #[test]
    fn test_email_length_limit() {
        let long = format!("{}@lab.example", "a".repeat(250));
        assert_eq!(fields(UserCreate::new(long, "password1").validate()), vec!["email"]);
    }

    #[test]
    fn test_item_name_bounds_count_chars() {
        let ok = ItemCreate {
            item_name: "é".repeat(255),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let empty = ItemCreate::default();
        assert_eq!(fields(empty.validate()), vec!["item_name"]);

        let update = ItemUpdate {
            item_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(fields(update.validate()), vec!["item_name"]);
        assert!(ItemUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_room_requires_number_and_place() {
        assert_eq!(fields(RoomCreate::default().validate()), vec!["room_number", "room_place"]);
        let room = RoomCreate {
            room_number: "12".into(),
            room_place: "North wing".into(),
            room_owner_id: None,
        };
        assert!(room.validate().is_ok());
    }

    #[test]
    fn test_take_location_requires_room() {
        let missing = TakeLocation::default();
        match missing.validate() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors[0].msg, "Current room is required.");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let located = TakeLocation {
            current_room: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(located.validate().is_ok());
    }

    #[test]
    fn test_custody_body_must_be_consistent() {
        let owner = Uuid::new_v4();
        assert!(ItemTake::release().validate().is_ok());
        assert!(ItemTake::take(owner, Utc::now(), TakeLocation::default()).validate().is_ok());

        let mut half = ItemTake::release();
        half.current_owner_id = Some(owner);
        half.is_available = false;
        assert_eq!(fields(half.validate()), vec!["is_available"]);
    }
}
