use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_part_of_lab: bool,
    #[serde(default)]
    pub can_edit_items: bool,
    #[serde(default)]
    pub can_edit_labs: bool,
    #[serde(default)]
    pub can_edit_users: bool,
}

impl User {
    /// Full name when set, email otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }

    /// Applies the supplied fields of a partial update.
    pub fn merge(&mut self, update: &UserUpdate) {
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(full_name) = &update.full_name {
            self.full_name = Some(full_name.clone());
        }
        if let Some(v) = update.is_active {
            self.is_active = v;
        }
        if let Some(v) = update.is_superuser {
            self.is_superuser = v;
        }
        if let Some(v) = update.is_part_of_lab {
            self.is_part_of_lab = v;
        }
        if let Some(v) = update.can_edit_items {
            self.can_edit_items = v;
        }
        if let Some(v) = update.can_edit_labs {
            self.can_edit_labs = v;
        }
        if let Some(v) = update.can_edit_users {
            self.can_edit_users = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_part_of_lab: bool,
    pub can_edit_items: bool,
    pub can_edit_labs: bool,
    pub can_edit_users: bool,
}

impl UserCreate {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: None,
            is_active: true,
            is_superuser: false,
            is_part_of_lab: false,
            can_edit_items: false,
            can_edit_labs: false,
            can_edit_users: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_part_of_lab: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_edit_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_edit_labs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_edit_users: Option<bool>,
}

/// The lab flags edited from the user permissions dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPermissionsUpdate {
    pub is_part_of_lab: Option<bool>,
    pub can_edit_items: Option<bool>,
    pub can_edit_labs: Option<bool>,
    pub can_edit_users: Option<bool>,
}

impl UserPermissionsUpdate {
    /// Dialog defaults: the user's current flags.
    pub fn from_user(user: &User) -> Self {
        Self {
            is_part_of_lab: Some(user.is_part_of_lab),
            can_edit_items: Some(user.can_edit_items),
            can_edit_labs: Some(user.can_edit_labs),
            can_edit_users: Some(user.can_edit_users),
        }
    }
}

impl From<UserPermissionsUpdate> for UserUpdate {
    fn from(perms: UserPermissionsUpdate) -> Self {
        UserUpdate {
            is_part_of_lab: perms.is_part_of_lab,
            can_edit_items: perms.can_edit_items,
            can_edit_labs: perms.can_edit_labs,
            can_edit_users: perms.can_edit_users,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            user_id: Uuid::new_v4(),
            email: "ada@lab.example".into(),
            is_active: true,
            is_superuser: false,
            full_name: None,
            is_part_of_lab: true,
            can_edit_items: false,
            can_edit_labs: false,
            can_edit_users: false,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = sample();
        assert_eq!(user.display_name(), "ada@lab.example");
        user.full_name = Some("Ada Lovelace".into());
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_permissions_update_only_touches_flags() {
        let mut user = sample();
        let update: UserUpdate = UserPermissionsUpdate {
            can_edit_items: Some(true),
            ..Default::default()
        }
        .into();

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "can_edit_items": true }));

        user.merge(&update);
        assert!(user.can_edit_items);
        assert!(user.is_part_of_lab);
        assert_eq!(user.email, "ada@lab.example");
    }

    #[test]
    fn test_missing_flags_take_schema_defaults() {
        let id = Uuid::new_v4();
        let user: User =
            serde_json::from_value(serde_json::json!({ "user_id": id, "email": "x@y.z" })).unwrap();
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert!(!user.can_edit_users);
    }
}
