use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Record, ResourceKind, User};

/// Something the acting user may or may not be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EditItems,
    /// Rooms are "labs" in the capability flags.
    EditLabs,
    EditUsers,
    ViewLab,
    TakeItem,
    ReleaseItem { owner: Option<Uuid> },
}

impl Action {
    /// Capability guarding create/update/delete of a resource.
    pub fn for_resource(kind: ResourceKind) -> Action {
        match kind {
            ResourceKind::User => Action::EditUsers,
            ResourceKind::Item => Action::EditItems,
            ResourceKind::Room => Action::EditLabs,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Action::EditItems => "edit items",
            Action::EditLabs => "edit rooms",
            Action::EditUsers => "edit users",
            Action::ViewLab => "view lab resources",
            Action::TakeItem => "take this item",
            Action::ReleaseItem { .. } => "release this item",
        }
    }
}

/// The acting user's permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    user_id: Uuid,
    is_superuser: bool,
    is_part_of_lab: bool,
    can_edit_items: bool,
    can_edit_labs: bool,
    can_edit_users: bool,
}

impl Capabilities {
    pub fn of(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            is_superuser: user.is_superuser,
            is_part_of_lab: user.is_part_of_lab,
            can_edit_items: user.can_edit_items,
            can_edit_labs: user.can_edit_labs,
            can_edit_users: user.can_edit_users,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn allows(&self, action: Action) -> bool {
        if self.is_superuser {
            return true;
        }
        match action {
            Action::EditItems => self.can_edit_items,
            Action::EditLabs => self.can_edit_labs,
            Action::EditUsers => self.can_edit_users,
            Action::ViewLab | Action::TakeItem => self.is_part_of_lab,
            Action::ReleaseItem { owner } => owner == Some(self.user_id),
        }
    }

    pub fn check(&self, action: Action) -> AppResult<()> {
        if self.allows(action) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "You do not have sufficient permissions to {}.",
                action.describe()
            )))
        }
    }

    /// Whether the edit/delete actions menu is shown for a record.
    pub fn can_manage(&self, record: &Record) -> bool {
        self.allows(Action::for_resource(record.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            user_id: Uuid::new_v4(),
            email: "tech@lab.example".into(),
            is_active: true,
            is_superuser: false,
            full_name: None,
            is_part_of_lab: false,
            can_edit_items: false,
            can_edit_labs: false,
            can_edit_users: false,
        }
    }

    #[test]
    fn test_plain_user_has_no_capabilities() {
        let caps = Capabilities::of(&user());
        for kind in [ResourceKind::User, ResourceKind::Item, ResourceKind::Room] {
            assert!(!caps.allows(Action::for_resource(kind)));
        }
        assert!(!caps.allows(Action::TakeItem));
        let err = caps.check(Action::EditLabs).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Forbidden: You do not have sufficient permissions to edit rooms."
        );
    }

    #[test]
    fn test_flags_grant_matching_action_only() {
        let mut u = user();
        u.can_edit_items = true;
        let caps = Capabilities::of(&u);
        assert!(caps.allows(Action::EditItems));
        assert!(!caps.allows(Action::EditLabs));
        assert!(!caps.allows(Action::EditUsers));
    }

    #[test]
    fn test_superuser_allows_everything() {
        let mut u = user();
        u.is_superuser = true;
        let caps = Capabilities::of(&u);
        assert!(caps.allows(Action::EditUsers));
        assert!(caps.allows(Action::ReleaseItem { owner: None }));
    }

    #[test]
    fn test_release_only_by_holder() {
        let mut u = user();
        u.is_part_of_lab = true;
        let caps = Capabilities::of(&u);
        assert!(caps.allows(Action::TakeItem));
        assert!(caps.allows(Action::ReleaseItem { owner: Some(u.user_id) }));
        assert!(!caps.allows(Action::ReleaseItem { owner: Some(Uuid::new_v4()) }));
        assert!(!caps.allows(Action::ReleaseItem { owner: None }));
    }

    #[test]
    fn test_can_manage_dispatches_on_record_kind() {
        let mut u = user();
        u.can_edit_users = true;
        let caps = Capabilities::of(&u);
        assert!(caps.can_manage(&Record::User(u.clone())));
    }
}
