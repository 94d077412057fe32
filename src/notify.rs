//! User-facing feedback after a mutation settles.

use std::sync::Mutex;

use crate::error::AppError;
use crate::models::ResourceKind;

pub const GENERIC_ERROR: &str = "Something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub status: NoticeStatus,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: NoticeStatus::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: NoticeStatus::Error,
        }
    }

    /// `"Item created successfully."` and friends.
    pub fn mutation_succeeded(kind: ResourceKind, past_tense: &str) -> Self {
        Self::success(
            "Success!",
            format!("{} {} successfully.", kind.title(), past_tense),
        )
    }

    pub fn deleted(kind: ResourceKind) -> Self {
        Self::success(
            "Success",
            format!("The {} was deleted successfully.", kind.label()),
        )
    }

    /// First structured validation message when there is one, otherwise
    /// the backend's detail string, otherwise a generic message.
    pub fn from_error(err: &AppError) -> Self {
        Self::error("Something went wrong.", describe_error(err))
    }

    pub fn delete_failed(kind: ResourceKind) -> Self {
        Self::error(
            "An error occurred.",
            format!("An error occurred while deleting the {}.", kind.label()),
        )
    }
}

fn describe_error(err: &AppError) -> String {
    if let Some(first) = err.field_errors().first() {
        return first.msg.clone();
    }
    match err {
        AppError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
        AppError::NotFound(detail) | AppError::Forbidden(detail) if !detail.is_empty() => {
            detail.clone()
        }
        _ => GENERIC_ERROR.to_string(),
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.status {
            NoticeStatus::Success => {
                tracing::info!("{}: {}", notification.title, notification.description)
            }
            NoticeStatus::Error => {
                tracing::error!("{}: {}", notification.title, notification.description)
            }
        }
    }
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains what has been recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *seen)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn test_success_messages() {
        let n = Notification::mutation_succeeded(ResourceKind::Item, "created");
        assert_eq!(n.title, "Success!");
        assert_eq!(n.description, "Item created successfully.");

        let n = Notification::deleted(ResourceKind::Room);
        assert_eq!(n.description, "The room was deleted successfully.");
        assert_eq!(n.status, NoticeStatus::Success);
    }

    #[test]
    fn test_error_prefers_first_field_message() {
        let err = AppError::Validation(vec![
            FieldError::body("email", "value is not a valid email address", "value_error"),
            FieldError::body("password", "too short", "value_error"),
        ]);
        let n = Notification::from_error(&err);
        assert_eq!(n.status, NoticeStatus::Error);
        assert_eq!(n.description, "value is not a valid email address");

        let err = AppError::Api {
            status: 400,
            detail: "The user with this email already exists in the system.".into(),
        };
        assert_eq!(
            Notification::from_error(&err).description,
            "The user with this email already exists in the system."
        );

        assert_eq!(
            Notification::from_error(&AppError::Unauthorized).description,
            GENERIC_ERROR
        );
    }

    #[test]
    fn test_recording_notifier_drains() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::delete_failed(ResourceKind::User));
        let seen = notifier.take();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].description, "An error occurred while deleting the user.");
        assert!(notifier.take().is_empty());
    }
}
