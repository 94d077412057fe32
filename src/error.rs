use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One field-level validation failure.
///
/// Same shape as the backend's structured validation detail, so a failure
/// found before submission reads exactly like one the server rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn body(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// Last segment of `loc`, i.e. the offending form field.
    pub fn field(&self) -> Option<&str> {
        self.loc.last().map(String::as_str)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A submission is already in flight for this dialog")]
    Busy,

    #[error("Dialog is not open")]
    DialogClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How a failure is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Field-level, shown inline on the form.
    Validation,
    /// The action should have been hidden for this user.
    Authorization,
    /// Transient; shown as a notification, form state kept for retry.
    Transport,
    /// Misuse of the controller or workflow by the caller.
    Usage,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation(_) => ErrorCategory::Validation,
            AppError::Forbidden(_) | AppError::Unauthorized => ErrorCategory::Authorization,
            AppError::Http(_)
            | AppError::Serialization(_)
            | AppError::NotFound(_)
            | AppError::Api { .. }
            | AppError::Internal(_) => ErrorCategory::Transport,
            AppError::InvalidInput(_)
            | AppError::Busy
            | AppError::DialogClosed
            | AppError::Config(_) => ErrorCategory::Usage,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| match e.field() {
            Some(field) => format!("{}: {}", field, e.msg),
            None => e.msg.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub type AppResult<T> = Result<T, AppError>;
