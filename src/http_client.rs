use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult, FieldError};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: Config,
}

impl HttpClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.config.endpoint(path));
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = error_body(status.as_u16(), response.text().await);
        tracing::warn!("API request failed: status={}, body={}", status, body);
        Err(error_from_response(status.as_u16(), &body))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Detail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Validation(Vec<WireFieldError>),
}

#[derive(Deserialize)]
struct WireFieldError {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl From<WireFieldError> for FieldError {
    fn from(wire: WireFieldError) -> Self {
        FieldError {
            loc: wire
                .loc
                .into_iter()
                .map(|segment| match segment {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
            msg: wire.msg,
            kind: wire.kind,
        }
    }
}

/// Body of a failed response, or a note on why it could not be read.
fn error_body<E: fmt::Display>(status: u16, read: Result<String, E>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to read error body: status={}, error={}", status, e);
            format!("failed to read response body: {}", e)
        }
    }
}

/// Maps a non-success response to the error taxonomy.
pub(crate) fn error_from_response(status: u16, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);

    let message = match detail {
        Some(Detail::Validation(errors)) if !errors.is_empty() => {
            return AppError::Validation(errors.into_iter().map(FieldError::from).collect());
        }
        Some(Detail::Message(msg)) => Some(msg),
        _ => None,
    };

    match status {
        401 => AppError::Unauthorized,
        403 => AppError::Forbidden(message.unwrap_or_else(|| "Not enough permissions".to_string())),
        404 => AppError::NotFound(message.unwrap_or_else(|| "Not found".to_string())),
        _ => AppError::Api {
            status,
            detail: message.unwrap_or_else(|| body.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_detail_becomes_field_errors() {
        let body = r#"{"detail":[{"loc":["body","item_name"],"msg":"String should have at least 1 character","type":"string_too_short"},{"loc":["body",0],"msg":"bad","type":"value_error"}]}"#;
        match error_from_response(422, body) {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field(), Some("item_name"));
                assert_eq!(errors[0].kind, "string_too_short");
                assert_eq!(errors[1].loc, vec!["body".to_string(), "0".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_string_detail_by_status() {
        let body = r#"{"detail":"Item not found"}"#;
        assert!(matches!(
            error_from_response(404, body),
            AppError::NotFound(msg) if msg == "Item not found"
        ));

        let body = r#"{"detail":"You do not have sufficient permissions to create a room."}"#;
        assert!(matches!(
            error_from_response(403, body),
            AppError::Forbidden(msg) if msg.contains("create a room")
        ));

        assert!(matches!(error_from_response(401, "{}"), AppError::Unauthorized));
    }

    #[test]
    fn test_unparseable_body_is_kept_verbatim() {
        match error_from_response(502, "Bad Gateway") {
            AppError::Api { status, detail } => {
                assert_eq!(status, 502);
                assert_eq!(detail, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_body_keeps_the_read_error() {
        let body = error_body(500, Err::<String, _>("connection reset by peer"));
        match error_from_response(500, &body) {
            AppError::Api { status, detail } => {
                assert_eq!(status, 500);
                assert!(detail.contains("connection reset by peer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(error_body::<&str>(404, Ok("{}".to_string())), "{}");
    }

    #[test]
    fn test_empty_validation_list_falls_back_to_status() {
        assert!(matches!(
            error_from_response(422, r#"{"detail":[]}"#),
            AppError::Api { status: 422, .. }
        ));
    }
}
