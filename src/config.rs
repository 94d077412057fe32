use std::env;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Config {
            api_base_url: api_base_url.into(),
            api_token: None,
            request_timeout_secs: 30,
        }
    }

    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .map_err(|_| AppError::Config("API_BASE_URL must be set".to_string()))?;

        Ok(Config {
            api_base_url,
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
