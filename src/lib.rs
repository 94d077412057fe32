pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod http_client;
pub mod models;
pub mod mutation;
pub mod notify;
pub mod pagination;
pub mod permissions;
pub mod services;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{AppError, AppResult};
