//! HTTP inbound adapter exposing REST endpoints.

pub mod donations;
pub mod error;
pub mod health;
pub mod publications;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod volunteers;
pub mod volunteers_dto;
pub mod webhooks;

pub use error::ApiResult;
