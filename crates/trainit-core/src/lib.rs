//! TrainIt Core
//!
//! Framework-agnostic layer of the dashboard:
//! - models: records exchanged with the REST backend
//! - client / transport: authorized HTTP calls with uniform 401 handling
//! - session: token lifecycle and route gating
//! - roster, plan_builder, explorer: per-page state and operations
//! - gantt: timeline layout for plan steps

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod explorer;
pub mod gantt;
pub mod models;
pub mod plan_builder;
pub mod roster;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;
pub use config::{ApiConfig, TOKEN_STORAGE_KEY};
pub use error::{ApiError, ApiResult, FormError};
pub use session::{Route, Session, TokenStore};
pub use transport::{HttpTransport, Transport};
