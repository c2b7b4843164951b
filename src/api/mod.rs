//! Client surface for the crawl backend.
//!
//! ## Architecture
//!
//! - `types`: serde models for every API payload
//! - `client`: typed reqwest wrapper over the HTTP endpoints
//! - `events`: WebSocket push-channel listener
//!
//! The HTTP poller and the push channel both feed the progress reducer
//! in `crate::state`; neither path writes to view state directly.

pub mod client;
pub mod events;
pub mod types;

pub use client::{ApiClient, ApiError, ApiResult, DbQuery};
pub use events::{ServerEvent, TaskEvent};
