//! busdash: terminal dashboard client for a bus-ticket crawl backend.
//!
//! The backend exposes an HTTP API (`/api/start`, `/api/status`,
//! `/api/data`, `/api/predict`, ...) plus a WebSocket push channel for
//! log and progress events. This crate renders that surface as an
//! interactive TUI and a handful of one-shot CLI commands.
//!
//! ## Architecture
//!
//! - `api`: typed HTTP client, response models, push-event listener
//! - `state`: pure view state (selection sets, progress reducer, log
//!   console, client-side filters) with no terminal or network coupling
//! - `tui`: ratatui front-end driving `api` and `state`

pub mod api;
pub mod config;
pub mod logging;
pub mod state;
pub mod tui;
