//! # Daylog Sync Server
//!
//! Reference HTTP entries server for Daylog.
//!
//! This crate provides:
//! - Direct request handlers over any [`EntryStore`](daylog_storage::EntryStore)
//! - An `axum` router exposing them over HTTP
//! - A `serve` entry point with graceful shutdown
//!
//! # Protocol
//!
//! | method   | path             | success                   | failure                 |
//! |----------|------------------|---------------------------|-------------------------|
//! | `GET`    | `/entries`       | `{id: entry, ...}`        | 500                     |
//! | `GET`    | `/entries/{id}`  | entry                     | 404, 400 bad id         |
//! | `POST`   | `/entries/{id}`  | `{"status": "success"}`   | 400 bad id or body, 500 |
//! | `DELETE` | `/entries/{id}`  | `{"status": "success"}`   | 404, 400 bad id, 500    |
//!
//! Errors carry a body of the form `{"error": "..."}`. The server keeps no
//! merge logic: a `POST` unconditionally replaces the stored record. Conflict
//! resolution is the client's job.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod routes;

pub use config::{ServerConfig, DEFAULT_BIND_ADDR};
pub use error::{ServerError, ServerResult};
pub use handler::SyncServer;
pub use routes::{router, serve, serve_listener, shutdown_signal};
