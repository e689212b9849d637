//! HTTP trigger surface.
//!
//! # Data Flow
//! ```text
//! Request
//!     → request id + trace + timeout layers
//!     → auth.rs (bearer token, skipped for /healthz)
//!     → handlers.rs
//!     → BatchRunner (pass or single endpoint)
//!     → status + outcome tag
//! ```

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
