//! # wajikserver - thin Axum server for the WajikAnime sources
//!
//! This crate wraps an Axum [`Router`](axum::Router) behind a small mutable
//! [`Server`] so that source crates can register their routes through
//! extension traits without this crate knowing about them.
//!
//! ## Modules
//!
//! - [`server`] : the server and its builder
//! - [`logs`] : `tracing` subscriber initialisation
//!
//! ## Example
//!
//! ```rust,no_run
//! use wajikserver::{ServerBuilder, logs::{init_logging, LoggingOptions}};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging(LoggingOptions::default());
//!
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 3001).build();
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LoggingOptions, init_logging};
pub use server::{Server, ServerBuilder};
