//! wajikserver extension for otakudesu
//!
//! `wajikserver` knows nothing about the sources; this trait lets the
//! otakudesu crate mount its routes and OpenAPI document on a
//! [`wajikserver::Server`].
//!
//! ```rust,no_run
//! use wajikotakudesu::OtakudesuExt;
//! use wajikserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_otakudesu().await?;
//!
//!     server.start().await;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

use crate::client::OtakudesuClient;
use anyhow::Result;
use std::sync::Arc;

/// Shared state of the otakudesu handlers
#[derive(Clone)]
pub struct OtakudesuState {
    pub client: Arc<OtakudesuClient>,
}

impl OtakudesuState {
    pub fn new(client: Arc<OtakudesuClient>) -> Self {
        Self { client }
    }
}

pub trait OtakudesuExt {
    /// Builds a client from the global configuration and mounts its routes
    ///
    /// Routes land under `sources.otakudesu.route` (default `/otakudesu`);
    /// the Swagger UI is served at `/swagger-ui/otakudesu`.
    async fn init_otakudesu(&mut self) -> Result<Arc<OtakudesuState>>;

    /// Mounts the routes of an existing client under its route
    async fn init_otakudesu_with_client(
        &mut self,
        client: Arc<OtakudesuClient>,
    ) -> Result<Arc<OtakudesuState>>;
}

// Implemented in server_impl.rs
