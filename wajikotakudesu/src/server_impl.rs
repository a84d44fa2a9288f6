//! [`OtakudesuExt`](crate::OtakudesuExt) for `wajikserver::Server`

use crate::api_rest::{create_router, ApiDoc};
use crate::client::{ClientBuilder, OtakudesuClient};
use crate::server_ext::{OtakudesuExt, OtakudesuState};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use wajikserver::Server;

impl OtakudesuExt for Server {
    async fn init_otakudesu(&mut self) -> Result<Arc<OtakudesuState>> {
        info!("Initializing otakudesu API...");

        let config = wajikconfig::get_config();
        let client = ClientBuilder::from_config(&config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create otakudesu client: {}", e))?;

        self.init_otakudesu_with_client(Arc::new(client)).await
    }

    async fn init_otakudesu_with_client(
        &mut self,
        client: Arc<OtakudesuClient>,
    ) -> Result<Arc<OtakudesuState>> {
        let route = client.route().to_string();
        let state = OtakudesuState::new(client);

        self.add_router(&route, create_router(state.clone())).await;

        let mut doc = ApiDoc::openapi();
        doc.servers = Some(vec![utoipa::openapi::Server::new(route.as_str())]);
        self.add_openapi(doc, "otakudesu").await;

        info!("otakudesu API initialized");
        info!("API endpoints available at {}/*", route);

        Ok(Arc::new(state))
    }
}
