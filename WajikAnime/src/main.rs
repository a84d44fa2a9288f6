use tracing::{info, warn};
use wajikconfig::get_config;
use wajikotakudesu::api_rest::not_found;
use wajikotakudesu::{OtakudesuConfigExt, OtakudesuExt};
use wajikserver::{LoggingOptions, ServerBuilder, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();
    init_logging(LoggingOptions::from_config(&config));

    let mut server = ServerBuilder::new_configured().build();

    // ========== Sources ==========

    let mut sources = Vec::new();
    if config.get_otakudesu_enabled()? {
        info!("Initializing otakudesu source...");
        match server.init_otakudesu().await {
            Ok(state) => sources.push(serde_json::json!({
                "name": "otakudesu",
                "route": state.client.route(),
            })),
            Err(e) => warn!("Failed to initialize otakudesu: {}", e),
        }
    } else {
        info!("otakudesu source disabled");
    }
    sources.push(serde_json::json!({ "name": "coming soon", "route": "" }));

    // ========== Index and fallback ==========

    let index = serde_json::json!({
        "message": "WAJIK ANIME API IS READY, every route is listed per source",
        "important": "The otakudesu domain changes often: keep sources.otakudesu.base_url up to date",
        "sources": sources,
    });
    server
        .add_route("/", move || {
            let index = index.clone();
            async move { index }
        })
        .await;
    server.set_fallback(not_found).await;
    server.enable_cors();

    // ========== Start ==========

    server.start().await;
    info!("WajikAnime is ready, press Ctrl+C to stop");
    server.wait().await;

    Ok(())
}
