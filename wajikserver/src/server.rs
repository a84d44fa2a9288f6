//! # Server module - high level API over Axum
//!
//! - JSON routes with `add_route()`
//! - Sub-routers mounted by source crates with `add_router()`
//! - Swagger UI for source APIs with `add_openapi()`
//! - JSON 404 fallback with `set_fallback()`
//! - Permissive CORS with `enable_cors()`
//! - Graceful shutdown on Ctrl+C

use axum::handler::Handler;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::RwLock, task::JoinHandle};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use utoipa_swagger_ui::SwaggerUi;
use wajikconfig::get_config;

const DEFAULT_SERVER_NAME: &str = "Wajik-Anime-Server";

/// Main server
pub struct Server {
    name: String,
    base_url: String,
    http_port: u16,
    router: Arc<RwLock<Router>>,
    cors: bool,
    join_handle: Option<JoinHandle<()>>,
}

impl Server {
    /// Creates a server that will listen on `http_port`
    ///
    /// `base_url` is only used in logs.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
            router: Arc::new(RwLock::new(Router::new())),
            cors: false,
            join_handle: None,
        }
    }

    pub fn new_configured() -> Self {
        let config = get_config();
        Self::new(
            DEFAULT_SERVER_NAME,
            config.get_base_url(),
            config.get_http_port(),
        )
    }

    /// Adds a dynamic JSON route
    ///
    /// The closure is called on every GET on `path`.
    ///
    /// ```rust,no_run
    /// # use wajikserver::Server;
    /// # #[tokio::main]
    /// # async fn main() {
    /// # let mut server = Server::new("Test", "localhost", 3001);
    /// server.add_route("/api/status", || async {
    ///     serde_json::json!({"status": "online"})
    /// }).await;
    /// # }
    /// ```
    pub async fn add_route<F, Fut, T>(&mut self, path: &str, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let f = Arc::new(f);
        let handler = move || {
            let f = f.clone();
            async move { Json(f().await) }
        };

        self.mount(path, Router::new().route("/", get(handler))).await;
    }

    /// Adds a sub-router
    ///
    /// `"/"` merges it at the root, any other path nests it.
    pub async fn add_router(&mut self, path: &str, sub_router: Router) {
        let normalized = format!("/{}", path.trim_matches('/'));
        self.mount(&normalized, sub_router).await;
    }

    async fn mount(&mut self, path: &str, route: Router) {
        let mut r = self.router.write().await;
        *r = if path == "/" {
            std::mem::take(&mut *r).merge(route)
        } else {
            std::mem::take(&mut *r).nest(path, route)
        };
    }

    /// Publishes an OpenAPI document with its Swagger UI
    ///
    /// - `/swagger-ui/{name}` serves the Swagger UI
    /// - `/api-docs/{name}.json` serves the OpenAPI document
    ///
    /// The documented routes themselves are mounted with [`Server::add_router`].
    pub async fn add_openapi(&mut self, openapi: utoipa::openapi::OpenApi, name: &str) {
        // Swagger UI wants 'static paths; add_openapi runs once per API at startup
        let swagger_path: &'static str =
            Box::leak(format!("/swagger-ui/{}", name).into_boxed_str());
        let openapi_json_path: &'static str =
            Box::leak(format!("/api-docs/{}.json", name).into_boxed_str());

        let swagger = SwaggerUi::new(swagger_path).url(openapi_json_path, openapi);

        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).merge(swagger);
    }

    /// Sets the handler used when no route matches
    pub async fn set_fallback<H, T>(&mut self, handler: H)
    where
        H: Handler<T, ()> + Clone + 'static,
        T: 'static,
    {
        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).fallback(handler);
    }

    /// Answers cross-origin requests from any origin
    pub fn enable_cors(&mut self) {
        self.cors = true;
    }

    /// Snapshot of the current router, CORS layer included
    pub async fn router(&self) -> Router {
        let router = self.router.read().await.clone();
        if self.cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Starts the HTTP server
    ///
    /// Binds `0.0.0.0:{http_port}` and stops on Ctrl+C.
    pub async fn start(&mut self) {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.http_port));
        info!(
            "Server {} running at http://{}:{}",
            self.name, self.base_url, self.http_port
        );

        let r = self.router().await;
        let server_task = tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("Failed to bind {}: {}", addr, e);
                    return;
                }
            };
            if let Err(e) = axum::serve(listener, r.into_make_service()).await {
                error!("HTTP server stopped: {}", e);
            }
        });

        let shutdown_task = tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => info!("Ctrl+C received, shutting down"),
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
        });

        self.join_handle = Some(tokio::spawn(async move {
            tokio::select! {
                _ = server_task => {},
                _ = shutdown_task => {},
            }
        }));
    }

    /// Waits for the server to stop
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }
}

/// Builder pattern
pub struct ServerBuilder {
    name: String,
    base_url: String,
    http_port: u16,
}

impl ServerBuilder {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
        }
    }

    pub fn new_configured() -> Self {
        let config = get_config();
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            base_url: config.get_base_url(),
            http_port: config.get_http_port(),
        }
    }

    pub fn build(self) -> Server {
        Server::new(self.name, self.base_url, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_add_route_and_router() {
        let mut server = ServerBuilder::new("Test", "localhost", 0).build();

        server
            .add_route("/status", || async { serde_json::json!({"status": "ok"}) })
            .await;
        server
            .add_router(
                "nested/",
                Router::new().route("/ping", get(|| async { Json("pong") })),
            )
            .await;

        let (status, json) = get_json(server.router().await, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");

        let (status, json) = get_json(server.router().await, "/nested/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, "pong");
    }

    #[tokio::test]
    async fn test_fallback() {
        let mut server = Server::new("Test", "localhost", 0);
        server
            .set_fallback(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"ok": false})),
                )
            })
            .await;

        let (status, json) = get_json(server.router().await, "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["ok"], false);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let mut server = Server::new("Test", "localhost", 0);
        server
            .add_route("/status", || async { serde_json::json!({"status": "ok"}) })
            .await;
        server.enable_cors();

        let response = server
            .router()
            .await
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .header("origin", "http://example.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
