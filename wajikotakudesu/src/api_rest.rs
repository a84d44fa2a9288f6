//! HTTP routes for the otakudesu source
//!
//! Every answer, success or failure, is wrapped in a [`Payload`] envelope.
//! Routes are relative; [`crate::OtakudesuExt`] mounts them under the
//! configured route (`/otakudesu` by default).

use crate::error::Error;
use crate::models::{Paged, Pagination};
use crate::server_ext::OtakudesuState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::{IntoParams, OpenApi, ToSchema};

// ============ Envelope ============

/// Response envelope shared by every route
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub status_code: u16,
    pub status_message: String,
    pub message: String,
    pub ok: bool,
    #[schema(value_type = Object)]
    pub data: Value,
    #[schema(value_type = Option<Object>)]
    pub pagination: Option<Pagination>,
}

impl Payload {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            status_code: status.as_u16(),
            status_message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
            ok: status.is_success(),
            data,
            pagination: None,
        }
    }

    /// 200 envelope around any serializable result
    pub fn success<T: Serialize>(data: &T) -> Result<Self, AppError> {
        let data = serde_json::to_value(data).map_err(Error::from)?;
        Ok(Self::new(StatusCode::OK, "", data))
    }

    /// Paginated listing: cards in `data.animeList`, pagination in the envelope
    pub fn paged<C: Serialize>(page: &Paged<C>) -> Result<Self, AppError> {
        let anime_list = serde_json::to_value(&page.anime_list).map_err(Error::from)?;
        let mut payload = Self::new(StatusCode::OK, "", json!({ "animeList": anime_list }));
        payload.pagination = page.pagination.clone();
        Ok(payload)
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, Value::Null)
    }
}

impl IntoResponse for Payload {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Envelope for routes that do not exist
pub async fn not_found() -> Payload {
    Payload::failure(StatusCode::NOT_FOUND, "Route not found")
}

// ============ Error handling ============

#[derive(Debug)]
pub enum AppError {
    Scrape(Error),
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Scrape(Error::MalformedId(_)) => StatusCode::BAD_REQUEST,
            AppError::Scrape(Error::EmptyResult(_)) => StatusCode::NOT_FOUND,
            AppError::Scrape(e) => e
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Scrape(e) => {
                if status.is_server_error() {
                    tracing::error!("Otakudesu request failed: {}", e);
                } else {
                    tracing::debug!("Otakudesu request rejected: {}", e);
                }
                e.to_string()
            }
            AppError::BadRequest(message) => message,
        };

        Payload::failure(status, message).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self::Scrape(err)
    }
}

// ============ Query parameters ============

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<String>,
}

impl PageQuery {
    fn page(&self) -> Result<u32, AppError> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|page| *page >= 1)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid page: {}", raw))),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Search terms
    pub q: Option<String>,
}

/// Router of the otakudesu API, state included
pub fn create_router(state: OtakudesuState) -> Router {
    Router::new()
        .route("/home", get(get_home))
        .route("/schedule", get(get_schedule))
        .route("/anime", get(get_all_animes))
        .route("/genres", get(get_all_genres))
        .route("/ongoing", get(get_ongoing))
        .route("/completed", get(get_completed))
        .route("/search", get(get_search))
        .route("/genres/{genre_id}", get(get_genre_animes))
        .route("/anime/{anime_id}", get(get_anime))
        .route("/episode/{episode_id}", get(get_episode))
        .route("/episode/{episode_id}/servers", get(get_servers))
        .route("/server/{server_id}", get(get_server_url))
        .route("/batch/{batch_id}", get(get_batch))
        .with_state(state)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /home
#[utoipa::path(
    get,
    path = "/home",
    tag = "otakudesu",
    responses(
        (status = 200, description = "Latest ongoing and completed animes", body = Payload),
        (status = 404, description = "Nothing found on the page", body = Payload)
    )
)]
async fn get_home(State(state): State<OtakudesuState>) -> Result<Payload, AppError> {
    Payload::success(&state.client.home().await?)
}

/// GET /schedule
#[utoipa::path(
    get,
    path = "/schedule",
    tag = "otakudesu",
    responses((status = 200, description = "Weekly release schedule", body = Payload))
)]
async fn get_schedule(State(state): State<OtakudesuState>) -> Result<Payload, AppError> {
    Payload::success(&state.client.schedule().await?)
}

/// GET /anime
#[utoipa::path(
    get,
    path = "/anime",
    tag = "otakudesu",
    responses((status = 200, description = "Every anime grouped by first letter", body = Payload))
)]
async fn get_all_animes(State(state): State<OtakudesuState>) -> Result<Payload, AppError> {
    Payload::success(&state.client.all_animes().await?)
}

/// GET /genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "otakudesu",
    responses((status = 200, description = "Every genre", body = Payload))
)]
async fn get_all_genres(State(state): State<OtakudesuState>) -> Result<Payload, AppError> {
    Payload::success(&state.client.all_genres().await?)
}

/// GET /ongoing?page=
#[utoipa::path(
    get,
    path = "/ongoing",
    tag = "otakudesu",
    params(PageQuery),
    responses(
        (status = 200, description = "Ongoing animes", body = Payload),
        (status = 400, description = "Invalid page", body = Payload)
    )
)]
async fn get_ongoing(
    State(state): State<OtakudesuState>,
    Query(query): Query<PageQuery>,
) -> Result<Payload, AppError> {
    Payload::paged(&state.client.ongoing(query.page()?).await?)
}

/// GET /completed?page=
#[utoipa::path(
    get,
    path = "/completed",
    tag = "otakudesu",
    params(PageQuery),
    responses(
        (status = 200, description = "Completed animes", body = Payload),
        (status = 400, description = "Invalid page", body = Payload)
    )
)]
async fn get_completed(
    State(state): State<OtakudesuState>,
    Query(query): Query<PageQuery>,
) -> Result<Payload, AppError> {
    Payload::paged(&state.client.completed(query.page()?).await?)
}

/// GET /search?q=
#[utoipa::path(
    get,
    path = "/search",
    tag = "otakudesu",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching animes", body = Payload),
        (status = 400, description = "Missing query", body = Payload)
    )
)]
async fn get_search(
    State(state): State<OtakudesuState>,
    Query(query): Query<SearchQuery>,
) -> Result<Payload, AppError> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing query parameter q".to_string()))?;

    Payload::success(&state.client.search(q).await?)
}

/// GET /genres/{genreId}?page=
#[utoipa::path(
    get,
    path = "/genres/{genreId}",
    tag = "otakudesu",
    params(
        ("genreId" = String, Path, description = "Genre slug, e.g. action"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Animes of the genre", body = Payload),
        (status = 400, description = "Invalid page or id", body = Payload)
    )
)]
async fn get_genre_animes(
    State(state): State<OtakudesuState>,
    Path(genre_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Payload, AppError> {
    Payload::paged(&state.client.genre_animes(&genre_id, query.page()?).await?)
}

/// GET /anime/{animeId}
#[utoipa::path(
    get,
    path = "/anime/{animeId}",
    tag = "otakudesu",
    params(("animeId" = String, Path, description = "Anime slug")),
    responses(
        (status = 200, description = "Anime details", body = Payload),
        (status = 404, description = "Unknown anime", body = Payload)
    )
)]
async fn get_anime(
    State(state): State<OtakudesuState>,
    Path(anime_id): Path<String>,
) -> Result<Payload, AppError> {
    Payload::success(&state.client.anime(&anime_id).await?)
}

/// GET /episode/{episodeId}
#[utoipa::path(
    get,
    path = "/episode/{episodeId}",
    tag = "otakudesu",
    params(("episodeId" = String, Path, description = "Episode slug")),
    responses(
        (status = 200, description = "Episode details and downloads", body = Payload),
        (status = 404, description = "Unknown episode", body = Payload)
    )
)]
async fn get_episode(
    State(state): State<OtakudesuState>,
    Path(episode_id): Path<String>,
) -> Result<Payload, AppError> {
    Payload::success(&state.client.episode(&episode_id).await?)
}

/// GET /episode/{episodeId}/servers
#[utoipa::path(
    get,
    path = "/episode/{episodeId}/servers",
    tag = "otakudesu",
    params(("episodeId" = String, Path, description = "Episode slug")),
    responses(
        (status = 200, description = "Streaming mirrors with opaque server ids", body = Payload),
        (status = 404, description = "No mirror on the page", body = Payload)
    )
)]
async fn get_servers(
    State(state): State<OtakudesuState>,
    Path(episode_id): Path<String>,
) -> Result<Payload, AppError> {
    Payload::success(&state.client.servers(&episode_id).await?)
}

/// GET /server/{serverId}
#[utoipa::path(
    get,
    path = "/server/{serverId}",
    tag = "otakudesu",
    params(("serverId" = String, Path, description = "Opaque server id from the servers route")),
    responses(
        (status = 200, description = "Stream URL", body = Payload),
        (status = 400, description = "Malformed server id", body = Payload),
        (status = 403, description = "Upstream refused the request twice", body = Payload)
    )
)]
async fn get_server_url(
    State(state): State<OtakudesuState>,
    Path(server_id): Path<String>,
) -> Result<Payload, AppError> {
    Payload::success(&state.client.resolve_server(&server_id).await?)
}

/// GET /batch/{batchId}
#[utoipa::path(
    get,
    path = "/batch/{batchId}",
    tag = "otakudesu",
    params(("batchId" = String, Path, description = "Batch slug")),
    responses(
        (status = 200, description = "Batch downloads", body = Payload),
        (status = 404, description = "Unknown batch", body = Payload)
    )
)]
async fn get_batch(
    State(state): State<OtakudesuState>,
    Path(batch_id): Path<String>,
) -> Result<Payload, AppError> {
    Payload::success(&state.client.batch(&batch_id).await?)
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Otakudesu API",
        version = "1.0.0",
        description = "Anime listings, episodes, download and streaming mirrors scraped from otakudesu"
    ),
    paths(
        get_home,
        get_schedule,
        get_all_animes,
        get_all_genres,
        get_ongoing,
        get_completed,
        get_search,
        get_genre_animes,
        get_anime,
        get_episode,
        get_servers,
        get_server_url,
        get_batch,
    ),
    components(schemas(Payload)),
    tags(
        (name = "otakudesu", description = "otakudesu source")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use crate::OtakudesuClient;
    use axum::body::Body;
    use axum::http::Request;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(transport: Arc<FakeTransport>) -> Router {
        let client = OtakudesuClient::builder().transport(transport).build().unwrap();
        create_router(OtakudesuState::new(Arc::new(client)))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Payload) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const ONGOING: &str = r#"<div class="venutama"><ul>
        <li><div class="detpost"><a href="/anime/one-sub-indo/"><h2 class="jdlflm">One</h2></a></div></li>
        </ul></div>
        <div class="pagenavix"><span class="page-numbers current">2</span>
          <a class="page-numbers" href="/ongoing-anime/page/3/">3</a>
          <a class="next page-numbers" href="/ongoing-anime/page/3/">Next</a></div>"#;

    #[tokio::test]
    async fn test_paged_listing_envelope() {
        let transport = Arc::new(FakeTransport::new().with_page("/ongoing-anime/page/2", ONGOING));
        let (status, payload) = get(router(transport), "/ongoing?page=2").await;

        assert_eq!(status, StatusCode::OK);
        assert!(payload.ok);
        assert_eq!(payload.status_code, 200);
        assert_eq!(payload.status_message, "OK");
        assert_eq!(payload.data["animeList"][0]["animeId"], "one-sub-indo");
        assert_eq!(payload.pagination.unwrap().current_page, 2);
    }

    #[tokio::test]
    async fn test_invalid_page_is_bad_request() {
        let transport = Arc::new(FakeTransport::new());
        for uri in ["/ongoing?page=0", "/completed?page=abc", "/genres/action?page=-1"] {
            let (status, payload) = get(router(transport.clone()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(!payload.ok);
        }
        assert_eq!(transport.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (status, payload) = get(router(Arc::new(FakeTransport::new())), "/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload.data, Value::Null);
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let transport = Arc::new(FakeTransport::new().with_page("/anime/empty", "<p>gone</p>"));

        // Missing fixture: the fake answers 404 like the site would
        let (status, _) = get(router(transport.clone()), "/episode/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, payload) = get(router(transport.clone()), "/anime/empty").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(payload.message.contains("Empty result"));

        let (status, _) = get(router(transport), "/server/not-an-id").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_server_route_resolves_stream() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_post(Ok(json!({ "data": "n1" })));
        transport.push_post(Ok(json!({
            "data": STANDARD.encode(r#"<iframe src="https://desustream.test/v/1"></iframe>"#)
        })));

        let (status, payload) = get(router(transport), "/server/6AA9BD-5-C75u").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.data["url"], "https://desustream.test/v/1");
    }

    #[tokio::test]
    async fn test_repeated_refusal_keeps_upstream_status() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_post(Ok(json!({ "data": "n1" })));
        transport.push_status(403);
        transport.push_post(Ok(json!({ "data": "n2" })));
        transport.push_status(403);

        let (status, payload) = get(router(transport), "/server/6AA9BD-5-C75u").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(payload.status_code, 403);
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = not_found().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.paths.paths.len(), 13);
        assert!(doc.paths.paths.contains_key("/episode/{episodeId}/servers"));
    }
}
