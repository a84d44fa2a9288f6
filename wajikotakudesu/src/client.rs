//! Otakudesu client: one method per page
//!
//! The client owns the pieces the pages share: the transport, the cache,
//! the nonce gate and the stream resolver. Each page method builds a
//! [`ScrapeRequest`] with its cache policy and runs the matching extractor
//! as the transform.
//!
//! ```no_run
//! use wajikotakudesu::OtakudesuClient;
//!
//! # async fn example() -> wajikotakudesu::Result<()> {
//! let client = OtakudesuClient::new()?;
//!
//! let home = client.home().await?;
//! println!("{} ongoing", home.ongoing.anime_list.len());
//!
//! let servers = client.servers("frieren-episode-1-sub-indo").await?;
//! if let Some(server) = servers.qualities.first().and_then(|q| q.server_list.first()) {
//!     let stream = client.resolve_server(&server.server_id).await?;
//!     println!("stream at {}", stream.url);
//! }
//! # Ok(())
//! # }
//! ```

use crate::cache::CacheStore;
use crate::error::{Error, Result};
use crate::models::{
    AllAnimes, AllGenres, AnimeBatch, AnimeDetails, AnimeEpisode, AnimeServers,
    CompletedAnimeCard, GenreAnimeCard, Home, OngoingAnimeCard, Paged, Schedule, SearchResults,
    ServerUrl,
};
use crate::nonce::NonceGate;
use crate::parsers::{anime, batch, episode, listing, Links};
use crate::resolver::{Resolver, DEFAULT_SERVER_TTL};
use crate::scrape::{CachePolicy, ScrapeRequest, Scraped, Scraper};
use crate::transport::{Transport, TransportBuilder};
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;

/// Default route the API is mounted under
pub const DEFAULT_ROUTE: &str = "/otakudesu";

/// Default freshness of listing pages (10 minutes)
pub const DEFAULT_LISTING_TTL_SECS: u64 = 10 * 60;

/// Client for the otakudesu site
pub struct OtakudesuClient {
    scraper: Scraper,
    resolver: Resolver,
    nonce: Arc<NonceGate>,
    links: Links,
    listing_ttl: Duration,
}

impl OtakudesuClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Cache shared by every page and by the resolver
    pub fn cache(&self) -> &Arc<CacheStore> {
        self.scraper.cache()
    }

    pub fn nonce_gate(&self) -> &Arc<NonceGate> {
        &self.nonce
    }

    /// Route the hrefs of the results point to
    pub fn route(&self) -> &str {
        self.links.route()
    }

    pub fn base_url(&self) -> &str {
        self.links.base_url()
    }

    fn listing_policy(&self) -> CachePolicy {
        CachePolicy::ttl(self.listing_ttl)
    }

    /// Runs a synchronous extractor as the pipeline transform
    async fn page<T, P>(&self, request: ScrapeRequest<T>, parse: P) -> Result<T>
    where
        T: Scraped + Clone + Send + Sync + 'static,
        P: FnOnce(&Html, &Links) -> T,
    {
        let links = self.links.clone();
        self.scraper
            .scrape(request, move |document, _| async move {
                Ok(document.query(|html| parse(html, &links)))
            })
            .await
    }

    /// Front page: latest ongoing and completed animes
    pub async fn home(&self) -> Result<Home> {
        let request = ScrapeRequest::new("/").policy(self.listing_policy());
        self.page(request, listing::home).await
    }

    /// Weekly release schedule
    pub async fn schedule(&self) -> Result<Schedule> {
        let request = ScrapeRequest::new("/jadwal-rilis").policy(self.listing_policy());
        self.page(request, listing::schedule).await
    }

    /// Every anime, A to Z
    pub async fn all_animes(&self) -> Result<AllAnimes> {
        let request = ScrapeRequest::new("/anime-list").policy(self.listing_policy());
        self.page(request, listing::all_animes).await
    }

    pub async fn all_genres(&self) -> Result<AllGenres> {
        let request = ScrapeRequest::new("/genre-list").policy(CachePolicy::forever());
        self.page(request, listing::all_genres).await
    }

    pub async fn ongoing(&self, page: u32) -> Result<Paged<OngoingAnimeCard>> {
        let request = ScrapeRequest::new(format!("/ongoing-anime/page/{}", page))
            .policy(self.listing_policy());
        self.page(request, listing::ongoing).await
    }

    pub async fn completed(&self, page: u32) -> Result<Paged<CompletedAnimeCard>> {
        let request = ScrapeRequest::new(format!("/complete-anime/page/{}", page))
            .policy(self.listing_policy());
        self.page(request, listing::completed).await
    }

    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::other("empty search query"));
        }
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let request = ScrapeRequest::new(format!("?s={}&post_type=anime", encoded))
            .policy(self.listing_policy());
        self.page(request, listing::search).await
    }

    pub async fn genre_animes(&self, genre_id: &str, page: u32) -> Result<Paged<GenreAnimeCard>> {
        let genre_id = path_segment(genre_id)?;
        let request = ScrapeRequest::new(format!("/genres/{}/page/{}", genre_id, page))
            .policy(self.listing_policy());
        self.page(request, listing::genre_animes).await
    }

    pub async fn anime(&self, anime_id: &str) -> Result<AnimeDetails> {
        let anime_id = path_segment(anime_id)?;
        let request =
            ScrapeRequest::new(format!("/anime/{}", anime_id)).policy(CachePolicy::forever());
        self.page(request, anime::anime_details).await
    }

    pub async fn episode(&self, episode_id: &str) -> Result<AnimeEpisode> {
        let episode_id = path_segment(episode_id)?.to_string();
        let request =
            ScrapeRequest::new(format!("/episode/{}", episode_id)).policy(CachePolicy::forever());
        self.page(request, move |html, links| episode::episode(html, &episode_id, links))
            .await
    }

    /// Streaming mirrors of an episode
    ///
    /// Reads the same page as [`OtakudesuClient::episode`], cached under
    /// its own `servers:{episodeId}` key. Warms the nonce gate on the way,
    /// as a browser opening the page would.
    pub async fn servers(&self, episode_id: &str) -> Result<AnimeServers> {
        let episode_id = path_segment(episode_id)?;
        let request = ScrapeRequest::new(format!("/episode/{}", episode_id))
            .policy(CachePolicy::forever().with_key(format!("servers:{}", episode_id)));

        let links = self.links.clone();
        let nonce = self.nonce.clone();
        self.scraper
            .scrape(request, move |document, _| async move {
                if let Err(e) = nonce.ensure().await {
                    tracing::warn!("Failed to warm the nonce: {}", e);
                }
                document.query(|html| episode::servers(html, &links))
            })
            .await
    }

    /// Resolves the stream URL behind an opaque server id
    pub async fn resolve_server(&self, server_id: &str) -> Result<ServerUrl> {
        self.resolver.resolve(server_id).await
    }

    pub async fn batch(&self, batch_id: &str) -> Result<AnimeBatch> {
        let batch_id = path_segment(batch_id)?;
        let request =
            ScrapeRequest::new(format!("/batch/{}", batch_id)).policy(CachePolicy::forever());
        self.page(request, batch::batch).await
    }
}

impl std::fmt::Debug for OtakudesuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtakudesuClient")
            .field("links", &self.links)
            .field("listing_ttl", &self.listing_ttl)
            .field("scraper", &self.scraper)
            .finish()
    }
}

/// Rejects ids that would change the shape of the upstream path
fn path_segment(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#', '&']) || id == "." || id == ".." {
        return Err(Error::malformed_id(id));
    }
    Ok(id)
}

/// Builder for configuring an [`OtakudesuClient`]
pub struct ClientBuilder {
    http: TransportBuilder,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<CacheStore>>,
    route: String,
    listing_ttl: Duration,
    server_ttl: Duration,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            http: TransportBuilder::default(),
            transport: None,
            cache: None,
            route: DEFAULT_ROUTE.to_string(),
            listing_ttl: Duration::from_secs(DEFAULT_LISTING_TTL_SECS),
            server_ttl: DEFAULT_SERVER_TTL,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the `sources.otakudesu` settings
    #[cfg(feature = "wajikconfig")]
    pub fn from_config(config: &wajikconfig::Config) -> Self {
        use crate::config_ext::OtakudesuConfigExt;

        Self::default()
            .base_url(config.get_otakudesu_base_url())
            .user_agent(config.get_otakudesu_user_agent())
            .timeout(config.get_otakudesu_timeout())
            .route(config.get_otakudesu_route())
            .listing_ttl(config.get_otakudesu_listing_ttl())
            .server_ttl(config.get_otakudesu_server_ttl())
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.http = self.http.base_url(url);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.timeout(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http = self.http.user_agent(user_agent);
        self
    }

    /// Set a custom HTTP client
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = self.http.client(client);
        self
    }

    /// Replaces the HTTP transport altogether; HTTP settings are then ignored
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Shares an existing cache
    pub fn cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn listing_ttl(mut self, ttl: Duration) -> Self {
        self.listing_ttl = ttl;
        self
    }

    pub fn server_ttl(mut self, ttl: Duration) -> Self {
        self.server_ttl = ttl;
        self
    }

    pub fn build(self) -> Result<OtakudesuClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(self.http.build()?),
        };
        let cache = self.cache.unwrap_or_default();
        let nonce = Arc::new(NonceGate::new(transport.clone()));

        Ok(OtakudesuClient {
            links: Links::new(transport.base_url(), self.route),
            resolver: Resolver::new(transport.clone(), cache.clone(), nonce.clone())
                .with_ttl(self.server_ttl),
            scraper: Scraper::new(transport, cache),
            nonce,
            listing_ttl: self.listing_ttl,
        })
    }
}
