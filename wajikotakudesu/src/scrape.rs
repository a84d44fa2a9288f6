//! Cache-backed "fetch page → transform into typed result" pipeline
//!
//! The pipeline caches the *transformed* result, never the raw HTML. A
//! transform that yields an empty result is turned into
//! [`Error::EmptyResult`] so that markup changes upstream surface as
//! failures instead of empty successes.

use crate::cache::CacheStore;
use crate::error::{Error, Result};
use crate::html::Document;
use crate::transport::Transport;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Results able to tell whether extraction found anything
pub trait Scraped {
    fn is_empty(&self) -> bool;
}

/// How a scrape interacts with the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePolicy {
    pub use_cache: bool,
    /// `None` with `use_cache` keeps the result until restart
    pub ttl: Option<Duration>,
    /// Overrides the key derived from the request path
    pub key: Option<String>,
}

impl CachePolicy {
    /// Always fetch, never store
    pub fn none() -> Self {
        Self::default()
    }

    /// Cache until the process stops
    pub fn forever() -> Self {
        Self {
            use_cache: true,
            ..Self::default()
        }
    }

    /// Cache for `ttl`
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            use_cache: true,
            ttl: Some(ttl),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// One pipeline invocation: where to fetch, the value the transform fills
/// in, and the cache policy
#[derive(Debug, Clone)]
pub struct ScrapeRequest<T> {
    pub path: String,
    pub seed: T,
    pub policy: CachePolicy,
}

impl<T: Default> ScrapeRequest<T> {
    /// Request seeded with `T::default()` and no caching
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            seed: T::default(),
            policy: CachePolicy::none(),
        }
    }
}

impl<T> ScrapeRequest<T> {
    pub fn with_seed(path: impl Into<String>, seed: T) -> Self {
        Self {
            path: path.into(),
            seed,
            policy: CachePolicy::none(),
        }
    }

    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cache key: explicit key, or the path
    pub fn cache_key(&self) -> &str {
        self.policy.key.as_deref().unwrap_or(&self.path)
    }
}

/// Runs scrape requests against a transport, sharing one cache
#[derive(Clone)]
pub struct Scraper {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheStore>,
}

impl Scraper {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<CacheStore>) -> Self {
        Self { transport, cache }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Returns the cached result for the request, or fetches the page and
    /// runs `transform` on it
    ///
    /// Transport and transform errors propagate and leave the cache
    /// untouched. An empty result fails with [`Error::EmptyResult`] and is
    /// not stored either.
    pub async fn scrape<T, F, Fut>(&self, request: ScrapeRequest<T>, transform: F) -> Result<T>
    where
        T: Scraped + Clone + Send + Sync + 'static,
        F: FnOnce(Document, T) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = request.cache_key().to_string();
        let ScrapeRequest { path, seed, policy } = request;

        if policy.use_cache {
            if let Some(hit) = self.cache.get::<T>(&key) {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(hit);
            }
            tracing::debug!(key = %key, "Cache miss");
        }

        let html = self.transport.fetch_page(&path).await?;
        let document = Document::new(html, self.transport.base_url());
        let result = transform(document, seed).await?;

        if result.is_empty() {
            tracing::warn!(path = %path, "Page yielded no data");
            return Err(Error::empty(path));
        }

        if policy.use_cache {
            self.cache.put(key, result.clone(), policy.ttl);
        }

        Ok(result)
    }
}

impl std::fmt::Debug for Scraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scraper")
            .field("base_url", &self.transport.base_url())
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::select_all;
    use crate::testing::FakeTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Titles(Vec<String>);

    impl Scraped for Titles {
        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    const LISTING: &str = r#"<div class="venutama"><ul><li>Naruto</li><li>Bleach</li></ul></div>"#;

    async fn extract(document: Document, mut seed: Titles) -> Result<Titles> {
        document.query(|html| {
            for li in select_all(html.root_element(), ".venutama ul li") {
                seed.0.push(crate::html::element_text(li));
            }
        });
        Ok(seed)
    }

    fn scraper_with(transport: FakeTransport) -> (Scraper, Arc<FakeTransport>, Arc<CacheStore>) {
        let transport = Arc::new(transport);
        let cache = Arc::new(CacheStore::new());
        let scraper = Scraper::new(transport.clone(), cache.clone());
        (scraper, transport, cache)
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let (scraper, transport, _) =
            scraper_with(FakeTransport::new().with_page("/list", LISTING));
        let transforms = AtomicUsize::new(0);

        let mut results = Vec::new();
        for _ in 0..2 {
            let request = ScrapeRequest::<Titles>::new("/list").policy(CachePolicy::forever());
            let result = scraper
                .scrape(request, |doc, seed| {
                    transforms.fetch_add(1, Ordering::SeqCst);
                    extract(doc, seed)
                })
                .await
                .unwrap();
            results.push(result);
        }

        assert_eq!(transport.fetch_count(), 1);
        assert_eq!(transforms.load(Ordering::SeqCst), 1);
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0].0, vec!["Naruto", "Bleach"]);
    }

    #[tokio::test]
    async fn test_without_cache_every_call_fetches() {
        let (scraper, transport, cache) =
            scraper_with(FakeTransport::new().with_page("/list", LISTING));

        for _ in 0..3 {
            scraper
                .scrape(ScrapeRequest::<Titles>::new("/list"), extract)
                .await
                .unwrap();
        }

        assert_eq!(transport.fetch_count(), 3);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_fails_and_is_not_cached() {
        let (scraper, transport, cache) = scraper_with(
            FakeTransport::new().with_page("/list", "<p>markup changed</p>"),
        );

        let request = ScrapeRequest::<Titles>::new("/list").policy(CachePolicy::forever());
        let err = scraper.scrape(request, extract).await.unwrap_err();

        assert!(matches!(err, Error::EmptyResult(ref p) if p == "/list"));
        assert!(!cache.contains("/list"));

        // Nothing cached, so the next call hits the network again
        transport.set_page("/list", LISTING);
        let request = ScrapeRequest::<Titles>::new("/list").policy(CachePolicy::forever());
        assert!(scraper.scrape(request, extract).await.is_ok());
        assert_eq!(transport.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_propagates_without_transform() {
        let (scraper, _, cache) = scraper_with(FakeTransport::new());

        let request = ScrapeRequest::<Titles>::new("/missing").policy(CachePolicy::forever());
        let err = scraper
            .scrape(request, |_: Document, _: Titles| async {
                Err::<Titles, Error>(Error::other("transform must not run"))
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_key_overrides_path() {
        let (scraper, _, cache) =
            scraper_with(FakeTransport::new().with_page("/episode/x", LISTING));

        let request = ScrapeRequest::<Titles>::new("/episode/x")
            .policy(CachePolicy::forever().with_key("servers:x"));
        scraper.scrape(request, extract).await.unwrap();

        assert!(cache.contains("servers:x"));
        assert!(!cache.contains("/episode/x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ongoing_page_ten_minute_ttl() {
        let path = "/ongoing-anime/page/1";
        let (scraper, transport, cache) =
            scraper_with(FakeTransport::new().with_page(path, LISTING));
        let policy = CachePolicy::ttl(Duration::from_secs(10 * 60));

        let first = scraper
            .scrape(ScrapeRequest::<Titles>::new(path).policy(policy.clone()), extract)
            .await
            .unwrap();
        assert_eq!(transport.fetch_count(), 1);
        assert!(cache.contains(path));

        tokio::time::advance(Duration::from_secs(60)).await;
        let second = scraper
            .scrape(ScrapeRequest::<Titles>::new(path).policy(policy.clone()), extract)
            .await
            .unwrap();
        assert_eq!(transport.fetch_count(), 1);
        assert_eq!(first, second);

        tokio::time::advance(Duration::from_secs(10 * 60)).await;
        scraper
            .scrape(ScrapeRequest::<Titles>::new(path).policy(policy), extract)
            .await
            .unwrap();
        assert_eq!(transport.fetch_count(), 2);
    }
}
