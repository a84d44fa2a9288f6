//! Stream URL resolution from an opaque server id
//!
//! The flow for one call:
//!
//! 1. decode the id (a malformed id fails right away);
//! 2. answer from the short-lived response cache when possible, without
//!    touching the nonce;
//! 3. take the held nonce, or acquire one;
//! 4. post the embed request; on a 403 the nonce is considered stale:
//!    drop it, acquire once more and post once more. A second 403, like
//!    any other error, is returned as is;
//! 5. base64-decode the `data` fragment and take the first iframe `src`.

use crate::cache::CacheStore;
use crate::codec::{self, reveal, ServerTriple, EMBED_ACTION};
use crate::error::{Error, Result};
use crate::html::{iframe_src, NO_IFRAME};
use crate::models::ServerUrl;
use crate::nonce::{NonceGate, ADMIN_AJAX_PATH};
use crate::transport::Transport;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use std::time::Duration;

/// Freshness of a resolved URL (2 minutes)
pub const DEFAULT_SERVER_TTL: Duration = Duration::from_secs(2 * 60);

pub struct Resolver {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheStore>,
    nonce: Arc<NonceGate>,
    ttl: Duration,
}

impl Resolver {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<CacheStore>,
        nonce: Arc<NonceGate>,
    ) -> Self {
        Self {
            transport,
            cache,
            nonce,
            ttl: DEFAULT_SERVER_TTL,
        }
    }

    /// Overrides the response cache TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn nonce_gate(&self) -> &Arc<NonceGate> {
        &self.nonce
    }

    pub fn cache_key(server_id: &str) -> String {
        format!("server:{}", server_id)
    }

    /// Resolves the playable URL behind `server_id`
    pub async fn resolve(&self, server_id: &str) -> Result<ServerUrl> {
        let triple = codec::decode(server_id)?;
        let key = Self::cache_key(server_id);

        if let Some(hit) = self.cache.get::<ServerUrl>(&key) {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(hit);
        }

        let nonce = self.nonce.ensure().await?;
        let url = match self.request_embed(&triple, &nonce).await {
            Err(e) if e.is_permission_denied() => {
                tracing::warn!(server_id, "Nonce rejected, refreshing once");
                self.nonce.invalidate();
                let fresh = self.nonce.acquire().await?;
                self.request_embed(&triple, &fresh).await?
            }
            other => other?,
        };

        if url.is_empty() || url == NO_IFRAME {
            return Err(Error::empty(format!("no stream for server {}", server_id)));
        }

        let resolved = ServerUrl { url };
        self.cache.put(key, resolved.clone(), Some(self.ttl));
        Ok(resolved)
    }

    async fn request_embed(&self, triple: &ServerTriple, nonce: &str) -> Result<String> {
        let action = reveal(EMBED_ACTION);
        let answer = self
            .transport
            .post_form(
                ADMIN_AJAX_PATH,
                &[
                    ("id", triple.media_id.as_str()),
                    ("i", triple.instance_index.as_str()),
                    ("q", triple.quality_index.as_str()),
                    ("action", action.as_str()),
                    ("nonce", nonce),
                ],
            )
            .await?;

        let encoded = answer
            .get("data")
            .and_then(|data| data.as_str())
            .ok_or_else(|| Error::empty("embed fragment"))?;
        let fragment = STANDARD.decode(encoded.trim())?;

        Ok(iframe_src(&String::from_utf8_lossy(&fragment)))
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("nonce", &self.nonce)
            .field("ttl", &self.ttl)
            .finish()
    }
}
