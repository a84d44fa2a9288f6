//! Single-slot holder for the upstream anti-automation nonce
//!
//! The site issues a nonce through `admin-ajax.php` and silently expires
//! it at some point. One live nonce is kept per process. The slot lock is
//! only held to read or swap the value, never across a network call, so
//! two cold-start callers may both acquire; the last one stored wins and
//! both nonces are valid upstream.

use crate::codec::{reveal, NONCE_ACTION};
use crate::error::{Error, Result};
use crate::transport::Transport;
use std::sync::{Arc, RwLock};

/// Endpoint serving both the nonce and the embed fragments
pub const ADMIN_AJAX_PATH: &str = "/wp-admin/admin-ajax.php";

pub struct NonceGate {
    transport: Arc<dyn Transport>,
    slot: RwLock<Option<String>>,
}

impl NonceGate {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            slot: RwLock::new(None),
        }
    }

    /// The nonce currently held, if any
    pub fn current(&self) -> Option<String> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }

    /// Requests a fresh nonce and stores it, replacing the held one
    ///
    /// An answer without a usable `data` string fails with
    /// [`Error::EmptyResult`] and leaves the slot as it was.
    pub async fn acquire(&self) -> Result<String> {
        let action = reveal(NONCE_ACTION);
        let answer = self
            .transport
            .post_form(ADMIN_AJAX_PATH, &[("action", action.as_str())])
            .await?;

        let nonce = answer
            .get("data")
            .and_then(|data| data.as_str())
            .map(str::trim)
            .filter(|nonce| !nonce.is_empty())
            .ok_or_else(|| Error::empty("nonce"))?
            .to_string();

        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(nonce.clone());
        }
        tracing::info!("Acquired a new otakudesu nonce");

        Ok(nonce)
    }

    /// Held nonce, acquiring one first when the slot is empty
    pub async fn ensure(&self) -> Result<String> {
        match self.current() {
            Some(nonce) => Ok(nonce),
            None => self.acquire().await,
        }
    }

    /// Drops the held nonce after the upstream rejected it
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.write() {
            if slot.take().is_some() {
                tracing::warn!("Discarded stale otakudesu nonce");
            }
        }
    }
}

impl std::fmt::Debug for NonceGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceGate")
            .field("has_nonce", &self.current().is_some())
            .finish()
    }
}
