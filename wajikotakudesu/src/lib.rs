//! # wajikotakudesu - otakudesu scraper
//!
//! Extracts anime listings, episodes, download mirrors and stream URLs from
//! the otakudesu site and, with the `server` feature, serves them over HTTP.
//!
//! ## Building blocks
//!
//! - [`cache`] : in-memory store with per-entry expiry
//! - [`codec`] : reversible opaque server ids
//! - [`scrape`] : cache-backed "fetch page, transform into typed result" pipeline
//! - [`nonce`] / [`resolver`] : nonce-gated stream URL resolution with one refresh retry
//! - [`transport`] : the `Transport` seam and its `reqwest` implementation
//! - [`parsers`] : one extractor per page
//! - [`client`] : [`OtakudesuClient`], one method per page
//!
//! ## Features
//!
//! - `wajikconfig` (default) : [`OtakudesuConfigExt`] and `ClientBuilder::from_config`
//! - `server` : REST routes ([`api_rest`]) and [`OtakudesuExt`] for `wajikserver::Server`
//!
//! ## Example
//!
//! ```rust,no_run
//! use wajikotakudesu::OtakudesuClient;
//!
//! #[tokio::main]
//! async fn main() -> wajikotakudesu::Result<()> {
//!     let client = OtakudesuClient::builder()
//!         .base_url("https://otakudesu.cloud")
//!         .build()?;
//!
//!     let ongoing = client.ongoing(1).await?;
//!     for anime in &ongoing.anime_list {
//!         println!("{} ({:?} episodes)", anime.title, anime.episodes);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod codec;
pub mod error;
pub mod html;
pub mod models;
pub mod nonce;
pub mod parsers;
pub mod resolver;
pub mod scrape;
pub mod transport;

#[cfg(feature = "wajikconfig")]
pub mod config_ext;

#[cfg(feature = "server")]
pub mod api_rest;
#[cfg(feature = "server")]
pub mod server_ext;
#[cfg(feature = "server")]
mod server_impl;

#[cfg(test)]
mod testing;

pub use cache::CacheStore;
pub use client::{ClientBuilder, OtakudesuClient};
pub use codec::{OpaqueServerId, ServerTriple};
pub use error::{Error, Result};
pub use nonce::NonceGate;
pub use resolver::Resolver;
pub use scrape::{CachePolicy, ScrapeRequest, Scraped, Scraper};
pub use transport::{HttpTransport, Transport, TransportBuilder};

#[cfg(feature = "wajikconfig")]
pub use config_ext::OtakudesuConfigExt;

#[cfg(feature = "server")]
pub use server_ext::{OtakudesuExt, OtakudesuState};
