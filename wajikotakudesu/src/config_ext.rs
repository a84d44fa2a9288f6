//! Otakudesu settings stored in wajikconfig
//!
//! Keys live under `sources.otakudesu`:
//!
//! ```yaml
//! sources:
//!   otakudesu:
//!     enabled: true
//!     base_url: https://otakudesu.cloud   # the domain moves, keep it current
//!     route: /otakudesu
//!     user_agent: Mozilla/5.0 ...
//!     timeout_secs: 30
//!     listing_ttl_secs: 600
//!     server_ttl_secs: 120
//! ```
//!
//! Every key can be overridden from the environment, e.g.
//! `WAJIK_CONFIG__SOURCES__OTAKUDESU__BASE_URL=https://otakudesu.example`.
//!
//! ```no_run
//! use wajikconfig::get_config;
//! use wajikotakudesu::OtakudesuConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! if config.get_otakudesu_enabled()? {
//!     println!("scraping {}", config.get_otakudesu_base_url());
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::{DEFAULT_LISTING_TTL_SECS, DEFAULT_ROUTE};
use crate::resolver::DEFAULT_SERVER_TTL;
use crate::transport::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use anyhow::Result;
use serde_yaml::Value;
use std::time::Duration;
use wajikconfig::Config;

const SECTION: [&str; 2] = ["sources", "otakudesu"];

fn key(name: &str) -> [&str; 3] {
    [SECTION[0], SECTION[1], name]
}

/// Otakudesu accessors for [`wajikconfig::Config`]
pub trait OtakudesuConfigExt {
    /// Whether the source is mounted (default `true`, persisted when missing)
    fn get_otakudesu_enabled(&self) -> Result<bool>;
    fn set_otakudesu_enabled(&self, enabled: bool) -> Result<()>;

    /// Site root, without trailing slash
    fn get_otakudesu_base_url(&self) -> String;
    fn set_otakudesu_base_url(&self, url: &str) -> Result<()>;

    /// Route the API is mounted under, always starting with `/`
    fn get_otakudesu_route(&self) -> String;

    fn get_otakudesu_user_agent(&self) -> String;

    fn get_otakudesu_timeout(&self) -> Duration;

    /// TTL of home, schedule, A–Z, paginated listings and search
    fn get_otakudesu_listing_ttl(&self) -> Duration;

    /// TTL of resolved stream URLs
    fn get_otakudesu_server_ttl(&self) -> Duration;
}

impl OtakudesuConfigExt for Config {
    fn get_otakudesu_enabled(&self) -> Result<bool> {
        match self.get_value(&key("enabled")) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_otakudesu_enabled(true)?;
                Ok(true)
            }
        }
    }

    fn set_otakudesu_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&key("enabled"), Value::Bool(enabled))
    }

    fn get_otakudesu_base_url(&self) -> String {
        self.get_string_or(&key("base_url"), DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    fn set_otakudesu_base_url(&self, url: &str) -> Result<()> {
        self.set_value(&key("base_url"), Value::String(url.to_string()))
    }

    fn get_otakudesu_route(&self) -> String {
        let route = self.get_string_or(&key("route"), DEFAULT_ROUTE);
        format!("/{}", route.trim_matches('/'))
    }

    fn get_otakudesu_user_agent(&self) -> String {
        self.get_string_or(&key("user_agent"), DEFAULT_USER_AGENT)
    }

    fn get_otakudesu_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(&key("timeout_secs"), DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    fn get_otakudesu_listing_ttl(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(&key("listing_ttl_secs"), DEFAULT_LISTING_TTL_SECS))
    }

    fn get_otakudesu_server_ttl(&self) -> Duration {
        Duration::from_secs(
            self.get_u64_or(&key("server_ttl_secs"), DEFAULT_SERVER_TTL.as_secs()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        Config::load_config(dir.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_from_embedded_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        assert!(config.get_otakudesu_enabled().unwrap());
        assert_eq!(config.get_otakudesu_base_url(), "https://otakudesu.cloud");
        assert_eq!(config.get_otakudesu_route(), "/otakudesu");
        assert_eq!(config.get_otakudesu_timeout(), Duration::from_secs(30));
        assert_eq!(config.get_otakudesu_listing_ttl(), Duration::from_secs(600));
        assert_eq!(config.get_otakudesu_server_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_overrides_and_normalisation() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        config.set_otakudesu_base_url("https://otakudesu.example/").unwrap();
        config
            .set_value(&key("route"), Value::String("anime/".into()))
            .unwrap();
        config.set_otakudesu_enabled(false).unwrap();

        assert_eq!(config.get_otakudesu_base_url(), "https://otakudesu.example");
        assert_eq!(config.get_otakudesu_route(), "/anime");
        assert!(!config.get_otakudesu_enabled().unwrap());
    }
}
