//! # WajikAnime configuration
//!
//! One YAML tree per process, built from three layers, later layers winning:
//!
//! 1. the defaults embedded in the binary (`wajik.yaml`);
//! 2. `config.yaml` in the configuration directory;
//! 3. `WAJIK_CONFIG__SECTION__KEY=value` environment variables.
//!
//! Keys are case-insensitive (stored lower-cased). The merged tree is
//! written back to `config.yaml`, so the file always shows every setting.
//!
//! Source crates add their own keys through extension traits implemented on
//! [`Config`] (see `wajikotakudesu::OtakudesuConfigExt`).
//!
//! ```no_run
//! use wajikconfig::get_config;
//!
//! let config = get_config();
//! let port = config.get_http_port();
//! config.set_http_port(9000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::{env, fs};
use tracing::{info, warn};

const EMBEDDED_DEFAULTS: &str = include_str!("wajik.yaml");

const DIR_ENV_VAR: &str = "WAJIK_CONFIG";
const OVERRIDE_PREFIX: &str = "WAJIK_CONFIG__";
const DIR_NAME: &str = ".wajik";
const FILE_NAME: &str = "config.yaml";

const DEFAULT_HTTP_PORT: u16 = 3001;
const DEFAULT_BASE_URL: &str = "localhost";
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load WajikAnime configuration"));
}

/// Returns the process configuration, loading it on first access
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merged configuration tree and the file it is persisted to
///
/// Every setter saves the whole tree.
#[derive(Debug)]
pub struct Config {
    dir: PathBuf,
    file: PathBuf,
    tree: Mutex<Value>,
}

impl Config {
    /// Picks the configuration directory, creating it when needed
    ///
    /// Candidates, first match wins: `directory` when not empty, then
    /// `$WAJIK_CONFIG`, then an existing `./.wajik`, then an existing
    /// `~/.wajik`, and finally `./.wajik`.
    pub fn config_dir(directory: &str) -> Result<PathBuf> {
        let explicit = Some(directory.to_string()).filter(|d| !d.is_empty());
        let from_env = env::var(DIR_ENV_VAR).ok().filter(|d| !d.is_empty());
        let local = Some(PathBuf::from(DIR_NAME)).filter(|p| p.is_dir());
        let home = dirs::home_dir()
            .map(|home| home.join(DIR_NAME))
            .filter(|p| p.is_dir());

        let dir = explicit
            .or(from_env)
            .map(PathBuf::from)
            .or(local)
            .or(home)
            .unwrap_or_else(|| PathBuf::from(DIR_NAME));

        ensure_writable_dir(&dir)?;
        Ok(dir)
    }

    /// Loads, merges and saves the configuration of `directory`
    ///
    /// An empty `directory` runs the lookup of [`Config::config_dir`].
    pub fn load_config(directory: &str) -> Result<Self> {
        let dir = Self::config_dir(directory)?;
        let file = dir.join(FILE_NAME);
        info!(config_dir = %dir.display(), "Using config directory");

        let mut tree: Value = serde_yaml::from_str(EMBEDDED_DEFAULTS)?;
        match fs::read_to_string(&file) {
            Ok(text) => {
                let user: Value = serde_yaml::from_str(&text)
                    .with_context(|| format!("Invalid YAML in {}", file.display()))?;
                merge(&mut tree, lowercase_keys(user));
                info!(config_file = %file.display(), "Loaded config file");
            }
            Err(_) => info!(config_file = %file.display(), "No config file, using defaults"),
        }
        let mut tree = lowercase_keys(tree);

        for (path, value) in overrides(env::vars()) {
            let keys: Vec<&str> = path.iter().map(String::as_str).collect();
            if let Err(e) = assign(&mut tree, &keys, value) {
                warn!("Ignoring {}{}: {}", OVERRIDE_PREFIX, path.join("__"), e);
            }
        }

        let config = Config {
            dir,
            file,
            tree: Mutex::new(tree),
        };
        config.save()?;
        Ok(config)
    }

    fn tree(&self) -> Result<MutexGuard<'_, Value>> {
        self.tree
            .lock()
            .map_err(|_| anyhow!("configuration lock poisoned"))
    }

    /// Directory holding `config.yaml`
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the current tree to `config.yaml`
    pub fn save(&self) -> Result<()> {
        let text = serde_yaml::to_string(&*self.tree()?)?;
        fs::write(&self.file, text)
            .with_context(|| format!("Cannot write {}", self.file.display()))
    }

    /// Sets the value at `path` (e.g. `&["host", "http_port"]`) and saves
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        assign(&mut *self.tree()?, path, value)?;
        self.save()
    }

    /// Value at `path`; fails when a key is missing
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        lookup(&*self.tree()?, path).cloned()
    }

    /// Value at `path` parsed from a number or a string
    fn get_parsed<T: FromStr>(&self, path: &[&str]) -> Option<T> {
        match self.get_value(path).ok()? {
            Value::Number(n) => n.to_string().parse().ok(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Unsigned integer at `path`, or `default`
    ///
    /// Numbers given as strings (typical of environment overrides) are accepted.
    pub fn get_u64_or(&self, path: &[&str], default: u64) -> u64 {
        self.get_parsed(path).unwrap_or(default)
    }

    /// Non-empty string at `path`, or `default`
    pub fn get_string_or(&self, path: &[&str], default: &str) -> String {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => default.to_string(),
        }
    }

    /// Host name the server advertises in its logs
    pub fn get_base_url(&self) -> String {
        self.get_string_or(&["host", "base_url"], DEFAULT_BASE_URL)
    }

    /// HTTP port, 3001 when missing or out of range
    pub fn get_http_port(&self) -> u16 {
        self.get_parsed(&["host", "http_port"]).unwrap_or_else(|| {
            warn!("No valid host.http_port, using {}", DEFAULT_HTTP_PORT);
            DEFAULT_HTTP_PORT
        })
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }

    /// Whether logs go to the console (default `true`)
    pub fn get_log_enable_console(&self) -> Result<bool> {
        match self.get_value(&["host", "logger", "enable_console"]) {
            Ok(Value::Bool(enabled)) => Ok(enabled),
            _ => Ok(true),
        }
    }

    pub fn set_log_enable_console(&self, enabled: bool) -> Result<()> {
        self.set_value(&["host", "logger", "enable_console"], Value::Bool(enabled))
    }

    /// Minimum log level (`TRACE`, `DEBUG`, `INFO`, `WARN`, `ERROR`)
    pub fn get_log_min_level(&self) -> Result<String> {
        Ok(self.get_string_or(&["host", "logger", "min_level"], DEFAULT_LOG_MIN_LEVEL))
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }
}

fn ensure_writable_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    if !dir.is_dir() {
        return Err(anyhow!("{} is not a directory", dir.display()));
    }
    let probe = dir.join(".write_test");
    fs::write(&probe, b"")
        .and_then(|_| fs::remove_file(&probe))
        .with_context(|| format!("{} is not writable", dir.display()))
}

fn key(name: &str) -> Value {
    Value::String(name.to_lowercase())
}

fn lookup<'a>(tree: &'a Value, path: &[&str]) -> Result<&'a Value> {
    path.iter().enumerate().try_fold(tree, |node, (depth, name)| {
        node.as_mapping()
            .and_then(|map| map.get(key(name)))
            .ok_or_else(|| anyhow!("Path {} does not exist", path[..=depth].join(".")))
    })
}

/// Sets `path` in `tree`, creating intermediate mappings
fn assign(tree: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *tree = value;
        return Ok(());
    };

    let mut node = tree;
    for name in parents {
        let map = node
            .as_mapping_mut()
            .ok_or_else(|| anyhow!("{} is under a scalar", path.join(".")))?;
        node = map
            .entry(key(name))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }
    node.as_mapping_mut()
        .ok_or_else(|| anyhow!("{} is under a scalar", path.join(".")))?
        .insert(key(last), value);
    Ok(())
}

/// Deep merge: mappings key by key, anything else replaced
fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Mapping(base), Value::Mapping(layer)) => {
            for (k, v) in layer {
                match base.get_mut(&k) {
                    Some(existing) => merge(existing, v),
                    None => {
                        base.insert(k, v);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lowercase_keys(v))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// `WAJIK_CONFIG__A__B=value` pairs as (`["a", "b"]`, parsed value)
///
/// Values are read as YAML scalars (`42`, `true`), plain strings otherwise.
fn overrides(
    vars: impl Iterator<Item = (String, String)>,
) -> Vec<(Vec<String>, Value)> {
    vars.filter_map(|(name, raw)| {
        let path = name.strip_prefix(OVERRIDE_PREFIX)?;
        let keys: Vec<String> = path.split("__").map(str::to_lowercase).collect();
        if keys.iter().any(String::is_empty) {
            return None;
        }
        let value = serde_yaml::from_str(&raw).unwrap_or(Value::String(raw));
        Some((keys, value))
    })
    .collect()
}
