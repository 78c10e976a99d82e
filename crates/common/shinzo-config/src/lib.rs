use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the SDK's own collection namespace.
pub const COLLECTION_NAME: &str = "shinzo";

/// Listen address used when none is configured.
pub const DEFAULT_LISTEN_ADDRESS: &str = "/ip4/127.0.0.1/tcp/9171";

/// Environment variable overriding `defradb.keyring_secret`.
pub const ENV_KEYRING_SECRET: &str = "DEFRA_KEYRING_SECRET";

/// Environment variable overriding `defradb.url`.
pub const ENV_DEFRA_URL: &str = "DEFRA_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub defradb: DefraDbConfig,
    #[serde(default)]
    pub shinzo: ShinzoConfig,
    #[serde(default)]
    pub logger: LoggerConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DefraDbConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub keyring_secret: String,
    #[serde(default)]
    pub p2p: P2pConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct P2pConfig {
    /// Peers in `<multiaddr>/p2p/<peer id>` form
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ShinzoConfig {
    /// Minimum number of unique attestations a document needs. Kept as text so an
    /// unset or malformed value simply disables filtering.
    #[serde(default)]
    pub minimum_attestations: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoggerConfig {
    #[serde(default)]
    pub development: bool,
}

fn default_url() -> String {
    "http://localhost:9181".to_string()
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".defra")
}

impl Default for DefraDbConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            keyring_secret: String::new(),
            p2p: P2pConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for P2pConfig {
    fn default() -> Self {
        Self {
            bootstrap_peers: Vec::new(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured attestation threshold. Empty or unparsable values yield 0, which
    /// disables attestation filtering.
    pub fn minimum_attestations(&self) -> u32 {
        self.shinzo.minimum_attestations.trim().parse().unwrap_or(0)
    }

    /// Overwrite fields from environment-style lookups. Unset or empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_KEYRING_SECRET).filter(|v| !v.is_empty()) {
            self.defradb.keyring_secret = secret;
        }
        if let Some(url) = lookup(ENV_DEFRA_URL).filter(|v| !v.is_empty()) {
            self.defradb.url = url;
        }
    }
}

/// Load a TOML config file and apply `DEFRA_KEYRING_SECRET` / `DEFRA_URL` from the environment.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = Config::from_toml_str(&content, path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}
