//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Secrets are read from the environment only and never appear in TOML.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable overriding the listen address
pub const ENV_BIND: &str = "TUNEFIND_BIND";
/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "TUNEFIND_PORT";
/// Environment variable overriding the upstream timeout in seconds
pub const ENV_UPSTREAM_TIMEOUT: &str = "TUNEFIND_UPSTREAM_TIMEOUT_SECS";

pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_LLM_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";

/// Compiled defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind: String,
    pub port: u16,
    pub upstream_timeout_secs: u64,
    pub log_level: String,
    pub llm_model: String,
    pub upstream: UpstreamUrls,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            upstream_timeout_secs: 10,
            log_level: "info".to_string(),
            llm_model: "gpt-4".to_string(),
            upstream: UpstreamUrls::default(),
        }
    }
}

/// Upstream endpoints the proxy forwards to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamUrls {
    /// Music catalog API base (relative paths are appended)
    pub catalog_base_url: String,
    /// Client-credentials token endpoint
    pub token_url: String,
    /// Lyrics lookup base (`/{artist}/{title}` is appended)
    pub lyrics_base_url: String,
    /// News search endpoint
    pub news_url: String,
    /// Chat completion endpoint
    pub llm_url: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            catalog_base_url: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            lyrics_base_url: "https://api.lyrics.ovh/v1".to_string(),
            news_url: "https://newsapi.org/v2/everything".to_string(),
            llm_url: "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (e.g. "info", "tunefind_proxy=debug")
    pub level: Option<String>,
}

/// `[upstream]` section of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamToml {
    pub catalog_base_url: Option<String>,
    pub token_url: Option<String>,
    pub lyrics_base_url: Option<String>,
    pub news_url: Option<String>,
    pub llm_url: Option<String>,
}

/// TOML configuration file contents
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub upstream_timeout_secs: Option<u64>,
    pub llm_model: Option<String>,
    #[serde(default)]
    pub proxy_allowed_prefixes: Vec<String>,
    #[serde(default)]
    pub upstream: UpstreamToml,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load a TOML file
    ///
    /// A missing or unreadable file yields `Ok(None)` (unreadable files are
    /// logged at warn). A file that is read but cannot be parsed is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!("Cannot read config file {}: {}, using defaults", path.display(), e);
                return Ok(None);
            }
        };
        Self::parse(&content).map(Some)
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub log_level: String,
    pub llm_model: String,
    pub proxy_allowed_prefixes: Vec<String>,
    pub upstream: UpstreamUrls,
}

impl ServiceConfig {
    /// `host:port` string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ConfigResolver::merge(&CliOverrides::default(), &EnvOverrides::default(), TomlConfig::default())
    }
}

/// Values read from `TUNEFIND_*` environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub upstream_timeout_secs: Option<u64>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind: non_empty_var(ENV_BIND),
            port: parse_var(ENV_PORT)?,
            upstream_timeout_secs: parse_var(ENV_UPSTREAM_TIMEOUT)?,
        })
    }
}

/// Resolves [`ServiceConfig`] from all configuration tiers
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Resolve configuration for this process
    pub fn resolve(&self, cli: &CliOverrides) -> Result<ServiceConfig> {
        let toml = self.load_toml(cli)?;
        let env = EnvOverrides::from_env()?;
        let config = Self::merge(cli, &env, toml);

        debug!(
            module = %self.module_name,
            listen = %config.listen_addr(),
            timeout_secs = config.upstream_timeout.as_secs(),
            "Configuration resolved"
        );
        Ok(config)
    }

    fn load_toml(&self, cli: &CliOverrides) -> Result<TomlConfig> {
        if let Some(path) = &cli.config_path {
            return match TomlConfig::load(path)? {
                Some(config) => {
                    info!("Loaded config file: {}", path.display());
                    Ok(config)
                }
                None => {
                    warn!(
                        module = %self.module_name,
                        "Config file {} not loaded, using defaults",
                        path.display()
                    );
                    Ok(TomlConfig::default())
                }
            };
        }

        let Some(path) = default_config_path() else {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        };

        match TomlConfig::load(&path)? {
            Some(config) => {
                info!("Loaded config file: {}", path.display());
                Ok(config)
            }
            None => {
                debug!(
                    module = %self.module_name,
                    "No config file at {}, using defaults",
                    path.display()
                );
                Ok(TomlConfig::default())
            }
        }
    }

    /// Merge tiers: CLI → ENV → TOML → compiled default
    pub fn merge(cli: &CliOverrides, env: &EnvOverrides, toml: TomlConfig) -> ServiceConfig {
        let defaults = CompiledDefaults::default();
        let upstream = toml.upstream;

        ServiceConfig {
            bind: cli
                .bind
                .clone()
                .or_else(|| env.bind.clone())
                .or(toml.bind)
                .unwrap_or(defaults.bind),
            port: cli.port.or(env.port).or(toml.port).unwrap_or(defaults.port),
            upstream_timeout: Duration::from_secs(
                env.upstream_timeout_secs
                    .or(toml.upstream_timeout_secs)
                    .unwrap_or(defaults.upstream_timeout_secs),
            ),
            log_level: toml.logging.level.unwrap_or(defaults.log_level),
            llm_model: toml.llm_model.unwrap_or(defaults.llm_model),
            proxy_allowed_prefixes: toml.proxy_allowed_prefixes,
            upstream: UpstreamUrls {
                catalog_base_url: upstream
                    .catalog_base_url
                    .unwrap_or(defaults.upstream.catalog_base_url),
                token_url: upstream.token_url.unwrap_or(defaults.upstream.token_url),
                lyrics_base_url: upstream
                    .lyrics_base_url
                    .unwrap_or(defaults.upstream.lyrics_base_url),
                news_url: upstream.news_url.unwrap_or(defaults.upstream.news_url),
                llm_url: upstream.llm_url.unwrap_or(defaults.upstream.llm_url),
            },
        }
    }
}

/// Default config file location: `<config_dir>/tunefind/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunefind").join("config.toml"))
}

/// Upstream credentials
///
/// The catalog client id/secret are mandatory; the LLM and news keys only
/// gate their own routes.
#[derive(Clone)]
pub struct Secrets {
    pub client_id: String,
    pub client_secret: String,
    pub llm_api_key: Option<String>,
    pub news_api_key: Option<String>,
}

impl Secrets {
    /// Read secrets from the environment, failing if client credentials are absent
    pub fn from_env() -> Result<Self> {
        let client_id = non_empty_var(ENV_CLIENT_ID).ok_or(Error::MissingSecret(ENV_CLIENT_ID))?;
        let client_secret =
            non_empty_var(ENV_CLIENT_SECRET).ok_or(Error::MissingSecret(ENV_CLIENT_SECRET))?;

        let llm_api_key = non_empty_var(ENV_LLM_API_KEY);
        if llm_api_key.is_none() {
            warn!("{} not set, /api/explain-lyric will be unavailable", ENV_LLM_API_KEY);
        }
        let news_api_key = non_empty_var(ENV_NEWS_API_KEY);
        if news_api_key.is_none() {
            warn!("{} not set, /api/music-news will be unavailable", ENV_NEWS_API_KEY);
        }

        Ok(Self {
            client_id,
            client_secret,
            llm_api_key,
            news_api_key,
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<redacted>"))
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validate a key value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has invalid value: {}", name, raw))),
        None => Ok(None),
    }
}
