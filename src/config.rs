use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the MixMatch client
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MixMatchConfig {
    /// Server location
    pub server: ServerConfig,
    /// HTTP client behaviour
    pub http: HttpConfig,
    /// Gallery paging
    pub catalog: CatalogConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL every endpoint and media path is joined onto
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout, 0 disables it
    pub timeout_seconds: u64,
    /// Sustained outbound request rate
    pub requests_per_second: u32,
    /// Burst capacity above the sustained rate
    pub burst: u32,
    /// Characters of an error body surfaced to the user
    pub body_prefix_len: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Items requested per page
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level / EnvFilter directive
    pub log_level: String,
    /// Emit JSON lines instead of compact text
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            requests_per_second: 10,
            burst: 10,
            body_prefix_len: crate::http::errors::DEFAULT_BODY_PREFIX_LEN,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { page_size: 60 }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

impl Default for MixMatchConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            http: HttpConfig::default(),
            catalog: CatalogConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl MixMatchConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (mixmatch.toml, .mixmatch-rc)
    /// 3. Environment variables (prefixed with MIXMATCH_, `__` between sections)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`MixMatchConfig::load`], looking for files under `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_path = dir.join("mixmatch.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".mixmatch-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("MIXMATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut mixmatch_config: MixMatchConfig = builder.build()?.try_deserialize()?;

        // The mobile build reads its base URL from these
        if let Ok(base) = std::env::var("MIXMATCH_API_BASE") {
            mixmatch_config.server.base_url = base;
        } else if let Ok(base) = std::env::var("EXPO_PUBLIC_API_BASE") {
            mixmatch_config.server.base_url = base;
        }

        mixmatch_config.validate()?;
        Ok(mixmatch_config)
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.server.base_url.trim();
        if base.is_empty() {
            bail!("server.base_url must not be empty");
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            bail!("server.base_url must start with http:// or https://, got {base}");
        }
        if self.catalog.page_size == 0 {
            bail!("catalog.page_size must be greater than zero");
        }
        if self.http.requests_per_second == 0 {
            bail!("http.requests_per_second must be greater than zero");
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
