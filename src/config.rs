// Layered configuration: built-in defaults, then an optional TOML file,
// then `RENEWABLES_*` environment variables (nested keys split on `__`).
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
const DEFAULT_CONFIG_FILE: &str = "renewables.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    File,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Header names of the four columns the parser needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub country: String,
    pub year: String,
    pub code: String,
    pub share: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub ttl_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub sources: Vec<SourceConfig>,
    pub http: HttpConfig,
    pub columns: ColumnConfig,
    pub cache: CacheConfig,
    pub output_dir: PathBuf,
    pub top_count: usize,
    pub major_countries: Vec<String>,
    pub regions: BTreeMap<String, Vec<String>>,
}

impl AppConfig {
    /// Load the configuration used by the CLI.
    ///
    /// The file layer is read from `RENEWABLES_CONFIG` when set, otherwise
    /// from `renewables.toml` in the working directory; a missing file is
    /// not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("RENEWABLES_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::file(path))
            .merge(Env::prefixed("RENEWABLES_").split("__"));
        Self::extract(figment)
    }

    /// Defaults overlaid with a TOML snippet, without touching the
    /// environment or the file system.
    #[cfg(test)]
    pub fn from_toml_str(overrides: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::string(overrides));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Extract(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(invalid("sources", "at least one source is required"));
        }
        if let Some(src) = self.sources.iter().find(|s| s.location.trim().is_empty()) {
            return Err(invalid(
                "sources",
                &format!("{:?} source has an empty location", src.kind),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs", "must be greater than zero"));
        }
        if self.cache.ttl_hours == 0 {
            return Err(invalid("cache.ttl_hours", "must be greater than zero"));
        }
        if self.top_count == 0 {
            return Err(invalid("top_count", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}
