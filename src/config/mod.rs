//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::core::error::ConfigError;
use crate::core::localized::{DEFAULT_LOCALE, SUPPORTED_LANGUAGES, is_language_tag};

/// Upper bound for `perPage`, whatever the configuration says
pub const PER_PAGE_LIMIT: usize = 1000;

/// Listening address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: true,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Page size defaults for list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 20,
            max_per_page: PER_PAGE_LIMIT,
        }
    }
}

/// Languages localized fields are read and searched in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    pub default_locale: String,
    pub supported_languages: Vec<String>,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            supported_languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Filter compilation policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringConfig {
    /// Reject comparison literals that cannot be converted to the field
    /// type instead of ignoring the clause
    pub strict_literals: bool,
}

/// Cache lifetimes and the invalidation relation map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Sliding expiration; the absolute expiration is `ttl * 4 / 3`
    pub ttl_secs: u64,

    /// Period of the cache maintenance task
    pub sweep_interval_secs: u64,

    /// Entry capacity; least useful entries are evicted past it
    pub max_entries: u64,

    /// Follow the relation map past the first hop when invalidating
    pub transitive_relations: bool,

    /// Owner group → groups whose cached values embed the owner's data
    pub relations: HashMap<String, Vec<String>>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 45 * 60,
            sweep_interval_secs: 60,
            max_entries: 10_000,
            transitive_relations: false,
            relations: HashMap::new(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Declare that `dependent`'s cached values embed `owner`'s data
    pub fn relate(mut self, owner: impl Into<String>, dependent: impl Into<String>) -> Self {
        let dependents = self.relations.entry(owner.into()).or_default();
        let dependent = dependent.into();
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
        self
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub localization: LocalizationConfig,
    pub filtering: FilteringConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if pagination.max_per_page == 0 || pagination.max_per_page > PER_PAGE_LIMIT {
            return Err(invalid(
                "pagination.max_per_page",
                pagination.max_per_page,
                format!("must be between 1 and {}", PER_PAGE_LIMIT),
            ));
        }
        if pagination.default_per_page == 0 || pagination.default_per_page > pagination.max_per_page
        {
            return Err(invalid(
                "pagination.default_per_page",
                pagination.default_per_page,
                "must be between 1 and max_per_page",
            ));
        }

        let localization = &self.localization;
        if let Some(tag) = localization
            .supported_languages
            .iter()
            .find(|tag| !is_language_tag(tag))
        {
            return Err(invalid(
                "localization.supported_languages",
                tag,
                "not a language tag",
            ));
        }
        if !is_language_tag(&localization.default_locale) {
            return Err(invalid(
                "localization.default_locale",
                &localization.default_locale,
                "not a language tag",
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(invalid("cache.ttl_secs", 0, "must be positive"));
        }
        if self.cache.max_entries == 0 {
            return Err(invalid("cache.max_entries", 0, "must be positive"));
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(invalid("cache.sweep_interval_secs", 0, "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
}
