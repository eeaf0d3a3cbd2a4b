//! Alert browser configuration
//!
//! Loads `DashConfig` from an optional YAML file and environment overrides.
//!
//! Resolution order:
//! 1. Built-in defaults
//! 2. YAML file named by `TOM_ALERTS_DASH_CONFIG` (or passed explicitly)
//! 3. Environment variables (`TOM_ALERT_DASH_CLASSES`, `MARS_URL`, ...)

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alerts::fetch::DEFAULT_TIMEOUT_SECS;
use crate::alerts::filters::DEFAULT_PAGE_SIZE;
use crate::brokers::alerce::{ClassTaxonomy, ClassifierPrecedence, ALERCE_API_URL, ALERCE_URL};
use crate::brokers::mars::MARS_URL;
use crate::brokers::scimma::{DEFAULT_SCIMMA_TOPIC, SCIMMA_URL};
use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "TOM_ALERTS_DASH_CONFIG";
pub const ALERT_CLASSES_ENV: &str = "TOM_ALERT_DASH_CLASSES";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Adapter identifiers in display order; `None` selects the default set.
    pub alert_classes: Option<Vec<String>>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub bind_addr: String,
    /// Prefix for links to created targets, e.g. `/targets/`.
    pub target_url_prefix: Option<String>,
    pub brokers: BrokerSettings,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            alert_classes: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            bind_addr: "127.0.0.1:8000".to_string(),
            target_url_prefix: Some("/targets/".to_string()),
            brokers: BrokerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    pub mars: MarsSettings,
    pub alerce: AlerceSettings,
    pub scimma: ScimmaSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarsSettings {
    pub base_url: String,
}

impl Default for MarsSettings {
    fn default() -> Self {
        Self {
            base_url: MARS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlerceSettings {
    /// Web front end, used for object links.
    pub web_url: String,
    /// Object search endpoint.
    pub api_url: String,
    pub classifier_precedence: ClassifierPrecedence,
    pub taxonomy: ClassTaxonomy,
}

impl Default for AlerceSettings {
    fn default() -> Self {
        Self {
            web_url: ALERCE_URL.to_string(),
            api_url: ALERCE_API_URL.to_string(),
            classifier_precedence: ClassifierPrecedence::default(),
            taxonomy: ClassTaxonomy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScimmaSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Topic id sent with every query; `None` leaves it out.
    pub topic: Option<u32>,
}

impl Default for ScimmaSettings {
    fn default() -> Self {
        Self {
            api_url: SCIMMA_URL.to_string(),
            api_key: None,
            topic: Some(DEFAULT_SCIMMA_TOPIC),
        }
    }
}

impl DashConfig {
    /// Defaults + `TOM_ALERTS_DASH_CONFIG` file + environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Explicit file + environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        info!(path = %path.display(), "loaded alerts dash config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply environment-style overrides through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(classes) = lookup(ALERT_CLASSES_ENV) {
            self.alert_classes = Some(
                classes
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        if let Some(size) = lookup("TOM_ALERTS_DASH_PAGE_SIZE") {
            self.page_size = parse_positive("TOM_ALERTS_DASH_PAGE_SIZE", &size)?;
        }
        if let Some(bind) = lookup("TOM_ALERTS_DASH_BIND") {
            self.bind_addr = bind;
        }
        if let Some(url) = lookup("MARS_URL") {
            self.brokers.mars.base_url = url;
        }
        if let Some(url) = lookup("ALERCE_URL") {
            self.brokers.alerce.web_url = url;
        }
        if let Some(url) = lookup("ALERCE_API_URL") {
            self.brokers.alerce.api_url = url;
        }
        if let Some(url) = lookup("SCIMMA_URL") {
            self.brokers.scimma.api_url = url;
        }
        if let Some(key) = lookup("SCIMMA_API_KEY") {
            self.brokers.scimma.api_key = Some(key);
        }
        Ok(())
    }

    /// Configured identifiers, if any were given.
    pub fn alert_classes(&self) -> Option<&[String]> {
        self.alert_classes.as_deref()
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a positive integer, got '{}'", value),
        }),
    }
}
