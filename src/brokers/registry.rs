//! Broker registry
//!
//! Built once at process start from the configured identifier list. Each entry
//! maps an adapter's declared name to a factory producing fresh instances, so
//! every UI session can own its adapters and their trigger state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::alerce::{AlerceAdapter, ALERCE_NAME};
use super::mars::{MarsAdapter, MARS_NAME};
use super::scimma::{ScimmaAdapter, SCIMMA_NAME};
use crate::alerts::adapter::BrokerAdapter;
use crate::alerts::fetch::{AlertFetcher, HttpAlertFetcher};
use crate::config::DashConfig;
use crate::error::ConfigError;

/// Builds a new adapter instance.
pub type AdapterFactory = Arc<dyn Fn() -> Box<dyn BrokerAdapter> + Send + Sync>;

/// Adapters shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrokerKind {
    Mars,
    Alerce,
    Scimma,
}

impl BrokerKind {
    /// Used when no identifiers are configured.
    pub const DEFAULT: [BrokerKind; 2] = [BrokerKind::Mars, BrokerKind::Alerce];

    pub const ALL: [BrokerKind; 3] = [BrokerKind::Mars, BrokerKind::Alerce, BrokerKind::Scimma];

    /// The adapter's declared name.
    pub fn name(&self) -> &'static str {
        match self {
            BrokerKind::Mars => MARS_NAME,
            BrokerKind::Alerce => ALERCE_NAME,
            BrokerKind::Scimma => SCIMMA_NAME,
        }
    }

    /// Resolve a configured identifier.
    ///
    /// Accepts the declared name (`ALeRCE`), a short alias (`alerce`) or a
    /// dotted adapter path (`tom_alerts_dash.brokers.alerce.ALeRCEDashBroker`),
    /// all case-insensitively.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let last = identifier.trim().rsplit('.').next()?.to_ascii_lowercase();
        let stem = ["dashbroker", "broker", "adapter"]
            .iter()
            .find_map(|suffix| last.strip_suffix(suffix))
            .unwrap_or(last.as_str());

        BrokerKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(stem))
    }

    /// Resolve the configured list, or the default set when unconfigured.
    pub fn resolve_all(identifiers: Option<&[String]>) -> Result<Vec<Self>, ConfigError> {
        let Some(identifiers) = identifiers else {
            return Ok(Self::DEFAULT.to_vec());
        };
        identifiers.iter().map(|id| id.parse()).collect()
    }
}

impl FromStr for BrokerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s).ok_or_else(|| ConfigError::UnresolvableAdapter {
            identifier: s.to_string(),
        })
    }
}

impl fmt::Display for BrokerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One registered adapter.
#[derive(Clone)]
pub struct RegistryEntry {
    pub name: String,
    factory: AdapterFactory,
}

impl RegistryEntry {
    pub fn instantiate(&self) -> Box<dyn BrokerAdapter> {
        (self.factory)()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Name → factory mapping, in display order.
#[derive(Debug, Clone, Default)]
pub struct BrokerRegistry {
    entries: Vec<RegistryEntry>,
}

impl BrokerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for the configured brokers, talking HTTP.
    ///
    /// Every broker gets its own client so the SCIMMA API key never reaches
    /// another service.
    pub fn from_config(config: &DashConfig) -> Result<Self, ConfigError> {
        let kinds = BrokerKind::resolve_all(config.alert_classes())?;
        let mut registry = Self::new();

        for kind in kinds {
            let fetcher = HttpAlertFetcher::new(config.request_timeout_secs).map_err(|e| {
                ConfigError::Client {
                    broker: kind.name().to_string(),
                    message: format!("{:#}", e),
                }
            })?;
            let fetcher = match kind {
                BrokerKind::Scimma => {
                    fetcher.with_api_key(config.brokers.scimma.api_key.clone())
                }
                _ => fetcher,
            };
            registry.register_kind(kind, config, Arc::new(fetcher))?;
        }

        tracing::info!(brokers = ?registry.names(), "broker registry ready");
        Ok(registry)
    }

    /// Registry for the configured brokers sharing one fetcher.
    pub fn with_fetcher(
        config: &DashConfig,
        fetcher: Arc<dyn AlertFetcher>,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for kind in BrokerKind::resolve_all(config.alert_classes())? {
            registry.register_kind(kind, config, fetcher.clone())?;
        }
        Ok(registry)
    }

    /// Register a built-in adapter.
    pub fn register_kind(
        &mut self,
        kind: BrokerKind,
        config: &DashConfig,
        fetcher: Arc<dyn AlertFetcher>,
    ) -> Result<(), ConfigError> {
        let page_size = config.page_size;
        let factory: AdapterFactory = match kind {
            BrokerKind::Mars => {
                let settings = config.brokers.mars.clone();
                Arc::new(move || {
                    Box::new(MarsAdapter::new(&settings, page_size, fetcher.clone()))
                        as Box<dyn BrokerAdapter>
                })
            }
            BrokerKind::Alerce => {
                let settings = config.brokers.alerce.clone();
                Arc::new(move || {
                    Box::new(AlerceAdapter::new(&settings, page_size, fetcher.clone()))
                        as Box<dyn BrokerAdapter>
                })
            }
            BrokerKind::Scimma => {
                let settings = config.brokers.scimma.clone();
                Arc::new(move || {
                    Box::new(ScimmaAdapter::new(&settings, page_size, fetcher.clone()))
                        as Box<dyn BrokerAdapter>
                })
            }
        };
        self.register(kind.name(), factory)
    }

    /// Register an adapter under its declared name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: AdapterFactory,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.entries.iter().any(|e| e.name == name) {
            return Err(ConfigError::DuplicateBroker { name });
        }
        tracing::debug!(broker = %name, "registered broker adapter");
        self.entries.push(RegistryEntry { name, factory });
        Ok(())
    }

    /// All registered adapters, in configured order.
    pub fn list_adapters(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Lookup by declared name.
    pub fn get_adapter(&self, name: &str) -> Result<&RegistryEntry, ConfigError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| ConfigError::BrokerNotFound {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
