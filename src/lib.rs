//! TOM Alerts Dash - pluggable alert broker browser
//!
//! Browse astronomical alert brokers (MARS, ALeRCE, SCIMMA) through one
//! interactive surface and turn selected alerts into persisted targets.
//!
//! ## Flow
//! Selection -> Registry -> Binding Controller -> Validation -> Adapter query
//! -> Row flattening -> Table -> "create targets" -> host persistence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tom_alerts_dash::{BindingController, BrokerRegistry, DashConfig, InMemoryTargetStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DashConfig::load()?;
//! let registry = BrokerRegistry::from_config(&config)?;
//! let mut dash = BindingController::new(&registry, Arc::new(InMemoryTargetStore::new()));
//! let _ = dash.select_broker("MARS", None);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Settings: YAML file + environment overrides
pub mod config;

// Broker-agnostic adapter contract, rows, filters, validation
pub mod alerts;

// Built-in brokers and the registry
pub mod brokers;

// Reactive binding layer
pub mod dash;

// HTTP surface (browse/list pages + JSON API)
#[cfg(feature = "server")]
pub mod api;

pub use alerts::{
    BrokerAdapter, Cell, DisplayRow, FilterValues, InMemoryTargetStore, RawAlert, Target,
    TargetCreator, TargetDraft, Update, ValidationMessage,
};
pub use brokers::{BrokerKind, BrokerRegistry};
pub use config::DashConfig;
pub use dash::{BindingController, QueryRequest, SessionStore};
pub use error::{ConfigError, DashError, DashResult, QueryError, TargetError};
