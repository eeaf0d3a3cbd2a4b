//! Broker-agnostic alert model
//!
//! The adapter contract and everything it is built from: filter declarations,
//! validation rules, trigger gating, flat display rows and the host target
//! seam. Concrete brokers live in [`crate::brokers`].

pub mod adapter;
pub mod fetch;
pub mod filters;
pub mod format;
pub mod row;
pub mod targets;
pub mod trigger;
pub mod validation;

pub use adapter::{BrokerAdapter, ColumnType, Presentation, ResultColumn, ResultColumnSpecification};
pub use fetch::{AlertFetcher, FetchRequest, HttpAlertFetcher};
pub use filters::{FilterInput, FilterSpecification, FilterValues, InputKind};
pub use row::{Cell, DisplayRow, RawAlert, ALERT_KEY};
pub use targets::{InMemoryTargetStore, Target, TargetCreator, TargetDraft, TargetType};
pub use trigger::{QueryState, TriggerGate, Update};
pub use validation::{MessageScope, Severity, ValidationMessage};
