//! Host target schema and the persistence seam
//!
//! Adapters map their payloads into a [`TargetDraft`]; the host platform owns
//! the actual persistence behind [`TargetCreator`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::TargetError;

/// Standard epoch for sidereal coordinates.
pub const J2000: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetType {
    Sidereal,
    NonSidereal,
}

/// Generic target fields an adapter fills from an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDraft {
    pub name: String,
    pub target_type: TargetType,
    pub ra: f64,
    pub dec: f64,
    pub epoch: f64,
    /// Broker-specific extras (source broker, classification, ...).
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl TargetDraft {
    pub fn sidereal(name: impl Into<String>, ra: f64, dec: f64) -> Self {
        Self {
            name: name.into(),
            target_type: TargetType::Sidereal,
            ra,
            dec,
            epoch: J2000,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// A target persisted by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    pub name: String,
    pub target_type: TargetType,
    pub ra: f64,
    pub dec: f64,
    pub epoch: f64,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

/// Host-supplied "create persisted target" operation.
#[async_trait]
pub trait TargetCreator: Send + Sync {
    async fn create_target(&self, draft: TargetDraft) -> Result<Target, TargetError>;

    /// Link to the created target's page, when the host has one.
    fn target_url(&self, _target: &Target) -> Option<String> {
        None
    }
}

/// Process-local target store, used by the bundled server and tests.
pub struct InMemoryTargetStore {
    targets: RwLock<Vec<Target>>,
    next_id: AtomicU64,
    url_prefix: Option<String>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self {
            targets: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            url_prefix: None,
        }
    }

    /// Link created targets as `{prefix}{id}/`.
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    pub async fn list(&self) -> Vec<Target> {
        self.targets.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.targets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryTargetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetCreator for InMemoryTargetStore {
    async fn create_target(&self, draft: TargetDraft) -> Result<Target, TargetError> {
        let mut targets = self.targets.write().await;
        if targets.iter().any(|t| t.name == draft.name) {
            return Err(TargetError::Rejected {
                name: draft.name,
                reason: "a target with this name already exists".to_string(),
            });
        }

        let target = Target {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: draft.name,
            target_type: draft.target_type,
            ra: draft.ra,
            dec: draft.dec,
            epoch: draft.epoch,
            extra: draft.extra,
            created_at: Utc::now(),
        };
        tracing::info!(target_id = target.id, name = %target.name, "created target");
        targets.push(target.clone());
        Ok(target)
    }

    fn target_url(&self, target: &Target) -> Option<String> {
        self.url_prefix
            .as_ref()
            .map(|prefix| format!("{}{}/", prefix, target.id))
    }
}
