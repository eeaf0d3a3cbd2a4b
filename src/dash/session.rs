//! Per-session controllers
//!
//! Each browser session owns a [`BindingController`] behind its own mutex, so
//! handlers on one session run one at a time while sessions stay independent.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::controller::BindingController;
use crate::alerts::targets::TargetCreator;
use crate::brokers::registry::BrokerRegistry;

pub type SharedController = Arc<Mutex<BindingController>>;

pub struct SessionStore {
    registry: Arc<BrokerRegistry>,
    host: Arc<dyn TargetCreator>,
    sessions: RwLock<HashMap<Uuid, SharedController>>,
}

impl SessionStore {
    pub fn new(registry: Arc<BrokerRegistry>, host: Arc<dyn TargetCreator>) -> Self {
        Self {
            registry,
            host,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &BrokerRegistry {
        &self.registry
    }

    /// Start a session with freshly instantiated adapters.
    pub async fn create(&self) -> (Uuid, SharedController) {
        let id = Uuid::new_v4();
        let controller = Arc::new(Mutex::new(BindingController::new(
            &self.registry,
            self.host.clone(),
        )));
        self.sessions.write().await.insert(id, controller.clone());
        tracing::info!(session_id = %id, "created alerts session");
        (id, controller)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedController> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "ended alerts session");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
