//! Reactive binding controller
//!
//! One controller per UI session. Every registered broker gets a panel at
//! construction time; the panel set and each panel's wiring never change
//! afterwards. A single active-broker value decides which panel is shown.

use std::sync::Arc;

use serde::Serialize;

use super::panel::{BrokerPanel, PanelUpdate, QueryRequest};
use crate::alerts::format::markdown_link;
use crate::alerts::row::DisplayRow;
use crate::alerts::targets::TargetCreator;
use crate::alerts::trigger::Update;
use crate::alerts::validation::ValidationMessage;
use crate::brokers::registry::BrokerRegistry;
use crate::error::{ConfigError, DashError, TargetError};

/// Visibility of one broker panel after a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelVisibility {
    pub broker: String,
    pub container_id: String,
    pub visible: bool,
}

impl PanelVisibility {
    /// CSS `display` value for the container.
    pub fn display(&self) -> &'static str {
        if self.visible {
            "block"
        } else {
            "none"
        }
    }
}

/// Result of a broker selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerSelection {
    pub active: String,
    pub heading: String,
    pub panels: Vec<PanelVisibility>,
}

pub struct BindingController {
    panels: Vec<BrokerPanel>,
    active: Option<String>,
    host: Arc<dyn TargetCreator>,
}

impl BindingController {
    /// Instantiate and wire a panel for every registered adapter.
    pub fn new(registry: &BrokerRegistry, host: Arc<dyn TargetCreator>) -> Self {
        let panels: Vec<BrokerPanel> = registry
            .list_adapters()
            .iter()
            .map(|entry| BrokerPanel::new(entry.instantiate()))
            .collect();
        tracing::debug!(panels = panels.len(), "binding controller wired");

        Self {
            panels,
            active: None,
            host,
        }
    }

    pub fn broker_names(&self) -> Vec<&str> {
        self.panels.iter().map(BrokerPanel::name).collect()
    }

    pub fn panels(&self) -> &[BrokerPanel] {
        &self.panels
    }

    pub fn panel(&self, broker: &str) -> Option<&BrokerPanel> {
        self.panels.iter().find(|p| p.name() == broker)
    }

    fn panel_mut(&mut self, broker: &str) -> Result<&mut BrokerPanel, ConfigError> {
        self.panels
            .iter_mut()
            .find(|p| p.name() == broker)
            .ok_or_else(|| ConfigError::BrokerNotFound {
                name: broker.to_string(),
            })
    }

    pub fn active_broker(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Show the selected broker's panel and hide the rest.
    ///
    /// No-update when `new` is blank or unchanged. A name without a panel
    /// hides every panel.
    pub fn select_broker(&mut self, new: &str, previous: Option<&str>) -> Update<BrokerSelection> {
        let new = new.trim();
        if new.is_empty() || previous.map(str::trim) == Some(new) {
            return Update::NoUpdate;
        }
        if self.panel(new).is_none() {
            tracing::warn!(broker = %new, "selected broker has no panel");
        }

        self.active = Some(new.to_string());
        let panels = self
            .panels
            .iter()
            .map(|p| PanelVisibility {
                broker: p.name().to_string(),
                container_id: p.wiring().container_id.clone(),
                visible: p.name() == new,
            })
            .collect();

        Update::Changed(BrokerSelection {
            active: new.to_string(),
            heading: format!("{} Alerts", new),
            panels,
        })
    }

    /// A filter input of `broker` changed.
    pub fn note_input_change(&mut self, broker: &str) -> Result<(), DashError> {
        self.panel_mut(broker)?.note_input_change();
        Ok(())
    }

    /// Run `broker`'s query cycle.
    ///
    /// Only an unknown broker is an error; validation and remote faults come
    /// back as messages on the panel.
    pub async fn handle_query(
        &mut self,
        broker: &str,
        request: &QueryRequest,
    ) -> Result<Update<PanelUpdate>, DashError> {
        let panel = self.panel_mut(broker)?;
        Ok(panel.run_query(request).await)
    }

    /// Validate `broker`'s filters without running a query.
    pub fn validate(
        &self,
        broker: &str,
        request: &QueryRequest,
        existing: &[ValidationMessage],
    ) -> Result<Update<Vec<ValidationMessage>>, DashError> {
        let panel = self.panel(broker).ok_or_else(|| ConfigError::BrokerNotFound {
            name: broker.to_string(),
        })?;
        Ok(panel.validate(&request.filters, request.token, existing))
    }

    /// Create one target per selected row.
    ///
    /// Rows are handled independently: each yields exactly one success or
    /// failure message, appended to `existing` in selection order.
    pub async fn create_targets(
        &self,
        trigger_count: Option<u64>,
        selected_rows: &[usize],
        row_data: &[DisplayRow],
        active_broker: Option<&str>,
        existing: &[ValidationMessage],
    ) -> Result<Update<Vec<ValidationMessage>>, DashError> {
        if trigger_count.unwrap_or(0) == 0 || selected_rows.is_empty() {
            return Ok(Update::NoUpdate);
        }

        let broker = active_broker.or(self.active_broker()).unwrap_or_default();
        let panel = self.panel(broker).ok_or_else(|| ConfigError::BrokerNotFound {
            name: broker.to_string(),
        })?;
        let adapter = panel.adapter();

        let mut messages = existing.to_vec();
        for &index in selected_rows {
            let outcome = match row_data.get(index) {
                Some(row) => adapter.to_target(row.alert(), self.host.as_ref()).await,
                None => Err(TargetError::RowOutOfRange { index }),
            };

            let message = match outcome {
                Ok(target) => {
                    let label = match self.host.target_url(&target) {
                        Some(url) => markdown_link(&target.name, &url),
                        None => target.name.clone(),
                    };
                    ValidationMessage::success(format!("Successfully created {}", label))
                }
                Err(err) => {
                    tracing::warn!(broker = %broker, row = index, error = %err, "target creation failed");
                    ValidationMessage::error(format!("Unable to create target from alert. {}", err))
                }
            };
            messages.push(message);
        }

        Ok(Update::Changed(messages))
    }
}
