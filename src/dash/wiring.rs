//! UI element ids
//!
//! Broker names namespace every element of a panel, so two brokers declaring
//! the same input id (`trigger-filter-btn`) never collide.

use serde::Serialize;

use crate::alerts::adapter::BrokerAdapter;
use crate::alerts::filters::{InputKind, PAGE_CURRENT, PAGE_SIZE};

/// Broker selector dropdown.
pub const BROKER_SELECTOR_ID: &str = "broker-selection";
/// Page heading updated on selection.
pub const PAGE_HEADING_ID: &str = "page-header";

/// `{local}-{broker}`
pub fn element_id(local: &str, broker: &str) -> String {
    format!("{}-{}", local, broker)
}

pub fn container_id(broker: &str) -> String {
    element_id("alerts-container", broker)
}

pub fn table_id(broker: &str) -> String {
    element_id("alerts-table", broker)
}

pub fn create_targets_button_id(broker: &str) -> String {
    element_id("create-targets-btn", broker)
}

pub fn messages_id(broker: &str) -> String {
    element_id("alert-messages", broker)
}

/// One filter input bound to a panel's query cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WiredInput {
    /// Id the adapter declared.
    pub input_id: String,
    /// Namespaced element id; pagination inputs are properties of the table.
    pub element_id: String,
    pub property: &'static str,
}

/// Fixed bindings of one broker panel, computed once when the panel is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelWiring {
    pub broker: String,
    pub container_id: String,
    pub table_id: String,
    pub create_targets_button_id: String,
    pub messages_id: String,
    /// Inputs that start a query cycle: declared filters plus pagination.
    pub inputs: Vec<WiredInput>,
    /// Declared input whose click counter is the trigger token.
    pub trigger_input: Option<String>,
}

impl PanelWiring {
    pub fn for_adapter(adapter: &dyn BrokerAdapter) -> Self {
        let broker = adapter.name().to_string();
        let spec = adapter.filter_inputs();
        let table = table_id(&broker);

        let inputs = spec
            .inputs()
            .iter()
            .map(|input| match input.kind {
                InputKind::Pagination => WiredInput {
                    input_id: input.id.clone(),
                    element_id: table.clone(),
                    property: if input.id == PAGE_SIZE { PAGE_SIZE } else { PAGE_CURRENT },
                },
                InputKind::Trigger => WiredInput {
                    input_id: input.id.clone(),
                    element_id: element_id(&input.id, &broker),
                    property: "n_clicks",
                },
                InputKind::DateRange => WiredInput {
                    input_id: input.id.clone(),
                    element_id: element_id(&input.id, &broker),
                    property: "date_range",
                },
                _ => WiredInput {
                    input_id: input.id.clone(),
                    element_id: element_id(&input.id, &broker),
                    property: "value",
                },
            })
            .collect();

        Self {
            container_id: container_id(&broker),
            create_targets_button_id: create_targets_button_id(&broker),
            messages_id: messages_id(&broker),
            trigger_input: spec.trigger_input().map(|i| i.id.clone()),
            table_id: table,
            inputs,
            broker,
        }
    }

    pub fn input_ids(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.input_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_namespaced() {
        assert_eq!(table_id("MARS"), "alerts-table-MARS");
        assert_eq!(container_id("ALeRCE"), "alerts-container-ALeRCE");
        assert_eq!(create_targets_button_id("SCIMMA"), "create-targets-btn-SCIMMA");
        assert_ne!(
            element_id("trigger-filter-btn", "MARS"),
            element_id("trigger-filter-btn", "ALeRCE")
        );
    }
}
