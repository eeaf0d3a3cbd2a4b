//! One broker's panel: adapter instance, query cycle state and output
//!
//! ```text
//!   Idle ──input change──▶ AwaitingTrigger
//!     ▲                         │ gate rejects / validation blocks
//!     │◀────────────────────────┤
//!     │                         │ token advanced, no blocking errors
//!     │   query returned        ▼
//!     └──────────────────── Executing ──remote fault──▶ Errored
//! ```
//!
//! A dispatched query consumes its token even when the broker fails, so
//! `Errored` returns to `Idle` only on the next trigger. A blocked query
//! consumes nothing.

use serde::{Deserialize, Serialize};

use super::wiring::PanelWiring;
use crate::alerts::adapter::BrokerAdapter;
use crate::alerts::filters::FilterValues;
use crate::alerts::row::DisplayRow;
use crate::alerts::trigger::{PageKey, QueryState, TriggerGate, Update};
use crate::alerts::validation::{has_blocking, ValidationMessage};

/// A query cycle invocation: trigger token plus the current filter values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Click counter of the panel's filter button.
    #[serde(default)]
    pub token: u64,
    #[serde(default)]
    pub filters: FilterValues,
}

impl QueryRequest {
    pub fn new(token: u64, filters: FilterValues) -> Self {
        Self { token, filters }
    }
}

/// What a query cycle publishes to the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelUpdate {
    pub broker: String,
    /// New table contents; `None` leaves the table as it is.
    pub rows: Option<Vec<DisplayRow>>,
    /// Full message list after this cycle.
    pub messages: Vec<ValidationMessage>,
    pub state: QueryState,
}

pub struct BrokerPanel {
    adapter: Box<dyn BrokerAdapter>,
    wiring: PanelWiring,
    gate: TriggerGate,
    state: QueryState,
    rows: Vec<DisplayRow>,
    messages: Vec<ValidationMessage>,
}

impl BrokerPanel {
    pub fn new(adapter: Box<dyn BrokerAdapter>) -> Self {
        let wiring = PanelWiring::for_adapter(adapter.as_ref());
        Self {
            adapter,
            wiring,
            gate: TriggerGate::new(),
            state: QueryState::Idle,
            rows: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    pub fn adapter(&self) -> &dyn BrokerAdapter {
        self.adapter.as_ref()
    }

    pub fn wiring(&self) -> &PanelWiring {
        &self.wiring
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn last_handled(&self) -> u64 {
        self.gate.last_handled()
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// A filter input changed; the panel waits for the trigger.
    pub fn note_input_change(&mut self) {
        if self.state == QueryState::Idle {
            self.state = QueryState::AwaitingTrigger;
        }
    }

    /// Remove one message. Dismissal is a UI action; the query cycle only
    /// ever appends.
    pub fn dismiss_message(&mut self, index: usize) -> Option<ValidationMessage> {
        (index < self.messages.len()).then(|| self.messages.remove(index))
    }

    fn page_key(values: &FilterValues) -> PageKey {
        (values.page_current, values.page_size.unwrap_or(0))
    }

    /// `existing` plus this adapter's diagnostics for `values`, or no-update
    /// when `token` is not a new trigger.
    pub fn validate(
        &self,
        values: &FilterValues,
        token: u64,
        existing: &[ValidationMessage],
    ) -> Update<Vec<ValidationMessage>> {
        if !self.gate.admits(token, Self::page_key(values)) {
            return Update::NoUpdate;
        }
        let mut messages = existing.to_vec();
        append_new(&mut messages, self.adapter.validate_filters(values));
        Update::Changed(messages)
    }

    /// Gate, validate, execute, flatten, publish.
    ///
    /// Remote faults are recorded on this panel as an error message and never
    /// returned to the caller.
    pub async fn run_query(&mut self, request: &QueryRequest) -> Update<PanelUpdate> {
        let page = Self::page_key(&request.filters);
        if !self.gate.admits(request.token, page) {
            if self.state == QueryState::AwaitingTrigger {
                self.state = QueryState::Idle;
            }
            return Update::NoUpdate;
        }

        let diagnostics = self.adapter.validate_filters(&request.filters);
        let blocked = has_blocking(&diagnostics);
        append_new(&mut self.messages, diagnostics);
        if blocked {
            tracing::debug!(broker = %self.name(), "query blocked by validation");
            if self.state != QueryState::Errored {
                self.state = QueryState::Idle;
            }
            return Update::Changed(self.publish(None));
        }

        self.state = QueryState::Executing;
        let outcome = self.adapter.execute_query(&request.filters).await;
        self.gate.mark_handled(request.token, page);
        match outcome {
            Ok(alerts) => {
                self.rows = self.adapter.flatten(&alerts);
                self.state = QueryState::Idle;
                tracing::info!(
                    broker = %self.name(),
                    token = request.token,
                    rows = self.rows.len(),
                    "query published"
                );
                Update::Changed(self.publish(Some(self.rows.clone())))
            }
            Err(err) => {
                tracing::warn!(broker = %self.name(), error = %err, "broker query failed");
                self.messages.push(ValidationMessage::error(err.to_string()));
                self.state = QueryState::Errored;
                Update::Changed(self.publish(None))
            }
        }
    }

    fn publish(&self, rows: Option<Vec<DisplayRow>>) -> PanelUpdate {
        PanelUpdate {
            broker: self.name().to_string(),
            rows,
            messages: self.messages.clone(),
            state: self.state,
        }
    }
}

/// Append the diagnostics not already shown.
fn append_new(messages: &mut Vec<ValidationMessage>, diagnostics: Vec<ValidationMessage>) {
    for diagnostic in diagnostics {
        if !messages.contains(&diagnostic) {
            messages.push(diagnostic);
        }
    }
}
