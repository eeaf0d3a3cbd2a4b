//! SCIMMA BrokerAdapter implementation

use std::sync::Arc;

use async_trait::async_trait;

use super::normalize::{
    self, COL_ALERT_IDENTIFIER, COL_COMMENTS, COL_COUNTERPART_IDENTIFIER, COL_DEC, COL_RA,
    COL_RANK,
};
use super::SCIMMA_NAME;
use crate::alerts::adapter::{
    extract_results, field, required_f64, BrokerAdapter, ResultColumn, ResultColumnSpecification,
};
use crate::alerts::fetch::{AlertFetcher, FetchRequest};
use crate::alerts::filters::{FilterInput, FilterSpecification, FilterValues};
use crate::alerts::format::json_text;
use crate::alerts::row::{DisplayRow, RawAlert};
use crate::alerts::targets::TargetDraft;
use crate::alerts::validation::{ConeRule, ValidationMessage};
use crate::config::ScimmaSettings;
use crate::error::{QueryError, TargetError};

pub const INPUT_KEYWORD: &str = "keyword";
pub const INPUT_EVENT_TRIGGER: &str = "event-trigger-number";
pub const INPUT_RA: &str = "scimma-ra";
pub const INPUT_DEC: &str = "scimma-dec";
pub const INPUT_RADIUS: &str = "scimma-radius";
pub const INPUT_DATE: &str = "date-filter";
pub const INPUT_TRIGGER: &str = "trigger-filter-btn";

/// SCIMMA Skip adapter
pub struct ScimmaAdapter {
    api_url: String,
    topic: Option<u32>,
    page_size: u32,
    fetcher: Arc<dyn AlertFetcher>,
}

impl ScimmaAdapter {
    /// `fetcher` is expected to carry the Skip API key, if one is configured.
    pub fn new(settings: &ScimmaSettings, page_size: u32, fetcher: Arc<dyn AlertFetcher>) -> Self {
        Self {
            api_url: settings.api_url.clone(),
            topic: settings.topic,
            page_size,
            fetcher,
        }
    }

    /// Query parameters for the current filters. Skip pages are 1-indexed.
    pub fn build_request(&self, values: &FilterValues) -> FetchRequest {
        let cone = self.cone_rule().and_then(|rule| rule.parameter(values));
        let dates = values.date_range(INPUT_DATE).unwrap_or_default();

        FetchRequest::new(self.api_url.clone())
            .param("page", values.page_current + 1)
            .param("page_size", values.page_size_or(self.page_size))
            .opt_param("topic", self.topic)
            .opt_param("keyword", values.text(INPUT_KEYWORD))
            .opt_param("cone_search", cone)
            .opt_param("event_trigger_number", values.text(INPUT_EVENT_TRIGGER))
            .opt_param("alert_timestamp_after", dates.start)
            .opt_param("alert_timestamp_before", dates.end)
    }
}

#[async_trait]
impl BrokerAdapter for ScimmaAdapter {
    fn name(&self) -> &str {
        SCIMMA_NAME
    }

    fn filter_inputs(&self) -> FilterSpecification {
        FilterSpecification::new(vec![
            FilterInput::text(INPUT_KEYWORD, "Keyword Search"),
            FilterInput::text(INPUT_EVENT_TRIGGER, "LVC Trigger Number"),
            FilterInput::number(INPUT_RA, "Right Ascension"),
            FilterInput::number(INPUT_DEC, "Declination"),
            FilterInput::number(INPUT_RADIUS, "Radius"),
            FilterInput::date_range(INPUT_DATE, "Alert Date"),
            FilterInput::trigger(INPUT_TRIGGER, "Filter"),
        ])
    }

    fn result_columns(&self) -> ResultColumnSpecification {
        ResultColumnSpecification::new(vec![
            ResultColumn::markdown(COL_ALERT_IDENTIFIER, "Alert Identifier"),
            ResultColumn::text(COL_COUNTERPART_IDENTIFIER, "Counterpart Identifier"),
            ResultColumn::text(COL_RA, "Right Ascension"),
            ResultColumn::text(COL_DEC, "Declination"),
            ResultColumn::text(COL_RANK, "Rank"),
            ResultColumn::text(COL_COMMENTS, "Comments"),
        ])
    }

    fn cone_rule(&self) -> Option<ConeRule> {
        Some(ConeRule {
            ra: INPUT_RA,
            dec: INPUT_DEC,
            radius: INPUT_RADIUS,
            message: ValidationMessage::error(
                "All of RA, Dec, and Radius are required for a cone search.",
            ),
        })
    }

    fn flatten_alert(&self, alert: &RawAlert) -> DisplayRow {
        normalize::flatten_alert(alert)
    }

    async fn execute_query(&self, values: &FilterValues) -> Result<Vec<RawAlert>, QueryError> {
        let request = self.build_request(values);
        tracing::info!(broker = SCIMMA_NAME, page = values.page_current, "querying SCIMMA");

        let body = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| QueryError::transport(SCIMMA_NAME, e))?;
        extract_results(SCIMMA_NAME, body, "results")
    }

    fn target_draft(&self, alert: &RawAlert) -> Result<TargetDraft, TargetError> {
        let name = ["extracted_fields.counterpart_identifier", "alert_identifier"]
            .iter()
            .filter_map(|path| field(alert, path))
            .map(json_text)
            .find(|name| !name.trim().is_empty())
            .ok_or(TargetError::MissingField {
                field: "alert_identifier",
            })?;

        let mut draft = TargetDraft::sidereal(
            name,
            required_f64(alert, "right_ascension")?,
            required_f64(alert, "declination")?,
        );
        if let Some(event) = field(alert, "message.event_trig_num") {
            draft = draft.with_extra("event_trigger_number", json_text(event));
        }
        Ok(draft)
    }
}
