//! MARS BrokerAdapter implementation

use std::sync::Arc;

use async_trait::async_trait;

use super::normalize::{self, COL_DEC, COL_MAGPSF, COL_OBJECT_ID, COL_RA, COL_RB};
use super::MARS_NAME;
use crate::alerts::adapter::{
    extract_results, field_f64, required_f64, required_text, BrokerAdapter, ResultColumn,
    ResultColumnSpecification,
};
use crate::alerts::fetch::{AlertFetcher, FetchRequest};
use crate::alerts::filters::{FilterInput, FilterSpecification, FilterValues};
use crate::alerts::row::{DisplayRow, RawAlert};
use crate::alerts::targets::TargetDraft;
use crate::alerts::validation::{ConeRule, ValidationMessage};
use crate::config::MarsSettings;
use crate::error::{QueryError, TargetError};

pub const INPUT_OBJECT_ID: &str = "objectId";
pub const INPUT_RA: &str = "mars-ra";
pub const INPUT_DEC: &str = "mars-dec";
pub const INPUT_RADIUS: &str = "mars-radius";
pub const INPUT_MAGPSF_MAX: &str = "magpsf-max";
pub const INPUT_RB_MIN: &str = "rb-min";
pub const INPUT_TRIGGER: &str = "trigger-filter-btn";

/// MARS alert adapter
pub struct MarsAdapter {
    base_url: String,
    page_size: u32,
    fetcher: Arc<dyn AlertFetcher>,
}

impl MarsAdapter {
    pub fn new(settings: &MarsSettings, page_size: u32, fetcher: Arc<dyn AlertFetcher>) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size,
            fetcher,
        }
    }

    /// Query parameters for the current filters. MARS pages are 1-indexed.
    pub fn build_request(&self, values: &FilterValues) -> FetchRequest {
        let cone = self.cone_rule().and_then(|rule| rule.parameter(values));

        FetchRequest::new(format!("{}/", self.base_url))
            .param("format", "json")
            .param("page", values.page_current + 1)
            .param("page_size", values.page_size_or(self.page_size))
            .opt_param("objectId", values.text(INPUT_OBJECT_ID))
            .opt_param("cone", cone)
            .opt_param("magpsf__lte", values.number(INPUT_MAGPSF_MAX).ok().flatten())
            .opt_param("rb__gte", values.number(INPUT_RB_MIN).ok().flatten())
    }
}

#[async_trait]
impl BrokerAdapter for MarsAdapter {
    fn name(&self) -> &str {
        MARS_NAME
    }

    fn filter_inputs(&self) -> FilterSpecification {
        FilterSpecification::new(vec![
            FilterInput::text(INPUT_OBJECT_ID, "Object Name Search"),
            FilterInput::number(INPUT_RA, "Right Ascension"),
            FilterInput::number(INPUT_DEC, "Declination"),
            FilterInput::number(INPUT_RADIUS, "Radius"),
            FilterInput::number(INPUT_MAGPSF_MAX, "Magnitude Maximum"),
            FilterInput::number(INPUT_RB_MIN, "Real-Bogus Minimum"),
            FilterInput::trigger(INPUT_TRIGGER, "Filter"),
        ])
    }

    fn result_columns(&self) -> ResultColumnSpecification {
        ResultColumnSpecification::new(vec![
            ResultColumn::markdown(COL_OBJECT_ID, "Name"),
            ResultColumn::text(COL_RA, "Right Ascension"),
            ResultColumn::text(COL_DEC, "Declination"),
            ResultColumn::text(COL_MAGPSF, "Magnitude"),
            ResultColumn::text(COL_RB, "Real-Bogus Score"),
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
        normalize::flatten_alert(&self.base_url, alert)
    }

    async fn execute_query(&self, values: &FilterValues) -> Result<Vec<RawAlert>, QueryError> {
        let request = self.build_request(values);
        tracing::info!(broker = MARS_NAME, page = values.page_current, "querying MARS");

        let body = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| QueryError::transport(MARS_NAME, e))?;
        extract_results(MARS_NAME, body, "results")
    }

    fn target_draft(&self, alert: &RawAlert) -> Result<TargetDraft, TargetError> {
        let mut draft = TargetDraft::sidereal(
            required_text(alert, "objectId")?,
            required_f64(alert, "candidate.ra")?,
            required_f64(alert, "candidate.dec")?,
        );
        if let Some(mag) = field_f64(alert, "candidate.magpsf") {
            draft = draft.with_extra("magpsf", mag);
        }
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::{json, Value};

    struct NoFetch;

    #[async_trait]
    impl AlertFetcher for NoFetch {
        async fn fetch(&self, _request: &FetchRequest) -> Result<Value> {
            Ok(json!({"results": []}))
        }
    }

    fn adapter() -> MarsAdapter {
        MarsAdapter::new(&MarsSettings::default(), 20, Arc::new(NoFetch))
    }

    #[test]
    fn test_request_translates_page_and_cone() {
        let values = FilterValues::new()
            .with_page(0, None)
            .with(INPUT_RA, "100")
            .with(INPUT_DEC, "100")
            .with(INPUT_RADIUS, "100")
            .with(INPUT_RB_MIN, 0.5);
        let request = adapter().build_request(&values);

        assert_eq!(request.url, "https://mars.lco.global/");
        assert_eq!(request.get("page"), Some("1"));
        assert_eq!(request.get("page_size"), Some("20"));
        assert_eq!(request.get("cone"), Some("100,100,100"));
        assert_eq!(request.get("rb__gte"), Some("0.5"));
        assert_eq!(request.get("objectId"), None);
        assert_eq!(request.get("magpsf__lte"), None);
    }

    #[test]
    fn test_partial_cone_is_reported() {
        let values = FilterValues::new().with(INPUT_DEC, 100);
        let messages = adapter().validate_filters(&values);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].text,
            "All of RA, Dec, and Radius are required for a cone search."
        );
        assert!(adapter().build_request(&values).get("cone").is_none());
    }

    #[test]
    fn test_target_draft() {
        let alert = json!({"objectId": "ZTF20abc", "candidate": {"ra": 10.5, "dec": -3.25, "magpsf": 18.1}});
        let draft = adapter().target_draft(&alert).unwrap();
        assert_eq!(draft.name, "ZTF20abc");
        assert_eq!((draft.ra, draft.dec), (10.5, -3.25));

        let err = adapter().target_draft(&json!({"objectId": "x"})).unwrap_err();
        assert!(matches!(err, TargetError::MissingField { field: "candidate.ra" }));
    }
}
