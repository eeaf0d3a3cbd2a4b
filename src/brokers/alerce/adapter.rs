//! ALeRCE BrokerAdapter implementation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Days;

use super::normalize::{
    self, COL_CLASS, COL_CLASSIFIER, COL_DISCOVERY_DATE, COL_MEANDEC, COL_MEANRA, COL_OID,
    COL_PROBABILITY,
};
use super::taxonomy::{ClassTaxonomy, ClassifierKind, ClassifierPrecedence};
use super::ALERCE_NAME;
use crate::alerts::adapter::{
    extract_results, required_f64, required_text, BrokerAdapter, ResultColumn,
    ResultColumnSpecification,
};
use crate::alerts::fetch::{AlertFetcher, FetchRequest};
use crate::alerts::filters::{ChoiceOption, FilterInput, FilterSpecification, FilterValues};
use crate::alerts::format::date_to_mjd;
use crate::alerts::row::{DisplayRow, RawAlert};
use crate::alerts::targets::TargetDraft;
use crate::alerts::validation::{ConeRule, ValidationMessage, GLOBAL_FIELD};
use crate::config::AlerceSettings;
use crate::error::{QueryError, TargetError};

pub const INPUT_OID: &str = "oid";
pub const INPUT_CLASSEARLY: &str = "classearly";
pub const INPUT_CLASSRF: &str = "classrf";
pub const INPUT_RA: &str = "alerce-ra";
pub const INPUT_DEC: &str = "alerce-dec";
pub const INPUT_RADIUS: &str = "alerce-radius";
pub const INPUT_PROBABILITY_MIN: &str = "probability-min";
pub const INPUT_DISCOVERY_DATE: &str = "discovery-date";
pub const INPUT_TRIGGER: &str = "trigger-filter-btn";

/// ALeRCE object adapter
pub struct AlerceAdapter {
    web_url: String,
    api_url: String,
    precedence: ClassifierPrecedence,
    taxonomy: ClassTaxonomy,
    page_size: u32,
    fetcher: Arc<dyn AlertFetcher>,
}

impl AlerceAdapter {
    pub fn new(settings: &AlerceSettings, page_size: u32, fetcher: Arc<dyn AlertFetcher>) -> Self {
        Self {
            web_url: settings.web_url.trim_end_matches('/').to_string(),
            api_url: settings.api_url.clone(),
            precedence: settings.classifier_precedence,
            taxonomy: settings.taxonomy.clone(),
            page_size,
            fetcher,
        }
    }

    fn class_options(&self, kind: ClassifierKind) -> Vec<ChoiceOption> {
        self.taxonomy
            .classes(kind)
            .iter()
            .map(|c| ChoiceOption::new(c.id.to_string(), c.name.clone()))
            .collect()
    }

    /// Query parameters for the current filters.
    ///
    /// The discovery window is sent as a `firstmjd` pair (min, max); the end
    /// date is inclusive so the upper bound is the following midnight.
    pub fn build_request(&self, values: &FilterValues) -> FetchRequest {
        let mut request = FetchRequest::new(self.api_url.clone())
            .param("page", values.page_current + 1)
            .param("page_size", values.page_size_or(self.page_size))
            .param("order_by", "lastmjd")
            .param("order_mode", "DESC")
            .opt_param("oid", values.text(INPUT_OID))
            .opt_param("classearly", values.text(INPUT_CLASSEARLY))
            .opt_param("classrf", values.text(INPUT_CLASSRF))
            .opt_param(
                "probability",
                values.number(INPUT_PROBABILITY_MIN).ok().flatten(),
            );

        if self.cone_rule().and_then(|rule| rule.parameter(values)).is_some() {
            request = request
                .opt_param("ra", values.text(INPUT_RA))
                .opt_param("dec", values.text(INPUT_DEC))
                .opt_param("radius", values.text(INPUT_RADIUS));
        }

        if let Ok(range) = values.date_range(INPUT_DISCOVERY_DATE) {
            let min = range.start.map(date_to_mjd);
            let max = range
                .end
                .and_then(|end| end.checked_add_days(Days::new(1)))
                .map(date_to_mjd);
            request = match (min, max) {
                (None, None) => request,
                (min, None) => request.opt_param("firstmjd", min),
                (min, Some(max)) => request
                    .param("firstmjd", min.unwrap_or(0.0))
                    .param("firstmjd", max),
            };
        }
        request
    }
}

#[async_trait]
impl BrokerAdapter for AlerceAdapter {
    fn name(&self) -> &str {
        ALERCE_NAME
    }

    fn filter_inputs(&self) -> FilterSpecification {
        FilterSpecification::new(vec![
            FilterInput::text(INPUT_OID, "Object ID"),
            FilterInput::choice(
                INPUT_CLASSEARLY,
                "Stamp Classifier",
                self.class_options(ClassifierKind::Stamp),
            ),
            FilterInput::choice(
                INPUT_CLASSRF,
                "Light Curve Classifier",
                self.class_options(ClassifierKind::LightCurve),
            ),
            FilterInput::number(INPUT_RA, "Right Ascension"),
            FilterInput::number(INPUT_DEC, "Declination"),
            FilterInput::number(INPUT_RADIUS, "Search Radius"),
            FilterInput::number(INPUT_PROBABILITY_MIN, "Classifier Probability (Lower Limit)"),
            FilterInput::date_range(INPUT_DISCOVERY_DATE, "Discovery Date"),
            FilterInput::trigger(INPUT_TRIGGER, "Filter"),
        ])
    }

    fn result_columns(&self) -> ResultColumnSpecification {
        ResultColumnSpecification::new(vec![
            ResultColumn::markdown(COL_OID, "Object ID"),
            ResultColumn::text(COL_MEANRA, "Right Ascension"),
            ResultColumn::text(COL_MEANDEC, "Declination"),
            ResultColumn::datetime(COL_DISCOVERY_DATE, "Discovery Date"),
            ResultColumn::text(COL_CLASS, "Class"),
            ResultColumn::text(COL_CLASSIFIER, "Classifier Type"),
            ResultColumn::text(COL_PROBABILITY, "Classifier Probability"),
        ])
    }

    fn cone_rule(&self) -> Option<ConeRule> {
        Some(ConeRule {
            ra: INPUT_RA,
            dec: INPUT_DEC,
            radius: INPUT_RADIUS,
            message: ValidationMessage::field_error(
                GLOBAL_FIELD,
                "All of RA, Dec, and Search Radius must be included to execute a cone search.",
            ),
        })
    }

    fn flatten_alert(&self, alert: &RawAlert) -> DisplayRow {
        normalize::flatten_alert(&self.web_url, self.precedence, &self.taxonomy, alert)
    }

    async fn execute_query(&self, values: &FilterValues) -> Result<Vec<RawAlert>, QueryError> {
        let request = self.build_request(values);
        tracing::info!(broker = ALERCE_NAME, page = values.page_current, "querying ALeRCE");

        let body = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| QueryError::transport(ALERCE_NAME, e))?;
        extract_results(ALERCE_NAME, body, "items")
    }

    fn target_draft(&self, alert: &RawAlert) -> Result<TargetDraft, TargetError> {
        let mut draft = TargetDraft::sidereal(
            required_text(alert, "oid")?,
            required_f64(alert, "meanra")?,
            required_f64(alert, "meandec")?,
        );
        let classification = normalize::classify(alert, self.precedence, &self.taxonomy);
        if !classification.class_name.is_empty() {
            draft = draft
                .with_extra("classification", classification.class_name)
                .with_extra("classifier", classification.kind.label());
        }
        Ok(draft)
    }
}
