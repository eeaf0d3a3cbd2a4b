//! Shared fixtures for the integration tests
//!
//! - `MockFetcher`: canned broker responses keyed by URL prefix, records every
//!   request it sees
//! - alert factories producing payloads shaped like each broker's API
//! - `RejectingHost`: a target creator that refuses everything

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use tom_alerts_dash::alerts::{AlertFetcher, FetchRequest};
use tom_alerts_dash::brokers::alerce::ALERCE_API_URL;
use tom_alerts_dash::brokers::mars::MARS_URL;
use tom_alerts_dash::brokers::scimma::SCIMMA_URL;
use tom_alerts_dash::error::TargetError;
use tom_alerts_dash::{
    BindingController, BrokerRegistry, DashConfig, InMemoryTargetStore, Target, TargetCreator,
    TargetDraft,
};

// ============================================================================
// Fetcher
// ============================================================================

enum Canned {
    Body(Value),
    Fault(String),
}

/// Broker stand-in: the first registered prefix matching the request URL wins.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<Vec<(String, Canned)>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url_prefix: &str, body: Value) -> Self {
        self.push(url_prefix, Canned::Body(body));
        self
    }

    pub fn fail(self, url_prefix: &str, message: &str) -> Self {
        self.push(url_prefix, Canned::Fault(message.to_string()));
        self
    }

    fn push(&self, url_prefix: &str, canned: Canned) {
        self.responses
            .lock()
            .unwrap()
            .push((url_prefix.to_string(), canned));
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, url_prefix: &str) -> Vec<FetchRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.starts_with(url_prefix))
            .collect()
    }
}

#[async_trait]
impl AlertFetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());

        let responses = self.responses.lock().unwrap();
        match responses
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
        {
            Some((_, Canned::Body(body))) => Ok(body.clone()),
            Some((_, Canned::Fault(message))) => Err(anyhow!("{}", message)),
            None => Err(anyhow!("no canned response for {}", request.url)),
        }
    }
}

// ============================================================================
// Alert factories
// ============================================================================

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn ztf_name(rng: &mut StdRng) -> String {
    let letters: String = (0..7)
        .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
        .collect();
    format!("ZTF{}{}", rng.gen_range(18..24), letters)
}

pub fn mars_alert(rng: &mut StdRng) -> Value {
    json!({
        "objectId": ztf_name(rng),
        "lco_id": rng.gen_range(1_000_000..9_999_999),
        "candidate": {
            "ra": rng.gen_range(0.0..360.0),
            "dec": rng.gen_range(-90.0..90.0),
            "magpsf": rng.gen_range(12.0..22.0),
            "rb": rng.gen_range(0.0..1.0),
            "drb": rng.gen_range(0.0..1.0),
            "wall_time": "2020-12-13T10:35:25",
        }
    })
}

pub fn mars_alerts(count: usize) -> Vec<Value> {
    let mut rng = rng();
    (0..count).map(|_| mars_alert(&mut rng)).collect()
}

pub fn alerce_alert(rng: &mut StdRng) -> Value {
    json!({
        "oid": ztf_name(rng),
        "meanra": rng.gen_range(0.0..360.0),
        "meandec": rng.gen_range(-90.0..90.0),
        "firstmjd": rng.gen_range(58_000.0..60_000.0),
        "lastmjd": rng.gen_range(60_000.0..60_500.0),
        "classrf": rng.gen_range(0..15),
        "pclassrf": rng.gen_range(0.01..1.0),
        "classearly": rng.gen_range(0..5),
        "pclassearly": rng.gen_range(0.01..1.0),
    })
}

pub fn scimma_alert(rng: &mut StdRng) -> Value {
    let event = format!("S{}", rng.gen_range(190_000..200_000));
    json!({
        "alert_identifier": format!("LIGO-{}", rng.gen_range(1000..9999)),
        "alert_timestamp": "2020-01-09T16:00:00Z",
        "right_ascension": rng.gen_range(0.0..360.0),
        "declination": rng.gen_range(-90.0..90.0),
        "message": {"event_trig_num": event, "rank": rng.gen_range(1..10)},
        "extracted_fields": {
            "counterpart_identifier": format!("AT2020{}", rng.gen_range(100..999)),
            "comment_warnings": "",
        },
    })
}

pub fn mars_page(alerts: &[Value]) -> Value {
    json!({"has_next": false, "has_prev": false, "pages": 1, "results": alerts})
}

pub fn alerce_page(alerts: &[Value]) -> Value {
    json!({"total": alerts.len(), "page": 1, "items": alerts})
}

pub fn scimma_page(alerts: &[Value]) -> Value {
    json!({"count": alerts.len(), "next": null, "previous": null, "results": alerts})
}

// ============================================================================
// Host + wiring
// ============================================================================

/// Target creator that rejects every draft.
pub struct RejectingHost;

#[async_trait]
impl TargetCreator for RejectingHost {
    async fn create_target(&self, draft: TargetDraft) -> Result<Target, TargetError> {
        Err(TargetError::Rejected {
            name: draft.name,
            reason: "read-only TOM".to_string(),
        })
    }
}

pub fn all_brokers_config() -> DashConfig {
    DashConfig {
        alert_classes: Some(vec![
            "mars".to_string(),
            "alerce".to_string(),
            "scimma".to_string(),
        ]),
        ..Default::default()
    }
}

pub fn registry(fetcher: Arc<MockFetcher>) -> BrokerRegistry {
    BrokerRegistry::with_fetcher(&all_brokers_config(), fetcher).unwrap()
}

pub fn target_store() -> Arc<InMemoryTargetStore> {
    Arc::new(InMemoryTargetStore::new().with_url_prefix("/targets/"))
}

pub fn controller(fetcher: Arc<MockFetcher>, host: Arc<dyn TargetCreator>) -> BindingController {
    BindingController::new(&registry(fetcher), host)
}

/// Fetcher answering all three brokers with the given pages.
pub fn fetcher_for_all(mars: &[Value], alerce: &[Value], scimma: &[Value]) -> MockFetcher {
    MockFetcher::new()
        .respond(MARS_URL, mars_page(mars))
        .respond(ALERCE_API_URL, alerce_page(alerce))
        .respond(SCIMMA_URL, scimma_page(scimma))
}
