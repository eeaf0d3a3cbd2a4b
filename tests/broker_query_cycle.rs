//! Integration tests: the query cycle through the binding controller
//!
//! Each test wires a controller over the three built-in brokers with a canned
//! fetcher and drives it the way the browse page does:
//! - filter button clicks advance the token
//! - paging re-queries with the same token
//! - remote faults stay on the panel that raised them

mod helpers;

use std::sync::Arc;

use serde_json::json;

use helpers::*;
use tom_alerts_dash::alerts::{Cell, QueryState, Severity};
use tom_alerts_dash::brokers::mars::MARS_URL;
use tom_alerts_dash::brokers::scimma::SCIMMA_URL;
use tom_alerts_dash::{FilterValues, QueryRequest};

#[tokio::test]
async fn test_mars_query_end_to_end() {
    let alerts = mars_alerts(5);
    let fetcher = Arc::new(fetcher_for_all(&alerts, &[], &[]));
    let mut dash = controller(fetcher.clone(), target_store());

    let update = dash
        .handle_query("MARS", &QueryRequest::new(1, FilterValues::new()))
        .await
        .unwrap()
        .changed()
        .expect("first click should publish");

    let rows = update.rows.expect("rows");
    assert_eq!(rows.len(), 5);
    assert!(update.messages.is_empty());
    assert_eq!(update.state, QueryState::Idle);

    for (row, alert) in rows.iter().zip(&alerts) {
        let expected = format!(
            "[{}](https://mars.lco.global/{}/)",
            alert["objectId"].as_str().unwrap(),
            alert["lco_id"]
        );
        assert_eq!(row.get("objectId"), Some(&Cell::Text(expected)));
        assert_eq!(row.alert(), alert);
    }

    let requests = fetcher.requests_to(MARS_URL);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].get("format"), Some("json"));
    assert_eq!(requests[0].get("page"), Some("1"));
    assert_eq!(requests[0].get("page_size"), Some("20"));
}

#[tokio::test]
async fn test_mars_cone_search_parameter() {
    let fetcher = Arc::new(fetcher_for_all(&mars_alerts(1), &[], &[]));
    let mut dash = controller(fetcher.clone(), target_store());

    let values = FilterValues::new()
        .with("mars-ra", "100")
        .with("mars-dec", "100")
        .with("mars-radius", "100");
    let update = dash
        .handle_query("MARS", &QueryRequest::new(1, values))
        .await
        .unwrap();
    assert!(!update.is_no_update());

    let requests = fetcher.requests_to(MARS_URL);
    assert_eq!(requests[0].get("cone"), Some("100,100,100"));
}

#[tokio::test]
async fn test_partial_cone_never_reaches_the_broker() {
    let fetcher = Arc::new(fetcher_for_all(&mars_alerts(3), &[], &[]));
    let mut dash = controller(fetcher.clone(), target_store());

    let values = FilterValues::new().with("mars-ra", "100");
    let update = dash
        .handle_query("MARS", &QueryRequest::new(1, values))
        .await
        .unwrap()
        .changed()
        .unwrap();

    assert!(update.rows.is_none());
    assert_eq!(update.messages.len(), 1);
    assert_eq!(
        update.messages[0].text,
        "All of RA, Dec, and Radius are required for a cone search."
    );
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_repeated_token_is_ignored() {
    let fetcher = Arc::new(fetcher_for_all(&mars_alerts(2), &[], &[]));
    let mut dash = controller(fetcher.clone(), target_store());
    let request = QueryRequest::new(3, FilterValues::new());

    assert!(!dash.handle_query("MARS", &request).await.unwrap().is_no_update());
    assert!(dash.handle_query("MARS", &request).await.unwrap().is_no_update());
    assert_eq!(fetcher.requests().len(), 1);

    // an older token after a newer one is no trigger either
    let stale = QueryRequest::new(2, FilterValues::new());
    assert!(dash.handle_query("MARS", &stale).await.unwrap().is_no_update());
    assert_eq!(dash.panel("MARS").unwrap().last_handled(), 3);
}

#[tokio::test]
async fn test_paging_requeries_with_same_token() {
    let fetcher = Arc::new(fetcher_for_all(&mars_alerts(2), &[], &[]));
    let mut dash = controller(fetcher.clone(), target_store());

    let first = QueryRequest::new(1, FilterValues::new().with_page(0, Some(10)));
    let next = QueryRequest::new(1, FilterValues::new().with_page(1, Some(10)));
    let _ = dash.handle_query("MARS", &first).await.unwrap();
    let _ = dash.handle_query("MARS", &next).await.unwrap();

    let requests = fetcher.requests_to(MARS_URL);
    let pages: Vec<&str> = requests.iter().filter_map(|r| r.get("page")).collect();
    assert_eq!(pages, vec!["1", "2"]);
    assert_eq!(requests[1].get("page_size"), Some("10"));
}

#[tokio::test]
async fn test_remote_fault_is_isolated_to_its_panel() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .fail(MARS_URL, "503 Service Unavailable")
            .respond(SCIMMA_URL, scimma_page(&[scimma_alert(&mut rng())])),
    );
    let mut dash = controller(fetcher.clone(), target_store());

    let mars = dash
        .handle_query("MARS", &QueryRequest::new(1, FilterValues::new()))
        .await
        .unwrap()
        .changed()
        .unwrap();
    assert_eq!(mars.state, QueryState::Errored);
    assert!(mars.rows.is_none());
    assert_eq!(mars.messages.len(), 1);
    assert_eq!(mars.messages[0].severity, Severity::Error);
    assert!(mars.messages[0].text.contains("503 Service Unavailable"));

    let scimma = dash
        .handle_query("SCIMMA", &QueryRequest::new(1, FilterValues::new()))
        .await
        .unwrap()
        .changed()
        .unwrap();
    assert_eq!(scimma.state, QueryState::Idle);
    assert_eq!(scimma.rows.map(|r| r.len()), Some(1));
    assert!(scimma.messages.is_empty());

    assert_eq!(dash.panel("MARS").unwrap().state(), QueryState::Errored);
    assert_eq!(dash.panel("ALeRCE").unwrap().state(), QueryState::Idle);
}

#[tokio::test]
async fn test_failed_query_is_not_repeated_for_the_same_click() {
    let fetcher = Arc::new(MockFetcher::new().fail(MARS_URL, "503"));
    let mut dash = controller(fetcher.clone(), target_store());
    let request = QueryRequest::new(1, FilterValues::new());

    let first = dash.handle_query("MARS", &request).await.unwrap();
    assert_eq!(first.changed().map(|u| u.state), Some(QueryState::Errored));
    assert!(dash.handle_query("MARS", &request).await.unwrap().is_no_update());
    assert!(dash.handle_query("MARS", &request).await.unwrap().is_no_update());
    assert_eq!(fetcher.requests_to(MARS_URL).len(), 1);

    // a new click queries again; both faults are kept, newest last
    let retry = dash
        .handle_query("MARS", &QueryRequest::new(2, FilterValues::new()))
        .await
        .unwrap()
        .changed()
        .unwrap();
    assert_eq!(retry.messages.len(), 2);
    assert_eq!(fetcher.requests_to(MARS_URL).len(), 2);
}

#[tokio::test]
async fn test_malformed_response_is_reported() {
    let fetcher = Arc::new(MockFetcher::new().respond(MARS_URL, json!({"detail": "Not found."})));
    let mut dash = controller(fetcher, target_store());

    let update = dash
        .handle_query("MARS", &QueryRequest::new(1, FilterValues::new()))
        .await
        .unwrap()
        .changed()
        .unwrap();
    assert_eq!(update.state, QueryState::Errored);
    assert!(update.messages[0].text.contains("no 'results' list"));
}

#[tokio::test]
async fn test_alerce_discovery_window_and_classes() {
    let alerts = vec![json!({
        "oid": "ZTF20acnvtxy",
        "meanra": 60.0,
        "meandec": 10.5,
        "firstmjd": 59196.441261574075,
        "classrf": 0,
        "pclassrf": 0.98765,
        "classearly": 1,
        "pclassearly": 0.5,
    })];
    let fetcher = Arc::new(fetcher_for_all(&[], &alerts, &[]));
    let mut dash = controller(fetcher.clone(), target_store());

    let values = FilterValues::new()
        .with("classrf", "0")
        .with(
            "discovery-date",
            json!({"start_date": "2020-12-01", "end_date": "2020-12-31"}),
        );
    let rows = dash
        .handle_query("ALeRCE", &QueryRequest::new(1, values))
        .await
        .unwrap()
        .changed()
        .and_then(|u| u.rows)
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("class"), Some(&Cell::Text("SNIa".into())));
    assert_eq!(rows[0].get("classifier"), Some(&Cell::Text("Light Curve".into())));
    assert_eq!(
        rows[0].get("oid"),
        Some(&Cell::Text(
            "[ZTF20acnvtxy](https://alerce.online/object/ZTF20acnvtxy)".into()
        ))
    );

    let requests = fetcher.requests();
    let request = &requests[0];
    assert_eq!(request.get("classrf"), Some("0"));
    assert_eq!(request.get("order_by"), Some("lastmjd"));
    // 2020-12-01 and 2021-01-01 at midnight
    assert_eq!(request.get_all("firstmjd"), vec!["59184", "59215"]);
}

#[tokio::test]
async fn test_unknown_broker_query() {
    let fetcher = Arc::new(MockFetcher::new());
    let mut dash = controller(fetcher, target_store());
    assert!(dash
        .handle_query("Lasair", &QueryRequest::new(1, FilterValues::new()))
        .await
        .is_err());
}
