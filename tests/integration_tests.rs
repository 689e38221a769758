//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML config → HttpPageSource → PageController

use serde::Deserialize;
use serde_json::{json, Value};
use solidafy_pager::error::FALLBACK_ERROR_MESSAGE;
use solidafy_pager::{
    Cursor, HttpPageSource, PageController, PagerConfig, Phase, Settled, SourceConfig,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Case {
    id: u32,
    subject: String,
}

fn cases(range: std::ops::RangeInclusive<u32>) -> Value {
    range
        .map(|id| json!({"id": id, "subject": format!("Case {id}")}))
        .collect()
}

fn page_body(cursor: &str, page: u32, records: Value) -> Value {
    json!({
        "cursorJson": cursor,
        "records": records,
        "currentPage": page,
        "totalPages": 3,
        "totalRecords": 45,
        "pageSize": 20
    })
}

async fn mount_case_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cases"))
        .and(query_param("page", "1"))
        .and(query_param_is_missing("cursorJson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("X", 1, cases(1..=20))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cases"))
        .and(query_param("page", "2"))
        .and(query_param("cursorJson", "X"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("Y", 2, cases(21..=40))))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cases"))
        .and(query_param("page", "3"))
        .and(query_param("cursorJson", "Y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("Z", 3, cases(41..=45))))
        .mount(server)
        .await;
}

// ============================================================================
// End-to-end Navigation
// ============================================================================

#[tokio::test]
async fn test_walk_all_pages_over_http() {
    let mock_server = MockServer::start().await;
    mount_case_pages(&mock_server).await;

    let source = HttpPageSource::<Case>::new(
        SourceConfig::new(mock_server.uri()).with_path("/cases"),
    )
    .unwrap();
    let pager = PageController::initialize(source, 20).unwrap();

    let first = pager.idle().await;
    assert_eq!(first.current_page(), 1);
    assert_eq!(first.total_records(), 45);
    assert_eq!(first.records()[0].subject, "Case 1");
    assert_eq!(first.cursor(), Some(&Cursor::new("X")));

    let second = pager.next_page().await;
    assert_eq!(second.state().unwrap().records()[0].id, 21);

    let third = pager.next_page().await;
    let third = third.state().unwrap();
    assert_eq!(third.current_page(), 3);
    assert_eq!(third.records().len(), 5);
    assert!(third.is_last_page());

    // Boundary tap issues no request
    assert!(pager.next_page().await.is_skipped());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(pager.stats().pages_loaded, 3);
    assert_eq!(pager.stats().navigations_skipped, 1);
}

#[tokio::test]
async fn test_yaml_config_post_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/getPage"))
        .and(body_partial_json(json!({"offset": 1, "limit": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"rows": [{"id": 1, "subject": "A"}, {"id": 2, "subject": "B"}]},
            "paging": {"token": "t1", "page": 1, "pages": 2, "count": 3, "size": 2}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/getPage"))
        .and(body_partial_json(json!({"token": "t1", "offset": 2, "limit": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"rows": [{"id": 3, "subject": "C"}]},
            "paging": {"token": "t2", "page": 2, "pages": 2, "count": 3, "size": 2}
        })))
        .mount(&mock_server)
        .await;

    let yaml = format!(
        r"
page_size: 2
fetch_timeout_secs: 5
source:
  base_url: {}
  path: /api/getPage
  method: POST
  request:
    cursor_param: token
    page_param: offset
    size_param: limit
  response:
    cursor_path: paging.token
    records_path: data.rows
    current_page_path: paging.page
    total_pages_path: paging.pages
    total_records_path: paging.count
    page_size_path: paging.size
",
        mock_server.uri()
    );
    let config = PagerConfig::from_yaml_str(&yaml).unwrap();

    let source = HttpPageSource::<Case>::new(config.source.clone()).unwrap();
    let pager = PageController::from_config(source, &config).unwrap();

    let first = pager.idle().await;
    assert_eq!(first.records().len(), 2);
    assert_eq!(first.total_pages(), 2);

    let Settled::Loaded(second) = pager.next_page().await else {
        panic!("second page did not load");
    };
    assert_eq!(
        second.records(),
        &[Case {
            id: 3,
            subject: "C".into()
        }]
    );
    assert_eq!(second.cursor(), Some(&Cursor::new("t2")));
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_server_error_keeps_position() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("X", 1, cases(1..=20))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "Invalid cursor", "errorCode": "BAD_CURSOR"})),
        )
        .mount(&mock_server)
        .await;

    let source = HttpPageSource::<Value>::new(SourceConfig::new(mock_server.uri())).unwrap();
    let pager = PageController::initialize(source, 20).unwrap();
    pager.idle().await;

    let settled = pager.next_page().await;
    assert!(settled.is_failed());

    let state = pager.snapshot();
    assert_eq!(state.phase(), Phase::Error);
    assert_eq!(state.last_error(), Some("Invalid cursor"));
    assert_eq!(state.current_page(), 1);
    assert_eq!(state.total_pages(), 3);
    assert!(state.records().is_empty());
    assert_eq!(state.cursor(), Some(&Cursor::new("X")));
}

#[tokio::test]
async fn test_unstructured_error_uses_fallback_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = HttpPageSource::<Value>::new(SourceConfig::new(mock_server.uri())).unwrap();
    let pager = PageController::initialize(source, 20).unwrap();

    let state = pager.idle().await;
    assert_eq!(state.last_error(), Some(FALLBACK_ERROR_MESSAGE));
    assert_eq!(state.phase(), Phase::Error);
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body("X", 1, cases(1..=20)))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let source = HttpPageSource::<Value>::new(SourceConfig::new(mock_server.uri())).unwrap();
    let pager =
        PageController::with_fetch_timeout(source, 20, Duration::from_millis(100)).unwrap();

    let state = pager.idle().await;
    assert_eq!(state.phase(), Phase::Error);
    assert!(state.records().is_empty());
}

#[tokio::test]
async fn test_dispose_discards_late_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body("X", 1, cases(1..=20)))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let source = HttpPageSource::<Value>::new(SourceConfig::new(mock_server.uri())).unwrap();
    let pager = PageController::initialize(source, 20).unwrap();

    let mut rx = pager.subscribe();
    rx.wait_for(|state| state.is_fetching()).await.unwrap();
    pager.dispose();

    tokio::time::sleep(Duration::from_millis(400)).await;
    let state = pager.snapshot();
    assert!(state.records().is_empty());
    assert!(state.cursor().is_none());
    assert!(pager.next_page().await.is_cancelled());
}
