/// `ApiClient` tests against a local stub backend.
///
/// Each test spawns a `tiny_http` server on an ephemeral port that answers a
/// fixed list of canned responses, one per incoming request, and records
/// what it received.
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use homeval::api::{ApiClient, ApiError, Endpoint, PredictionRequest, PriceApi};
use homeval::telemetry::logger::RequestLog;
use tiny_http::{Header, Response, Server, StatusCode};

/// What the stub saw for one request.
#[derive(Debug)]
struct Recorded {
    method: String,
    url: String,
    body: String,
}

/// One canned reply. `delay` holds the response back to trigger timeouts.
struct Canned {
    status: u16,
    body: &'static str,
    delay: Duration,
}

fn reply(status: u16, body: &'static str) -> Canned {
    Canned {
        status,
        body,
        delay: Duration::ZERO,
    }
}

/// Start the stub. Returns its base URL and a handle yielding the recorded
/// requests once every canned reply has been served.
fn spawn_stub(replies: Vec<Canned>) -> (String, JoinHandle<Vec<Recorded>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for canned in replies {
            let mut request = server.recv().unwrap();
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            recorded.push(Recorded {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body,
            });

            thread::sleep(canned.delay);
            let resp = Response::from_string(canned.body)
                .with_status_code(StatusCode(canned.status))
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(resp);
        }
        recorded
    });

    (format!("http://{addr}"), handle)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5))
}

fn vashi_request() -> PredictionRequest {
    PredictionRequest {
        location: "Vashi".to_string(),
        area_sqft: 950.0,
        bhk: 2,
        ..PredictionRequest::default()
    }
}

const METADATA_BODY: &str = r#"{
    "locations": ["Vashi", "Nerul", "Kharghar"],
    "bhk_options": [1, 2, 3, 4],
    "algorithm": "GradientBoostingRegressor",
    "test_r2": 0.91,
    "cv_r2_mean": 0.89,
    "training_samples": 2500,
    "price_range_inr": {"min": 2500000, "max": 22000000, "mean": 9000000, "median": 8000000}
}"#;

const PREDICT_BODY: &str = r#"{
    "predicted_price_inr": 9500000.0,
    "predicted_price_lakhs": 95.0,
    "predicted_price_crores": 0.95,
    "price_per_sqft_inr": 10000.0,
    "confidence_range": {
        "lower_inr": 8075000.0,
        "upper_inr": 10925000.0,
        "lower_lakhs": 80.75,
        "upper_lakhs": 109.25
    },
    "location": "Vashi",
    "area_sqft": 950.0,
    "bhk": 2,
    "model_version": "1.0.0"
}"#;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[test]
fn fetch_metadata_parses_locations_and_extras() {
    let (url, stub) = spawn_stub(vec![reply(200, METADATA_BODY)]);
    let meta = client(&url).fetch_metadata().unwrap();

    assert_eq!(meta.locations, ["Vashi", "Nerul", "Kharghar"]);
    assert_eq!(meta.bhk_options, vec![1, 2, 3, 4]);
    assert_eq!(meta.training_samples, Some(2500));
    assert_eq!(meta.price_range_inr.map(|r| r.max), Some(22_000_000));

    let recorded = stub.join().unwrap();
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].url, "/api/v1/metadata");
}

#[test]
fn metadata_server_error_is_status_error() {
    let (url, stub) = spawn_stub(vec![reply(500, r#"{"detail": "model not loaded"}"#)]);
    let err = client(&url).fetch_metadata().unwrap_err();

    assert_eq!(err.kind(), "status");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.endpoint(), Endpoint::Metadata);
    stub.join().unwrap();
}

#[test]
fn empty_location_list_is_malformed() {
    let (url, stub) = spawn_stub(vec![reply(
        200,
        r#"{"locations": [], "bhk_options": [1], "algorithm": "x"}"#,
    )]);
    let err = client(&url).fetch_metadata().unwrap_err();
    assert!(matches!(err, ApiError::Malformed { .. }));
    stub.join().unwrap();
}

// ---------------------------------------------------------------------------
// Predict
// ---------------------------------------------------------------------------

#[test]
fn predict_posts_request_and_echoes_fields() {
    let (url, stub) = spawn_stub(vec![reply(200, PREDICT_BODY)]);
    let request = vashi_request();
    let resp = client(&url).predict(&request).unwrap();

    assert!(resp.echoes(&request));
    assert!((resp.predicted_price_lakhs * 100_000.0 - resp.predicted_price_inr).abs() < 1.0);
    assert!(resp.confidence_range.lower_lakhs <= resp.predicted_price_lakhs);
    assert!(resp.predicted_price_lakhs <= resp.confidence_range.upper_lakhs);
    assert_eq!(resp.model_version.as_deref(), Some("1.0.0"));

    let recorded = stub.join().unwrap();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].url, "/api/v1/predict");
    let sent: PredictionRequest = serde_json::from_str(&recorded[0].body).unwrap();
    assert_eq!(sent, request);
}

#[test]
fn predict_error_uses_backend_detail() {
    let (url, stub) = spawn_stub(vec![reply(422, r#"{"detail": "bad input"}"#)]);
    let err = client(&url).predict(&vashi_request()).unwrap_err();

    assert_eq!(err.user_message(), "bad input");
    assert_eq!(err.status(), Some(422));
    stub.join().unwrap();
}

#[test]
fn predict_error_without_detail_uses_fallback() {
    let (url, stub) = spawn_stub(vec![
        reply(500, "Internal Server Error"),
        reply(422, r#"{"detail": [{"loc": ["body", "bhk"], "msg": "field required"}]}"#),
    ]);
    let api = client(&url);

    let err = api.predict(&vashi_request()).unwrap_err();
    assert_eq!(err.user_message(), "Prediction failed");

    let err = api.predict(&vashi_request()).unwrap_err();
    assert_eq!(err.user_message(), "Prediction failed");
    stub.join().unwrap();
}

#[test]
fn inconsistent_units_are_malformed() {
    let body = r#"{
        "predicted_price_inr": 9500000.0,
        "predicted_price_lakhs": 50.0,
        "predicted_price_crores": 0.95,
        "price_per_sqft_inr": 10000.0,
        "confidence_range": {"lower_inr": 0, "upper_inr": 0, "lower_lakhs": 40.0, "upper_lakhs": 60.0},
        "location": "Vashi", "area_sqft": 950.0, "bhk": 2
    }"#;
    let (url, stub) = spawn_stub(vec![reply(200, body), reply(200, "not json")]);
    let api = client(&url);

    let err = api.predict(&vashi_request()).unwrap_err();
    match err {
        ApiError::Malformed { endpoint, reason } => {
            assert_eq!(endpoint, Endpoint::Predict);
            assert!(reason.contains("predicted_price_lakhs"));
        }
        other => panic!("expected malformed, got {other:?}"),
    }

    let err = api.predict(&vashi_request()).unwrap_err();
    assert_eq!(err.kind(), "malformed");
    stub.join().unwrap();
}

// ---------------------------------------------------------------------------
// Market stats and health
// ---------------------------------------------------------------------------

#[test]
fn fetch_market_stats_parses_locations() {
    let body = r#"{
        "location_stats": {
            "Vashi": {"avg_price_sqft": 18000.0, "avg_price_lakhs": 171.0, "count": 120},
            "Nerul": {"avg_price_sqft": 14000.0}
        },
        "overall": {
            "total_locations": 2,
            "model_r2": 0.91,
            "training_samples": 2500,
            "price_range_inr": {"min": 2500000, "max": 22000000}
        },
        "top_locations_by_price": [["Vashi", {"avg_price_sqft": 18000.0}]]
    }"#;
    let (url, stub) = spawn_stub(vec![reply(200, body)]);
    let stats = client(&url).fetch_market_stats().unwrap();

    assert_eq!(stats.location_stats.len(), 2);
    assert_eq!(stats.location_stats["Vashi"].avg_price_sqft, 18_000.0);
    assert_eq!(stats.location_stats["Nerul"].avg_price_lakhs, None);
    assert_eq!(stats.top_locations_by_price[0].0, "Vashi");
    assert_eq!(stats.overall.price_range_inr.map(|r| r.max), Some(22_000_000));

    let recorded = stub.join().unwrap();
    assert_eq!(recorded[0].url, "/api/v1/analytics/market-stats");
}

#[test]
fn out_of_range_r2_is_malformed() {
    let body = r#"{
        "location_stats": {},
        "overall": {"total_locations": 0, "model_r2": 1.5, "training_samples": 0}
    }"#;
    let (url, stub) = spawn_stub(vec![reply(200, body)]);
    let err = client(&url).fetch_market_stats().unwrap_err();
    assert_eq!(err.kind(), "malformed");
    stub.join().unwrap();
}

#[test]
fn fetch_health_reads_root_route() {
    let body = r#"{"status": "ok", "model_loaded": true, "model_version": "1.0.0", "api_version": "v1"}"#;
    let (url, stub) = spawn_stub(vec![reply(200, body)]);
    let health = client(&url).fetch_health().unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.model_loaded);

    let recorded = stub.join().unwrap();
    assert_eq!(recorded[0].url, "/health");
}

// ---------------------------------------------------------------------------
// Timeouts and request log
// ---------------------------------------------------------------------------

#[test]
fn slow_backend_times_out_as_transport_error() {
    let (url, stub) = spawn_stub(vec![Canned {
        status: 200,
        body: METADATA_BODY,
        delay: Duration::from_millis(1500),
    }]);
    let api = ApiClient::new(&url, Duration::from_millis(200));

    let err = api.fetch_metadata().unwrap_err();
    assert_eq!(err.kind(), "transport");
    stub.join().unwrap();
}

#[test]
fn calls_are_recorded_without_payloads() {
    let path = std::env::temp_dir().join(format!(
        "homeval_client_log_{}_{}.jsonl",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let _ = std::fs::remove_file(&path);

    let (url, stub) = spawn_stub(vec![
        reply(200, METADATA_BODY),
        reply(422, r#"{"detail": "bad input"}"#),
    ]);
    let log = RequestLog::at(&path);
    let api = client(&url).with_request_log(log.clone());

    api.fetch_metadata().unwrap();
    api.predict(&vashi_request()).unwrap_err();
    stub.join().unwrap();

    let entries = log.read_all();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].endpoint, "metadata");
    assert_eq!(entries[0].outcome, "ok");
    assert_eq!(entries[1].endpoint, "predict");
    assert_eq!(entries[1].outcome, "status");
    assert_eq!(entries[1].status, Some(422));

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("Vashi"));
    let _ = std::fs::remove_file(&path);
}
