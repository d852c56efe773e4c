//! JSON API handlers for the web UI.
//!
//! Each handler corresponds to an API endpoint and returns a [`Reply`]
//! holding an HTTP status and a JSON body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{MetadataResponse, PredictionRequest, PredictionResponse, PriceApi};
use crate::config::{self, HomevalConfig};
use crate::dashboard::{Dashboard, LocationRow, SummaryTile};
use crate::predictor::{Completion, FormField, PredictorForm};
use crate::telemetry::logger::RequestLog;

/// Status and JSON body of one API response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    fn ok<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(500, &format!("failed to serialize JSON response: {e}")),
        }
    }

    pub(crate) fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Snapshot of the predictor form.
#[derive(Serialize)]
struct FormView {
    state: &'static str,
    interactive: bool,
    request: PredictionRequest,
    fields: Vec<FieldView>,
    locations: Vec<String>,
    bhk_options: Vec<u8>,
    metadata: Option<MetadataResponse>,
    result: Option<PredictionResponse>,
    error: Option<String>,
}

#[derive(Serialize)]
struct FieldView {
    name: &'static str,
    label: &'static str,
    value: String,
}

/// Field update request. `value` may be a JSON string, number or bool.
#[derive(Deserialize)]
struct FieldUpdate {
    field: String,
    value: Value,
}

#[derive(Serialize)]
struct DashboardView {
    state: &'static str,
    error: Option<String>,
    price_ceiling_sqft: f64,
    tiles: Vec<SummaryTile>,
    rows: Vec<LocationRow>,
}

#[derive(Serialize)]
struct HealthResponse {
    backend_url: String,
    backend_ok: bool,
    backend_status: Option<String>,
    model_loaded: bool,
    model_version: Option<String>,
    api_version: Option<String>,
    error: Option<String>,
    config_exists: bool,
    log_exists: bool,
}

fn form_view(form: &PredictorForm) -> FormView {
    let request = form.request().clone();
    FormView {
        state: form.state().name(),
        interactive: form.state().is_interactive(),
        fields: FormField::ALL
            .into_iter()
            .map(|field| FieldView {
                name: field.name(),
                label: field.label(),
                value: field.value_of(&request),
            })
            .collect(),
        request,
        locations: form.locations().to_vec(),
        bhk_options: form.bhk_options(),
        metadata: form.metadata().cloned(),
        result: form.result().cloned(),
        error: form.error().map(str::to_string),
    }
}

fn raw_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/form`: current form state.
pub fn get_form(form: &PredictorForm) -> Reply {
    Reply::ok(&form_view(form))
}

/// `POST /api/form/retry`: retry the metadata bootstrap.
pub fn post_retry<A: PriceApi>(form: &mut PredictorForm, api: &A) -> Reply {
    form.retry_metadata(api);
    Reply::ok(&form_view(form))
}

/// `PUT /api/form/field`: edit one field.
///
/// Expects JSON body: `{ "field": "area_sqft", "value": 1250 }`
pub fn put_field(form: &mut PredictorForm, body: &str) -> Reply {
    let update: FieldUpdate = match serde_json::from_str(body) {
        Ok(update) => update,
        Err(e) => return Reply::error(400, &format!("invalid JSON in field update: {e}")),
    };

    let result = update
        .field
        .parse::<FormField>()
        .and_then(|field| form.edit(field, &raw_value(&update.value)));

    match result {
        Ok(()) => Reply::ok(&form_view(form)),
        Err(e) => Reply::error(400, &e.to_string()),
    }
}

/// `POST /api/form/submit`: run a prediction with the current fields.
pub fn post_submit<A: PriceApi>(form: &mut PredictorForm, api: &A) -> Reply {
    match form.submit(api) {
        Ok(Completion::Applied) => Reply::ok(&form_view(form)),
        Ok(_) => Reply::error(409, "submission was superseded"),
        Err(e) => Reply::error(409, &e.to_string()),
    }
}

/// `GET /api/dashboard`: mount a dashboard and return its view data.
pub fn get_dashboard<A: PriceApi>(api: &A, cfg: &HomevalConfig) -> Reply {
    let mut dashboard = Dashboard::from_config(&cfg.dashboard);
    let error = match dashboard.mount(api) {
        crate::dashboard::DashboardState::Failed { message } => Some(message.clone()),
        _ => None,
    };

    Reply::ok(&DashboardView {
        state: dashboard.state().name(),
        error,
        price_ceiling_sqft: dashboard.price_ceiling_sqft(),
        tiles: dashboard.tiles(),
        rows: dashboard.rows(),
    })
}

/// `GET /api/health`: backend health plus local file checks.
pub fn get_health<A: PriceApi>(api: &A, cfg: &HomevalConfig) -> Reply {
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_exists = RequestLog::from_config(&cfg.logging)
        .path()
        .is_some_and(|p| p.exists());

    let mut resp = HealthResponse {
        backend_url: cfg.api.base_url.clone(),
        backend_ok: false,
        backend_status: None,
        model_loaded: false,
        model_version: None,
        api_version: None,
        error: None,
        config_exists,
        log_exists,
    };

    match api.fetch_health() {
        Ok(health) => {
            resp.backend_ok = health.status == "ok";
            resp.model_loaded = health.model_loaded;
            resp.model_version = Some(health.model_version);
            resp.api_version = Some(health.api_version);
            resp.backend_status = Some(health.status);
        }
        Err(e) => resp.error = Some(e.user_message()),
    }

    Reply::ok(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::{ApiError, ConfidenceRange, Endpoint, MarketStats};

    struct Scripted;

    impl PriceApi for Scripted {
        fn fetch_metadata(&self) -> Result<MetadataResponse, ApiError> {
            Ok(MetadataResponse {
                locations: vec!["Vashi".to_string(), "Nerul".to_string()],
                bhk_options: vec![1, 2, 3],
                algorithm: "gradient_boosting".to_string(),
                test_r2: None,
                cv_r2_mean: None,
                training_samples: None,
                price_range_inr: None,
            })
        }

        fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
            let inr = request.area_sqft * 10_000.0;
            Ok(PredictionResponse {
                predicted_price_inr: inr,
                predicted_price_lakhs: inr / 100_000.0,
                predicted_price_crores: inr / 10_000_000.0,
                price_per_sqft_inr: 10_000.0,
                confidence_range: ConfidenceRange {
                    lower_inr: inr * 0.85,
                    upper_inr: inr * 1.15,
                    lower_lakhs: inr * 0.85 / 100_000.0,
                    upper_lakhs: inr * 1.15 / 100_000.0,
                },
                location: request.location.clone(),
                area_sqft: request.area_sqft,
                bhk: request.bhk,
                model_version: None,
            })
        }

        fn fetch_market_stats(&self) -> Result<MarketStats, ApiError> {
            Err(ApiError::Status {
                endpoint: Endpoint::MarketStats,
                status: 503,
                message: "Market stats unavailable".to_string(),
            })
        }
    }

    fn loaded_form() -> PredictorForm {
        let mut form = PredictorForm::new(Duration::ZERO);
        form.load_metadata(&Scripted);
        form
    }

    #[test]
    fn form_view_lists_fields_in_order() {
        let reply = get_form(&loaded_form());
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["state"], "ready");
        assert_eq!(reply.body["request"]["location"], "Vashi");
        assert_eq!(reply.body["fields"][0]["name"], "location");
        assert_eq!(reply.body["fields"][1]["value"], "1000");
    }

    #[test]
    fn put_field_accepts_json_numbers_and_strings() {
        let mut form = loaded_form();
        let reply = put_field(&mut form, r#"{"field": "area_sqft", "value": 1250}"#);
        assert_eq!(reply.status, 200);
        assert_eq!(form.request().area_sqft, 1250.0);

        let reply = put_field(&mut form, r#"{"field": "lift", "value": false}"#);
        assert_eq!(reply.status, 200);
        assert!(!form.request().lift);

        let reply = put_field(&mut form, r#"{"field": "location", "value": "Nerul"}"#);
        assert_eq!(reply.body["request"]["location"], "Nerul");
    }

    #[test]
    fn put_field_rejects_bad_input() {
        let mut form = loaded_form();
        assert_eq!(put_field(&mut form, "not json").status, 400);
        assert_eq!(
            put_field(&mut form, r#"{"field": "price", "value": 1}"#).status,
            400
        );
        let reply = put_field(&mut form, r#"{"field": "bhk", "value": "many"}"#);
        assert_eq!(reply.status, 400);
        assert!(reply.body["error"].as_str().is_some_and(|e| e.contains("bhk")));
    }

    #[test]
    fn submit_shows_result() {
        let mut form = loaded_form();
        let reply = post_submit(&mut form, &Scripted);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["state"], "result-shown");
        assert_eq!(reply.body["result"]["location"], "Vashi");
        assert_eq!(reply.body["result"]["predicted_price_lakhs"], 100.0);
    }

    #[test]
    fn submit_before_metadata_is_conflict() {
        let mut form = PredictorForm::new(Duration::ZERO);
        assert_eq!(post_submit(&mut form, &Scripted).status, 409);
    }

    #[test]
    fn dashboard_failure_carries_message() {
        let reply = get_dashboard(&Scripted, &HomevalConfig::default());
        assert_eq!(reply.body["state"], "failed");
        assert_eq!(reply.body["error"], "Market stats unavailable");
        assert_eq!(reply.body["price_ceiling_sqft"], 20_000.0);
    }

    #[test]
    fn health_without_probe_reports_error() {
        let reply = get_health(&Scripted, &HomevalConfig::default());
        assert_eq!(reply.body["backend_ok"], false);
        assert!(reply.body["error"].as_str().is_some());
    }
}
