//! Configuration schema and defaults for homeval.
//!
//! Defines the TOML-serializable configuration with sections `[api]`,
//! `[predictor]`, `[dashboard]`, `[web]` and `[logging]`. Every field has a
//! built-in default; users only set what they want to override.
use serde::{Deserialize, Serialize};

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level homeval configuration.
///
/// Maps directly to `~/.homeval/config.toml` and `.homeval.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomevalConfig {
    pub api: ApiConfig,
    pub predictor: PredictorConfig,
    pub dashboard: DashboardConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; endpoints are appended as `/api/v1/...`.
    pub base_url: String,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [predictor]
// ---------------------------------------------------------------------------

/// Predictor form behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Minimum time between submit and showing a result (milliseconds).
    pub reveal_delay_ms: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 800,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Market dashboard rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Price per sq.ft that fills a location bar to 100%.
    pub price_ceiling_sqft: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            price_ceiling_sqft: 20_000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Local web UI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `homeval web`.
    pub addr: String,
    /// Open the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Request log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether outbound calls are recorded.
    pub enabled: bool,
    /// Path to the JSONL request log. `~` expands to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.homeval/requests.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl HomevalConfig {
    /// Annotated default config file, written by `homeval config init`.
    pub fn default_toml() -> String {
        r#"# homeval configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (HOMEVAL_*)
#   2. Project config (.homeval.toml in current directory)
#   3. User global config (~/.homeval/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://127.0.0.1:8000"   # or HOMEVAL_API_URL
timeout_ms = 10000

[predictor]
reveal_delay_ms = 800                # Minimum pause before a result is shown

[dashboard]
price_ceiling_sqft = 20000.0         # Price per sq.ft drawn as a full bar

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true
path = "~/.homeval/requests.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
