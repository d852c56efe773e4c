/// Configuration integration tests.
///
/// # Safety
///
/// The environment test uses `std::env::set_var` / `remove_var`, which are
/// `unsafe` in Rust 2024 edition. All env mutation lives in one `#[test]` so
/// nothing else in this binary reads the variables concurrently.
use std::time::Duration;

use homeval::api::ApiClient;
use homeval::config::{self, HomevalConfig};

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

const VARS: [&str; 4] = [
    "HOMEVAL_API_URL",
    "HOMEVAL_TIMEOUT_MS",
    "HOMEVAL_REVEAL_DELAY_MS",
    "HOMEVAL_LOG",
];

#[test]
fn env_overrides_take_precedence() {
    // --- every variable applied ---
    unsafe {
        set_env("HOMEVAL_API_URL", "http://localhost:9000/");
        set_env("HOMEVAL_TIMEOUT_MS", "2500");
        set_env("HOMEVAL_REVEAL_DELAY_MS", "0");
        set_env("HOMEVAL_LOG", "off");
    }
    let cfg = config::load();
    assert_eq!(cfg.api.base_url, "http://localhost:9000/");
    assert_eq!(cfg.api.timeout_ms, 2500);
    assert_eq!(cfg.predictor.reveal_delay_ms, 0);
    assert!(!cfg.logging.enabled);

    // The client normalizes the URL and carries the timeout.
    let client = ApiClient::from_config(&cfg);
    assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    assert_eq!(client.timeout(), Duration::from_millis(2500));

    // --- unparseable numbers and blank URL are ignored ---
    unsafe {
        set_env("HOMEVAL_API_URL", "   ");
        set_env("HOMEVAL_TIMEOUT_MS", "soon");
        set_env("HOMEVAL_LOG", "1");
    }
    let cfg = config::load();
    assert_ne!(cfg.api.base_url.trim(), "");
    assert_ne!(cfg.api.timeout_ms, 0);
    assert!(cfg.logging.enabled);

    for var in VARS {
        unsafe { remove_env(var) };
    }
}

#[test]
fn defaults_match_documented_values() {
    let cfg = HomevalConfig::default();
    assert_eq!(cfg.api.base_url, "http://127.0.0.1:8000");
    assert_eq!(cfg.api.timeout_ms, 10_000);
    assert_eq!(cfg.predictor.reveal_delay_ms, 800);
    assert_eq!(cfg.dashboard.price_ceiling_sqft, 20_000.0);
    assert_eq!(cfg.web.addr, "127.0.0.1:9747");
    assert!(cfg.logging.enabled);
}
