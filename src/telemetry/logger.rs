use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Request log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single line in the request log (`~/.homeval/requests.jsonl`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    /// Endpoint short name: `metadata`, `predict`, `market-stats`, `health`.
    pub endpoint: String,
    /// `ok`, `transport`, `status` or `malformed`.
    pub outcome: String,
    /// HTTP status, absent when the call never got a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub latency_ms: u64,
}

impl RequestLogEntry {
    pub fn is_success(&self) -> bool {
        self.outcome == "ok"
    }
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Handle to the request log. A disabled log has no path and drops records.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    path: Option<PathBuf>,
}

impl RequestLog {
    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// A log writing to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Resolve the log from the `[logging]` config section.
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            path: expand_home(&config.path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one call record. Best-effort: I/O failures are ignored so that
    /// logging can never fail a backend call.
    pub fn record(&self, endpoint: &str, outcome: &str, status: Option<u16>, latency_ms: u64) {
        let entry = RequestLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            endpoint: endpoint.to_string(),
            outcome: outcome.to_string(),
            status,
            latency_ms,
        };
        let _ = self.append(&entry);
    }

    fn append(&self, entry: &RequestLogEntry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every entry, skipping malformed lines. Empty if the file is
    /// missing or the log is disabled.
    pub fn read_all(&self) -> Vec<RequestLogEntry> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
            .collect()
    }

    /// Read entries from the last `days` days, or all of them for `None`.
    pub fn read_since_days(&self, days: Option<u32>) -> Vec<RequestLogEntry> {
        let entries = self.read_all();

        let Some(days) = days else {
            return entries;
        };

        let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
        entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> RequestLog {
        let path = std::env::temp_dir()
            .join(format!("homeval-logger-{}-{name}", std::process::id()))
            .join("requests.jsonl");
        let _ = fs::remove_file(&path);
        RequestLog::at(path)
    }

    #[test]
    fn disabled_log_records_nothing() {
        let log = RequestLog::disabled();
        log.record("metadata", "ok", Some(200), 12);
        assert!(log.read_all().is_empty());
        assert!(log.path().is_none());
    }

    #[test]
    fn from_config_respects_enabled_flag() {
        let config = LoggingConfig {
            enabled: false,
            path: "/tmp/never.jsonl".to_string(),
        };
        assert!(RequestLog::from_config(&config).path().is_none());

        let config = LoggingConfig {
            enabled: true,
            path: "/tmp/requests.jsonl".to_string(),
        };
        assert_eq!(
            RequestLog::from_config(&config).path(),
            Some(Path::new("/tmp/requests.jsonl"))
        );
    }

    #[test]
    fn records_round_trip_through_file() {
        let log = temp_log("roundtrip");
        log.record("predict", "status", Some(422), 40);
        log.record("metadata", "transport", None, 5000);

        let entries = log.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].endpoint, "predict");
        assert_eq!(entries[0].status, Some(422));
        assert!(!entries[0].is_success());
        assert_eq!(entries[1].status, None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let log = temp_log("malformed");
        log.record("health", "ok", Some(200), 3);
        let path = log.path().unwrap().to_path_buf();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();
        log.record("health", "ok", Some(200), 4);

        assert_eq!(log.read_all().len(), 2);
    }

    #[test]
    fn day_window_filters_old_entries() {
        let log = temp_log("window");
        let old = RequestLogEntry {
            timestamp: (Utc::now() - chrono::Duration::days(10)).to_rfc3339(),
            endpoint: "metadata".to_string(),
            outcome: "ok".to_string(),
            status: Some(200),
            latency_ms: 10,
        };
        log.append(&old).unwrap();
        log.record("metadata", "ok", Some(200), 11);

        assert_eq!(log.read_since_days(None).len(), 2);
        assert_eq!(log.read_since_days(Some(7)).len(), 1);
    }
}
