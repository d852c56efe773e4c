//! Aggregation of the request log for `homeval requests`.

use std::collections::HashMap;

use crate::telemetry::logger::RequestLogEntry;

/// Per-endpoint call statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSummary {
    pub endpoint: String,
    pub calls: usize,
    pub failures: usize,
    pub avg_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Outcome of the most recent failure, e.g. `"status 503"`.
    pub last_failure: Option<String>,
}

impl EndpointSummary {
    /// Failure rate as a percentage, 0.0 when there were no calls.
    pub fn failure_pct(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            (self.failures as f64 / self.calls as f64) * 100.0
        }
    }
}

/// Summary across all endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestReport {
    pub total_calls: usize,
    pub total_failures: usize,
    /// Sorted by call count, busiest first.
    pub endpoints: Vec<EndpointSummary>,
}

/// Aggregate log entries by endpoint.
pub fn summarize(entries: &[RequestLogEntry]) -> RequestReport {
    let mut groups: HashMap<&str, Vec<&RequestLogEntry>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.endpoint.as_str()).or_default().push(entry);
    }

    let mut endpoints: Vec<EndpointSummary> = groups
        .into_iter()
        .map(|(endpoint, group)| {
            let calls = group.len();
            let failures = group.iter().filter(|e| !e.is_success()).count();
            let total_latency: u64 = group.iter().map(|e| e.latency_ms).sum();
            let max_latency_ms = group.iter().map(|e| e.latency_ms).max().unwrap_or(0);
            let last_failure = group
                .iter()
                .rev()
                .find(|e| !e.is_success())
                .map(|e| describe_failure(e));

            EndpointSummary {
                endpoint: endpoint.to_string(),
                calls,
                failures,
                avg_latency_ms: total_latency / calls as u64,
                max_latency_ms,
                last_failure,
            }
        })
        .collect();

    endpoints.sort_by(|a, b| {
        b.calls
            .cmp(&a.calls)
            .then_with(|| a.endpoint.cmp(&b.endpoint))
    });

    RequestReport {
        total_calls: entries.len(),
        total_failures: endpoints.iter().map(|e| e.failures).sum(),
        endpoints,
    }
}

fn describe_failure(entry: &RequestLogEntry) -> String {
    match entry.status {
        Some(status) => format!("{} {status}", entry.outcome),
        None => entry.outcome.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
