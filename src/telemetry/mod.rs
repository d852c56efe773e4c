//! Request telemetry: a JSONL log of outbound backend calls and its
//! aggregation for `homeval requests`.
//!
//! Only call metadata is recorded (endpoint, outcome, HTTP status, latency).
//! Property attributes and prices never reach the log.

pub mod logger;
pub mod reporter;
