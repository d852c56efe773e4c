//! Client side of the price-prediction backend.
//!
//! The backend exposes three JSON endpoints under `/api/v1` plus a root
//! health check. [`ApiClient`] is the synchronous `ureq` implementation;
//! controllers depend only on the [`PriceApi`] trait so they can be driven
//! by a scripted backend in tests.
//!
//! Failures are collapsed into [`ApiError`], which keeps the three failure
//! families apart: the call never completed, the backend answered with a
//! non-success status, or the backend answered with something that does not
//! match the expected shape.

pub mod client;
pub mod types;

use thiserror::Error;

pub use client::ApiClient;
pub use types::{
    ConfidenceRange, HealthStatus, LocationStat, MarketStats, MetadataResponse, OverallStats,
    PredictionRequest, PredictionResponse, PriceRange, Validate,
};

/// Fallback message when a failed prediction carries no usable `detail`.
pub const PREDICT_FALLBACK_MESSAGE: &str = "Prediction failed";

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// The backend endpoints this crate talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Metadata,
    Predict,
    MarketStats,
    Health,
}

impl Endpoint {
    /// Path relative to the configured base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Metadata => "/api/v1/metadata",
            Self::Predict => "/api/v1/predict",
            Self::MarketStats => "/api/v1/analytics/market-stats",
            Self::Health => "/health",
        }
    }

    /// Short name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Predict => "predict",
            Self::MarketStats => "market-stats",
            Self::Health => "health",
        }
    }

    /// Generic message for a non-success status on this endpoint.
    pub(crate) fn failure_message(self) -> &'static str {
        match self {
            Self::Metadata => "Failed to fetch metadata",
            Self::Predict => PREDICT_FALLBACK_MESSAGE,
            Self::MarketStats => "Failed to fetch market stats",
            Self::Health => "Health check failed",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the API client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced an HTTP response (refused, DNS, timeout).
    #[error("could not reach backend ({endpoint}): {message}")]
    Transport {
        endpoint: Endpoint,
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        /// Server-supplied `detail` for predict, generic text otherwise.
        message: String,
    },

    /// The body was not valid JSON or failed shape validation.
    #[error("malformed response from {endpoint}: {reason}")]
    Malformed {
        endpoint: Endpoint,
        reason: String,
    },
}

impl ApiError {
    /// The message to show to a user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// The endpoint the failing call targeted.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Malformed { endpoint, .. } => *endpoint,
        }
    }

    /// Failure family, as recorded in the request log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Malformed { .. } => "malformed",
        }
    }

    /// HTTP status, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// The three backend operations the controllers need, plus an optional
/// liveness probe.
pub trait PriceApi {
    fn fetch_metadata(&self) -> Result<MetadataResponse, ApiError>;
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError>;
    fn fetch_market_stats(&self) -> Result<MarketStats, ApiError>;

    /// `GET /health`. Backends without a health route report a transport
    /// failure.
    fn fetch_health(&self) -> Result<HealthStatus, ApiError> {
        Err(ApiError::Transport {
            endpoint: Endpoint::Health,
            message: "health check not supported".to_string(),
        })
    }
}

impl<T: PriceApi + ?Sized> PriceApi for &T {
    fn fetch_metadata(&self) -> Result<MetadataResponse, ApiError> {
        (**self).fetch_metadata()
    }

    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        (**self).predict(request)
    }

    fn fetch_market_stats(&self) -> Result<MarketStats, ApiError> {
        (**self).fetch_market_stats()
    }

    fn fetch_health(&self) -> Result<HealthStatus, ApiError> {
        (**self).fetch_health()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
