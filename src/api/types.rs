//! Wire types for the price-prediction backend.
//!
//! Every response type implements [`Validate`], which the client runs right
//! after deserialization. A response that parses but violates its shape
//! invariants is reported as [`super::ApiError::Malformed`] instead of
//! flowing into the view layer with nonsense values.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// INR per lakh.
pub const LAKH: f64 = 100_000.0;

/// INR per crore.
pub const CRORE: f64 = 10_000_000.0;

/// The backend rounds lakhs to 2 decimals and crores to 4, so unit
/// conversions may drift by up to half a unit in the last place.
const LAKH_TOLERANCE: f64 = 0.01;
const CRORE_TOLERANCE: f64 = 0.0001;

/// Post-deserialization shape check for a backend response.
pub trait Validate {
    /// Return a human-readable reason when the value is unusable.
    fn validate(&self) -> Result<(), String>;
}

// ---------------------------------------------------------------------------
// Prediction request
// ---------------------------------------------------------------------------

/// Property attributes submitted to `POST /api/v1/predict`.
///
/// Field names match the backend schema exactly. No cross-field checks are
/// applied client-side: `floor > total_floors` is the backend's problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub location: String,
    pub area_sqft: f64,
    pub bhk: u8,
    pub bathrooms: f64,
    pub floor: i32,
    pub total_floors: i32,
    pub age_of_property: u32,
    pub parking: bool,
    pub lift: bool,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            location: String::new(),
            area_sqft: 1000.0,
            bhk: 2,
            bathrooms: 2.0,
            floor: 5,
            total_floors: 15,
            age_of_property: 5,
            parking: true,
            lift: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction response
// ---------------------------------------------------------------------------

/// Server-supplied band around the point prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRange {
    pub lower_inr: f64,
    pub upper_inr: f64,
    pub lower_lakhs: f64,
    pub upper_lakhs: f64,
}

/// Result of `POST /api/v1/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price_inr: f64,
    pub predicted_price_lakhs: f64,
    pub predicted_price_crores: f64,
    pub price_per_sqft_inr: f64,
    pub confidence_range: ConfidenceRange,
    pub location: String,
    pub area_sqft: f64,
    pub bhk: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl PredictionResponse {
    /// Whether the echoed fields match the request that produced this
    /// response. Location comparison ignores case and surrounding
    /// whitespace because the backend title-cases it.
    pub fn echoes(&self, request: &PredictionRequest) -> bool {
        self.location.trim().eq_ignore_ascii_case(request.location.trim())
            && (self.area_sqft - request.area_sqft).abs() < 1e-6
            && self.bhk == request.bhk
    }
}

impl Validate for PredictionResponse {
    fn validate(&self) -> Result<(), String> {
        let amounts = [
            ("predicted_price_inr", self.predicted_price_inr),
            ("predicted_price_lakhs", self.predicted_price_lakhs),
            ("predicted_price_crores", self.predicted_price_crores),
            ("price_per_sqft_inr", self.price_per_sqft_inr),
            ("confidence_range.lower_inr", self.confidence_range.lower_inr),
            ("confidence_range.upper_inr", self.confidence_range.upper_inr),
            ("confidence_range.lower_lakhs", self.confidence_range.lower_lakhs),
            ("confidence_range.upper_lakhs", self.confidence_range.upper_lakhs),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }

        let inr = self.predicted_price_inr;
        if (self.predicted_price_lakhs - inr / LAKH).abs() > LAKH_TOLERANCE {
            return Err(format!(
                "predicted_price_lakhs {} disagrees with predicted_price_inr {inr}",
                self.predicted_price_lakhs
            ));
        }
        if (self.predicted_price_crores - inr / CRORE).abs() > CRORE_TOLERANCE {
            return Err(format!(
                "predicted_price_crores {} disagrees with predicted_price_inr {inr}",
                self.predicted_price_crores
            ));
        }

        let range = &self.confidence_range;
        let lakhs = self.predicted_price_lakhs;
        if range.lower_lakhs > lakhs + LAKH_TOLERANCE || lakhs > range.upper_lakhs + LAKH_TOLERANCE
        {
            return Err(format!(
                "predicted_price_lakhs {lakhs} outside confidence range [{}, {}]",
                range.lower_lakhs, range.upper_lakhs
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Price distribution of the training set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
    pub mean: u64,
    pub median: u64,
}

/// Result of `GET /api/v1/metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataResponse {
    /// Ordered choice set; the first entry is the default selection.
    pub locations: Vec<String>,
    pub bhk_options: Vec<u8>,
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_r2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_r2_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_samples: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range_inr: Option<PriceRange>,
}

impl Validate for MetadataResponse {
    fn validate(&self) -> Result<(), String> {
        if self.locations.is_empty() {
            return Err("locations must not be empty".to_string());
        }
        if let Some(idx) = self.locations.iter().position(|l| l.trim().is_empty()) {
            return Err(format!("locations[{idx}] is blank"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Market statistics
// ---------------------------------------------------------------------------

/// Headline numbers for the whole market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_locations: u32,
    /// Coefficient of determination of the deployed model, in `[0, 1]`.
    pub model_r2: f64,
    pub training_samples: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range_inr: Option<PriceRange>,
}

/// Aggregate for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationStat {
    pub avg_price_sqft: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_price_lakhs: Option<f64>,
}

/// Result of `GET /api/v1/analytics/market-stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub overall: OverallStats,
    pub location_stats: BTreeMap<String, LocationStat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_locations_by_price: Vec<(String, LocationStat)>,
}

impl Validate for MarketStats {
    fn validate(&self) -> Result<(), String> {
        let r2 = self.overall.model_r2;
        if !(0.0..=1.0).contains(&r2) {
            return Err(format!("overall.model_r2 must be within [0, 1], got {r2}"));
        }
        for (location, stat) in &self.location_stats {
            if !stat.avg_price_sqft.is_finite() || stat.avg_price_sqft < 0.0 {
                return Err(format!(
                    "location_stats.{location}.avg_price_sqft must be a non-negative number"
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Result of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub model_version: String,
    #[serde(default)]
    pub api_version: String,
}

impl Validate for HealthStatus {
    fn validate(&self) -> Result<(), String> {
        if self.status.trim().is_empty() {
            return Err("status must not be empty".to_string());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
