//! Scripted backend shared by the controller tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use homeval::api::{
    ApiError, ConfidenceRange, Endpoint, LocationStat, MarketStats, MetadataResponse,
    OverallStats, PredictionRequest, PredictionResponse, PriceApi,
};

/// Backend that replays queued outcomes in order and records every
/// prediction request it receives.
#[derive(Default)]
pub struct ScriptedApi {
    metadata: RefCell<VecDeque<Result<MetadataResponse, ApiError>>>,
    predictions: RefCell<VecDeque<Result<PredictionResponse, ApiError>>>,
    stats: RefCell<VecDeque<Result<MarketStats, ApiError>>>,
    pub metadata_calls: RefCell<usize>,
    pub stats_calls: RefCell<usize>,
    pub predict_requests: RefCell<Vec<PredictionRequest>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(self, outcome: Result<MetadataResponse, ApiError>) -> Self {
        self.metadata.borrow_mut().push_back(outcome);
        self
    }

    pub fn with_prediction(self, outcome: Result<PredictionResponse, ApiError>) -> Self {
        self.predictions.borrow_mut().push_back(outcome);
        self
    }

    pub fn with_stats(self, outcome: Result<MarketStats, ApiError>) -> Self {
        self.stats.borrow_mut().push_back(outcome);
        self
    }
}

impl PriceApi for ScriptedApi {
    fn fetch_metadata(&self) -> Result<MetadataResponse, ApiError> {
        *self.metadata_calls.borrow_mut() += 1;
        self.metadata
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(transport(Endpoint::Metadata)))
    }

    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        self.predict_requests.borrow_mut().push(request.clone());
        self.predictions
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(transport(Endpoint::Predict)))
    }

    fn fetch_market_stats(&self) -> Result<MarketStats, ApiError> {
        *self.stats_calls.borrow_mut() += 1;
        self.stats
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(transport(Endpoint::MarketStats)))
    }
}

pub fn transport(endpoint: Endpoint) -> ApiError {
    ApiError::Transport {
        endpoint,
        message: "connection refused".to_string(),
    }
}

pub fn metadata(locations: &[&str]) -> MetadataResponse {
    MetadataResponse {
        locations: locations.iter().map(|l| l.to_string()).collect(),
        bhk_options: vec![1, 2, 3, 4, 5],
        algorithm: "gradient_boosting".to_string(),
        test_r2: Some(0.91),
        cv_r2_mean: None,
        training_samples: Some(2500),
        price_range_inr: None,
    }
}

/// A consistent response for `request` at `price_per_sqft`.
pub fn prediction(request: &PredictionRequest, price_per_sqft: f64) -> PredictionResponse {
    let inr = request.area_sqft * price_per_sqft;
    let round = |v: f64, places: i32| {
        let f = 10f64.powi(places);
        (v * f).round() / f
    };
    PredictionResponse {
        predicted_price_inr: round(inr, 2),
        predicted_price_lakhs: round(inr / 100_000.0, 2),
        predicted_price_crores: round(inr / 10_000_000.0, 4),
        price_per_sqft_inr: round(price_per_sqft, 2),
        confidence_range: ConfidenceRange {
            lower_inr: round(inr * 0.85, 2),
            upper_inr: round(inr * 1.15, 2),
            lower_lakhs: round(inr * 0.85 / 100_000.0, 2),
            upper_lakhs: round(inr * 1.15 / 100_000.0, 2),
        },
        location: request.location.clone(),
        area_sqft: request.area_sqft,
        bhk: request.bhk,
        model_version: Some("1.0.0".to_string()),
    }
}

pub fn market_stats(locations: &[(&str, f64)]) -> MarketStats {
    let location_stats: BTreeMap<String, LocationStat> = locations
        .iter()
        .map(|(name, price)| {
            (
                name.to_string(),
                LocationStat {
                    avg_price_sqft: *price,
                    avg_price_lakhs: None,
                },
            )
        })
        .collect();
    MarketStats {
        overall: OverallStats {
            total_locations: locations.len() as u32,
            model_r2: 0.912,
            training_samples: 2500,
            price_range_inr: None,
        },
        location_stats,
        top_locations_by_price: Vec::new(),
    }
}
