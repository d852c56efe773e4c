//! Market analytics dashboard controller.
//!
//! Loads aggregate market statistics once per mount and exposes them
//! read-only, along with the derived view data (summary tiles and
//! per-location bars). A failed load is kept as a visible `Failed` state.

use serde::Serialize;

use crate::api::{MarketStats, PriceApi};
use crate::config::schema::DashboardConfig;
use crate::utils::format::{format_crores, format_number};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Dashboard lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// Not mounted yet, or the load is in progress.
    Loading,
    Loaded(MarketStats),
    Failed { message: String },
}

impl DashboardState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed { .. } => "failed",
        }
    }
}

/// One location bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRow {
    pub location: String,
    pub avg_price_sqft: f64,
    pub avg_price_lakhs: Option<f64>,
    /// Bar width in percent of the price ceiling, within `[0, 100]`.
    pub width_pct: f64,
}

/// One headline number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTile {
    pub label: &'static str,
    pub value: String,
    pub caption: &'static str,
}

/// Width of a location bar, in percent of `ceiling`, clamped to `[0, 100]`.
pub fn bar_width_pct(avg_price_sqft: f64, ceiling: f64) -> f64 {
    if ceiling <= 0.0 || !avg_price_sqft.is_finite() {
        return 0.0;
    }
    (avg_price_sqft / ceiling * 100.0).clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Single-shot loader for market statistics.
#[derive(Debug)]
pub struct Dashboard {
    state: DashboardState,
    price_ceiling_sqft: f64,
}

impl Dashboard {
    pub fn new(price_ceiling_sqft: f64) -> Self {
        Self {
            state: DashboardState::Loading,
            price_ceiling_sqft,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.price_ceiling_sqft)
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn price_ceiling_sqft(&self) -> f64 {
        self.price_ceiling_sqft
    }

    pub fn stats(&self) -> Option<&MarketStats> {
        match &self.state {
            DashboardState::Loaded(stats) => Some(stats),
            _ => None,
        }
    }

    /// Fetch the statistics. Only the first mount fetches; a dashboard that
    /// has already loaded or failed keeps its state until it is recreated.
    pub fn mount<A: PriceApi>(&mut self, api: &A) -> &DashboardState {
        if self.state != DashboardState::Loading {
            return &self.state;
        }

        self.state = match api.fetch_market_stats() {
            Ok(stats) => DashboardState::Loaded(stats),
            Err(err) => DashboardState::Failed {
                message: err.user_message(),
            },
        };
        &self.state
    }

    /// Location bars, highest price first. Empty unless loaded.
    pub fn rows(&self) -> Vec<LocationRow> {
        let Some(stats) = self.stats() else {
            return Vec::new();
        };

        let mut rows: Vec<LocationRow> = stats
            .location_stats
            .iter()
            .map(|(location, stat)| LocationRow {
                location: location.clone(),
                avg_price_sqft: stat.avg_price_sqft,
                avg_price_lakhs: stat.avg_price_lakhs,
                width_pct: bar_width_pct(stat.avg_price_sqft, self.price_ceiling_sqft),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.avg_price_sqft
                .total_cmp(&a.avg_price_sqft)
                .then_with(|| a.location.cmp(&b.location))
        });
        rows
    }

    /// Headline tiles. Empty unless loaded.
    pub fn tiles(&self) -> Vec<SummaryTile> {
        let Some(stats) = self.stats() else {
            return Vec::new();
        };
        let overall = &stats.overall;

        let ceiling = overall
            .price_range_inr
            .as_ref()
            .filter(|range| range.max > 0)
            .map(|range| format_crores(range.max as f64))
            .unwrap_or_else(|| "n/a".to_string());

        vec![
            SummaryTile {
                label: "Locations",
                value: overall.total_locations.to_string(),
                caption: "Market clusters covered",
            },
            SummaryTile {
                label: "Model Precision",
                value: format!("{:.1}%", overall.model_r2 * 100.0),
                caption: "R² on held-out listings",
            },
            SummaryTile {
                label: "Training Samples",
                value: format_number(overall.training_samples),
                caption: "Listings used for training",
            },
            SummaryTile {
                label: "Market Ceiling",
                value: ceiling,
                caption: "Highest observed price",
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
