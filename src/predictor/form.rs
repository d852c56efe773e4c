//! Field-level editing of a [`PredictionRequest`].
//!
//! Edits never mutate a request in place: [`apply_edit`] returns a new value
//! that the controller swaps in wholesale. Coercion is the only check made
//! here; whether the combination of values makes sense is left to the
//! backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::PredictionRequest;
use crate::config::is_truthy;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One editable input of the predictor form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Location,
    AreaSqft,
    Bhk,
    Bathrooms,
    Floor,
    TotalFloors,
    AgeOfProperty,
    Parking,
    Lift,
}

impl FormField {
    /// Every field in form order.
    pub const ALL: [FormField; 9] = [
        Self::Location,
        Self::AreaSqft,
        Self::Bhk,
        Self::Bathrooms,
        Self::Floor,
        Self::TotalFloors,
        Self::AgeOfProperty,
        Self::Parking,
        Self::Lift,
    ];

    /// Wire name, identical to the request JSON key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::AreaSqft => "area_sqft",
            Self::Bhk => "bhk",
            Self::Bathrooms => "bathrooms",
            Self::Floor => "floor",
            Self::TotalFloors => "total_floors",
            Self::AgeOfProperty => "age_of_property",
            Self::Parking => "parking",
            Self::Lift => "lift",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Location => "Location Cluster",
            Self::AreaSqft => "Area (sq.ft)",
            Self::Bhk => "BHK Configuration",
            Self::Bathrooms => "Bathrooms",
            Self::Floor => "Unit Floor",
            Self::TotalFloors => "Structure Height",
            Self::AgeOfProperty => "Age (Years)",
            Self::Parking => "Reserved Parking",
            Self::Lift => "Lift",
        }
    }

    /// Current value of this field in `request`, as display text.
    pub fn value_of(self, request: &PredictionRequest) -> String {
        match self {
            Self::Location => request.location.clone(),
            Self::AreaSqft => request.area_sqft.to_string(),
            Self::Bhk => request.bhk.to_string(),
            Self::Bathrooms => request.bathrooms.to_string(),
            Self::Floor => request.floor.to_string(),
            Self::TotalFloors => request.total_floors.to_string(),
            Self::AgeOfProperty => request.age_of_property.to_string(),
            Self::Parking => request.parking.to_string(),
            Self::Lift => request.lift.to_string(),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.name() == key)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected form interactions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("{field} expects a number, got '{value}'")]
    NotANumber { field: FormField, value: String },

    #[error("{field} expects a whole number, got '{value}'")]
    NotAWholeNumber { field: FormField, value: String },

    #[error("{field} expects true or false, got '{value}'")]
    NotABoolean { field: FormField, value: String },

    #[error("the form is not available while {state}")]
    Unavailable { state: &'static str },
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// Produce a new request with `field` set from the raw input text.
pub fn apply_edit(
    request: &PredictionRequest,
    field: FormField,
    raw: &str,
) -> Result<PredictionRequest, FormError> {
    let mut next = request.clone();
    match field {
        FormField::Location => next.location = raw.to_string(),
        FormField::AreaSqft => next.area_sqft = parse_number(field, raw)?,
        FormField::Bhk => next.bhk = parse_whole(field, raw)?,
        FormField::Bathrooms => next.bathrooms = parse_number(field, raw)?,
        FormField::Floor => next.floor = parse_whole(field, raw)?,
        FormField::TotalFloors => next.total_floors = parse_whole(field, raw)?,
        FormField::AgeOfProperty => next.age_of_property = parse_whole(field, raw)?,
        FormField::Parking => next.parking = parse_bool(field, raw)?,
        FormField::Lift => next.lift = parse_bool(field, raw)?,
    }
    Ok(next)
}

fn parse_number(field: FormField, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

fn parse_whole<T: FromStr>(field: FormField, raw: &str) -> Result<T, FormError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| FormError::NotAWholeNumber {
            field,
            value: raw.to_string(),
        })
}

fn parse_bool(field: FormField, raw: &str) -> Result<bool, FormError> {
    if is_truthy(raw.trim()) {
        return Ok(true);
    }
    match raw.trim().to_ascii_lowercase().as_str() {
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FormError::NotABoolean {
            field,
            value: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
