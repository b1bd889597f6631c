// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Model parameters and the flat parameter file.
//!
//! [`ModelParameters`] is the single configuration surface of the model. Every
//! field has a calibrated default; a JSON parameter file may override any
//! subset of them. Unknown keys are rejected instead of being ignored.

use crate::segment::ConsumerSegment;
use crate::welfare::ExternalityRates;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration errors. All of them are raised at construction time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("segment shares must sum to 1, got {0}")]
    SharesDoNotSumToOne(f64),
    #[error("at least one consumer segment is required")]
    NoSegments,
    #[error("duplicate segment name: {0}")]
    DuplicateSegment(String),
    #[error("segment {name}: {reason}")]
    InvalidSegment { name: String, reason: String },
    #[error("parameter {name} = {value} is invalid: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed parameter file: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// ModelParameters
// ---------------------------------------------------------------------------

/// Calibrated scalar parameters of the venue and its consumers.
///
/// The internalized cost coefficient and the ticket price sensitivity are
/// calibrated jointly so that the unconstrained profit optimum lands near the
/// observed prices ($80 tickets, $12.50 beer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParameters {
    /// Maximum simultaneous attendees.
    pub capacity: u32,
    /// Fraction of capacity attending at the baseline prices.
    pub reference_occupancy: f64,
    /// Observed ticket price; the reference point of the attendance curve.
    pub base_ticket_price: f64,
    /// Observed concession price; the reference point of the attendance curve.
    pub base_concession_price: f64,
    /// Marginal cost per attendee.
    pub ticket_cost: f64,
    /// Marginal cost per concession unit.
    pub concession_cost: f64,
    /// Per-unit excise tax on the concession good.
    pub excise_tax: f64,
    /// Ad valorem sales tax rate included in the posted concession price.
    pub sales_tax_rate: f64,
    /// `k` in `k * (units / 1000)^2`.
    pub internalized_cost_coefficient: f64,
    /// `λ` of the semi-log attendance curve.
    pub ticket_price_sensitivity: f64,
    /// Per-person consumption cap `B_max`.
    pub max_units_per_person: f64,
    /// Units per drinking fan when the concession good is free.
    pub open_bar_units: f64,
    /// Segments with a preference weight above this drink when the good is free.
    pub open_bar_alpha_threshold: f64,
    /// Default crime externality per unit.
    pub crime_cost_per_unit: f64,
    /// Default health externality per unit.
    pub health_cost_per_unit: f64,
    /// Upper bound of the ticket price search.
    pub ticket_price_max: f64,
    /// Upper bound of the concession price search.
    pub concession_price_max: f64,
    /// Lowest unconstrained concession price is `concession_cost + margin`.
    pub concession_min_margin: f64,
    /// Internal price standing in for "not sold at all".
    pub ban_surrogate_price: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            capacity: 46_537,
            reference_occupancy: 0.85,
            base_ticket_price: 80.0,
            base_concession_price: 12.5,
            ticket_cost: 3.5,
            concession_cost: 2.0,
            excise_tax: 0.074,
            sales_tax_rate: 0.08875,
            internalized_cost_coefficient: 126.7263,
            ticket_price_sensitivity: 0.013_178_5,
            max_units_per_person: 10.0,
            open_bar_units: 6.5,
            open_bar_alpha_threshold: 1.0,
            crime_cost_per_unit: 2.50,
            health_cost_per_unit: 1.50,
            ticket_price_max: 200.0,
            concession_price_max: 30.0,
            concession_min_margin: 0.1,
            ban_surrogate_price: 1.0e6,
        }
    }
}

impl ModelParameters {
    /// Capacity as a float, for arithmetic.
    pub fn capacity_f64(&self) -> f64 {
        f64::from(self.capacity)
    }

    /// Lowest concession price the unconstrained search may choose.
    pub fn concession_price_floor(&self) -> f64 {
        self.concession_cost + self.concession_min_margin
    }

    /// Externality rates used when a caller does not supply its own.
    pub fn default_externality_rates(&self) -> ExternalityRates {
        ExternalityRates::new(self.crime_cost_per_unit, self.health_cost_per_unit)
    }

    /// Reject negative, non-finite, or structurally impossible parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("base_ticket_price", self.base_ticket_price),
            ("base_concession_price", self.base_concession_price),
            ("ticket_cost", self.ticket_cost),
            ("concession_cost", self.concession_cost),
            ("excise_tax", self.excise_tax),
            ("sales_tax_rate", self.sales_tax_rate),
            ("internalized_cost_coefficient", self.internalized_cost_coefficient),
            ("open_bar_units", self.open_bar_units),
            ("open_bar_alpha_threshold", self.open_bar_alpha_threshold),
            ("crime_cost_per_unit", self.crime_cost_per_unit),
            ("health_cost_per_unit", self.health_cost_per_unit),
            ("concession_min_margin", self.concession_min_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
            if value < 0.0 {
                return Err(invalid(name, value, "must not be negative"));
            }
        }

        let positive = [
            ("reference_occupancy", self.reference_occupancy),
            ("ticket_price_sensitivity", self.ticket_price_sensitivity),
            ("max_units_per_person", self.max_units_per_person),
            ("ticket_price_max", self.ticket_price_max),
            ("concession_price_max", self.concession_price_max),
            ("ban_surrogate_price", self.ban_surrogate_price),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(name, value, "must be finite and positive"));
            }
        }

        if self.capacity == 0 {
            return Err(invalid("capacity", 0.0, "must be positive"));
        }
        if self.reference_occupancy > 1.0 {
            return Err(invalid(
                "reference_occupancy",
                self.reference_occupancy,
                "must not exceed 1",
            ));
        }
        if self.ticket_price_max <= self.ticket_cost {
            return Err(invalid(
                "ticket_price_max",
                self.ticket_price_max,
                "must exceed ticket_cost",
            ));
        }
        if self.concession_price_max <= self.concession_price_floor() {
            return Err(invalid(
                "concession_price_max",
                self.concession_price_max,
                "must exceed concession_cost + concession_min_margin",
            ));
        }
        if self.ban_surrogate_price <= self.concession_price_max {
            return Err(invalid(
                "ban_surrogate_price",
                self.ban_surrogate_price,
                "must exceed concession_price_max",
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> ConfigError {
    ConfigError::InvalidParameter { name, value, reason }
}

// ---------------------------------------------------------------------------
// Parameter file
// ---------------------------------------------------------------------------

/// Key under which a parameter file may list its own consumer segments.
pub const SEGMENTS_KEY: &str = "segments";

/// Contents of a parameter file: scalar overrides plus optional segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFile {
    pub parameters: ModelParameters,
    pub segments: Option<Vec<ConsumerSegment>>,
}

impl ParameterFile {
    /// Parse a flat JSON object of named scalars.
    ///
    /// Missing keys fall back to [`ModelParameters::default`]. A `segments`
    /// array, when present, replaces the default two-segment population.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let segments = match map.remove(SEGMENTS_KEY) {
            Some(value) => Some(serde_json::from_value::<Vec<ConsumerSegment>>(value)?),
            None => None,
        };
        let parameters: ModelParameters =
            serde_json::from_value(serde_json::Value::Object(map))?;
        tracing::debug!(
            target: "stadium_engine::config",
            custom_segments = segments.is_some(),
            "parsed parameter file"
        );
        Ok(Self { parameters, segments })
    }

    /// Read and parse a parameter file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::info!(target: "stadium_engine::config", path = %path.display(), "loading parameter file");
        Self::from_json_str(&json)
    }
}
