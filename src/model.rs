// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! The stadium model: validated parameters, segments, and precomputed
//! baseline net costs.
//!
//! Accounting, optimization, and welfare live in their own modules as further
//! `impl Model` blocks.

use crate::config::{ConfigError, ModelParameters, ParameterFile};
use crate::demand::{self, CrowdProfile};
use crate::optimizer::PricingSolution;
use crate::segment::{self, ConsumerSegment};
use crate::welfare::ExternalityRates;
use std::sync::OnceLock;

/// Monopoly venue selling tickets and one concession good.
///
/// Immutable after construction. Evaluating it at any pricing point is a pure
/// function, so a single instance may be shared across threads. The one piece
/// of lazily-filled state is the memoized unconstrained optimum, written at
/// most once through a [`OnceLock`]; concurrent first callers block on the
/// single writer rather than racing.
#[derive(Debug)]
pub struct Model {
    params: ModelParameters,
    segments: Vec<ConsumerSegment>,
    baseline_surplus: Vec<f64>,
    baseline_net_cost: Vec<f64>,
    pub(crate) unconstrained: OnceLock<PricingSolution>,
}

impl Model {
    /// Build a model, using [`segment::default_segments`] when `segments` is `None`.
    pub fn new(
        params: ModelParameters,
        segments: Option<Vec<ConsumerSegment>>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let segments = segments.unwrap_or_else(segment::default_segments);
        segment::validate_segments(&segments)?;

        let baseline_surplus: Vec<f64> = segments
            .iter()
            .map(|s| {
                demand::concession_surplus(
                    s,
                    params.base_concession_price,
                    params.max_units_per_person,
                )
            })
            .collect();
        let baseline_net_cost = baseline_surplus
            .iter()
            .map(|cs| params.base_ticket_price - cs)
            .collect();

        tracing::debug!(
            target: "stadium_engine::config",
            segments = segments.len(),
            capacity = params.capacity,
            lambda = params.ticket_price_sensitivity,
            "model constructed"
        );

        Ok(Self {
            params,
            segments,
            baseline_surplus,
            baseline_net_cost,
            unconstrained: OnceLock::new(),
        })
    }

    /// Default calibration with the default two-segment population.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(ModelParameters::default(), None)
    }

    /// Build from a parsed parameter file.
    pub fn from_parameter_file(file: ParameterFile) -> Result<Self, ConfigError> {
        Self::new(file.parameters, file.segments)
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    pub fn segments(&self) -> &[ConsumerSegment] {
        &self.segments
    }

    /// Concession surplus of each segment at the baseline concession price.
    pub fn baseline_surplus(&self) -> &[f64] {
        &self.baseline_surplus
    }

    /// Net cost of each segment at the baseline pricing point.
    pub fn baseline_net_cost(&self) -> &[f64] {
        &self.baseline_net_cost
    }

    pub fn default_externality_rates(&self) -> ExternalityRates {
        self.params.default_externality_rates()
    }

    /// Capacity-scaled segment demands at the given prices.
    pub fn crowd(&self, ticket_price: f64, concession_price: f64) -> CrowdProfile {
        CrowdProfile::evaluate(
            &self.segments,
            &self.baseline_net_cost,
            &self.params,
            ticket_price,
            concession_price,
        )
    }

    /// Attendance before the capacity cap, one entry per segment.
    pub fn raw_attendance(&self, ticket_price: f64, concession_price: f64) -> Vec<f64> {
        self.segments
            .iter()
            .zip(&self.baseline_net_cost)
            .map(|(s, &baseline)| {
                demand::raw_attendance(s, ticket_price, concession_price, baseline, &self.params)
            })
            .collect()
    }

    /// Total attendance after the capacity cap.
    pub fn total_attendance(&self, ticket_price: f64, concession_price: f64) -> f64 {
        self.crowd(ticket_price, concession_price).total_attendance()
    }
}
