// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Welfare and externality engine.
//!
//! Social welfare is `CS + PS - externality`. Consumer surplus comes from the
//! semi-log attendance integral, producer surplus is venue profit, and the
//! externality is linear in concession units. Rates are always passed in
//! explicitly; nothing here reads or writes shared rate state.

use crate::model::Model;
use crate::types::{OutcomeReport, PricingPoint, WelfareReport};
use serde::{Deserialize, Serialize};

// ─── Externality Rates ──────────────────────────────────────────────────────

/// Per-unit social cost of concession consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalityRates {
    pub crime_cost_per_unit: f64,
    pub health_cost_per_unit: f64,
}

impl ExternalityRates {
    pub fn new(crime_cost_per_unit: f64, health_cost_per_unit: f64) -> Self {
        Self {
            crime_cost_per_unit,
            health_cost_per_unit,
        }
    }

    /// Combined marginal externality.
    pub fn per_unit(&self) -> f64 {
        self.crime_cost_per_unit + self.health_cost_per_unit
    }

    pub fn with_crime(self, crime_cost_per_unit: f64) -> Self {
        Self {
            crime_cost_per_unit,
            ..self
        }
    }

    pub fn with_health(self, health_cost_per_unit: f64) -> Self {
        Self {
            health_cost_per_unit,
            ..self
        }
    }

    pub fn externality_cost(&self, total_units: f64) -> f64 {
        externality_cost(total_units, self)
    }
}

impl Default for ExternalityRates {
    fn default() -> Self {
        Self::new(2.50, 1.50)
    }
}

/// Social cost of `total_units` sold. Strictly linear in quantity.
pub fn externality_cost(total_units: f64, rates: &ExternalityRates) -> f64 {
    total_units * rates.per_unit()
}

impl WelfareReport {
    /// Welfare view of an outcome already evaluated with some rates.
    pub fn from_outcome(outcome: &OutcomeReport) -> Self {
        Self {
            consumer_surplus: outcome.consumer_surplus,
            producer_surplus: outcome.producer_surplus,
            externality_cost: outcome.externality_cost,
            social_welfare: outcome.social_welfare,
            total_units: outcome.total_units,
            attendance: outcome.attendance,
        }
    }
}

// ─── Model welfare ──────────────────────────────────────────────────────────

impl Model {
    /// Aggregate consumer surplus, `attendance / λ`.
    ///
    /// Concession surplus is already folded into attendance through net cost,
    /// so per-segment concession surplus is not added on top.
    pub fn consumer_surplus(&self, ticket_price: f64, concession_price: f64) -> f64 {
        consumer_surplus_from_attendance(
            self.total_attendance(ticket_price, concession_price),
            self.params().ticket_price_sensitivity,
        )
    }

    /// Venue profit at the given prices.
    pub fn producer_surplus(&self, ticket_price: f64, concession_price: f64) -> f64 {
        self.stadium_revenue(ticket_price, concession_price).profit
    }

    /// Welfare decomposition for explicit externality rates.
    pub fn social_welfare(
        &self,
        ticket_price: f64,
        concession_price: f64,
        rates: &ExternalityRates,
    ) -> WelfareReport {
        WelfareReport::from_outcome(&self.evaluate(ticket_price, concession_price, rates))
    }

    /// Surplus (CS + PS) lost at `current` relative to `reference`.
    ///
    /// Positive when `current` is worse. Externalities are excluded.
    pub fn deadweight_loss(&self, current: PricingPoint, reference: PricingPoint) -> f64 {
        let surplus = |point: PricingPoint| {
            let outcome = self.stadium_revenue(point.ticket_price, point.concession_price);
            outcome.consumer_surplus + outcome.producer_surplus
        };
        surplus(reference) - surplus(current)
    }
}

pub(crate) fn consumer_surplus_from_attendance(attendance: f64, sensitivity: f64) -> f64 {
    attendance / sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model::with_defaults().expect("test: default model")
    }

    #[test]
    fn externality_is_exactly_linear() {
        let rates = ExternalityRates::default();
        for units in [0.0, 1.0, 1234.5, 98_765.0] {
            assert_eq!(externality_cost(2.0 * units, &rates), 2.0 * externality_cost(units, &rates));
        }
        assert_eq!(rates.externality_cost(1000.0), 4000.0);
    }

    #[test]
    fn welfare_identity_holds() {
        let model = model();
        let rates = ExternalityRates::new(3.0, 2.0);
        let w = model.social_welfare(85.0, 11.0, &rates);
        let expected = w.consumer_surplus + w.producer_surplus - w.externality_cost;
        assert!((w.social_welfare - expected).abs() < 1e-6);
        assert!((w.externality_cost - 5.0 * w.total_units).abs() < 1e-6);
    }

    #[test]
    fn rates_do_not_leak_between_calls() {
        let model = model();
        let before = model.social_welfare(80.0, 12.5, &model.default_externality_rates());
        let _ = model.social_welfare(80.0, 12.5, &ExternalityRates::new(100.0, 100.0));
        let after = model.social_welfare(80.0, 12.5, &model.default_externality_rates());
        assert_eq!(before, after);
    }

    #[test]
    fn higher_rates_lower_welfare_only_through_externality() {
        let model = model();
        let low = model.social_welfare(80.0, 12.5, &ExternalityRates::default());
        let high = model.social_welfare(80.0, 12.5, &ExternalityRates::default().with_crime(10.0));
        assert_eq!(low.consumer_surplus, high.consumer_surplus);
        assert_eq!(low.producer_surplus, high.producer_surplus);
        assert!(high.social_welfare < low.social_welfare);
    }

    #[test]
    fn consumer_surplus_is_attendance_over_lambda() {
        let model = model();
        let cs = model.consumer_surplus(80.0, 12.5);
        let attendance = model.total_attendance(80.0, 12.5);
        assert!((cs - attendance / model.params().ticket_price_sensitivity).abs() < 1e-6);
    }

    #[test]
    fn deadweight_loss_zero_against_itself() {
        let model = model();
        let point = PricingPoint::new(80.0, 12.5);
        assert_eq!(model.deadweight_loss(point, point), 0.0);
    }

    #[test]
    fn deadweight_loss_sign_follows_surplus() {
        let model = model();
        let reference = PricingPoint::new(80.0, 12.5);
        let gouged = PricingPoint::new(180.0, 25.0);
        assert!(model.deadweight_loss(gouged, reference) > 0.0);
        assert!(model.deadweight_loss(reference, gouged) < 0.0);
    }
}
