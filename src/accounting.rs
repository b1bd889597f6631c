// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Revenue and cost accounting.
//!
//! Turns a crowd profile into venue revenue, costs, profit, and the tax split.
//! Sales tax is included in the posted concession price and excise is levied
//! per unit; both are backed out before the venue books concession revenue.

use crate::config::ModelParameters;
use crate::model::Model;
use crate::types::OutcomeReport;
use crate::welfare::{self, ExternalityRates};

/// Concession price the venue keeps per unit after sales tax and excise.
pub fn net_concession_price(concession_price: f64, params: &ModelParameters) -> f64 {
    concession_price / (1.0 + params.sales_tax_rate) - params.excise_tax
}

/// Convex congestion cost borne by the venue, `k · (units / 1000)^2`.
pub fn internalized_cost(total_units: f64, params: &ModelParameters) -> f64 {
    let thousands = total_units / 1000.0;
    params.internalized_cost_coefficient * thousands * thousands
}

impl Model {
    /// Full outcome at one pricing point, welfare at the model's default rates.
    pub fn stadium_revenue(&self, ticket_price: f64, concession_price: f64) -> OutcomeReport {
        self.evaluate(
            ticket_price,
            concession_price,
            &self.default_externality_rates(),
        )
    }

    /// Full outcome at one pricing point for explicit externality rates.
    pub fn outcome_with_rates(
        &self,
        ticket_price: f64,
        concession_price: f64,
        rates: &ExternalityRates,
    ) -> OutcomeReport {
        self.evaluate(ticket_price, concession_price, rates)
    }

    pub(crate) fn evaluate(
        &self,
        ticket_price: f64,
        concession_price: f64,
        rates: &ExternalityRates,
    ) -> OutcomeReport {
        let params = self.params();
        let crowd = self.crowd(ticket_price, concession_price);
        let attendance = crowd.total_attendance();
        let total_units = crowd.total_units();
        let units_per_fan = if attendance > 0.0 {
            total_units / attendance
        } else {
            0.0
        };

        let ticket_revenue = ticket_price * attendance;
        let concession_revenue = net_concession_price(concession_price, params) * total_units;
        let total_revenue = ticket_revenue + concession_revenue;

        let ticket_cost = params.ticket_cost * attendance;
        let concession_cost = params.concession_cost * total_units;
        let internalized_cost = internalized_cost(total_units, params);
        let total_cost = ticket_cost + concession_cost + internalized_cost;
        let profit = total_revenue - total_cost;

        let sales_tax_revenue =
            (concession_price - concession_price / (1.0 + params.sales_tax_rate)) * total_units;
        let excise_tax_revenue = params.excise_tax * total_units;

        let consumer_surplus = welfare::consumer_surplus_from_attendance(
            attendance,
            params.ticket_price_sensitivity,
        );
        let producer_surplus = profit;
        let externality_cost = welfare::externality_cost(total_units, rates);
        let social_welfare = consumer_surplus + producer_surplus - externality_cost;

        OutcomeReport {
            ticket_price,
            concession_price,
            attendance,
            units_per_fan,
            total_units,
            ticket_revenue,
            concession_revenue,
            total_revenue,
            ticket_cost,
            concession_cost,
            internalized_cost,
            total_cost,
            profit,
            sales_tax_revenue,
            excise_tax_revenue,
            consumer_surplus,
            producer_surplus,
            externality_cost,
            social_welfare,
            segments: crowd.segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::DRINKER;

    fn model() -> Model {
        Model::with_defaults().expect("test: default model")
    }

    fn assert_identities(r: &OutcomeReport) {
        let tol = 1e-6 * (1.0 + r.total_revenue.abs());
        assert!((r.total_revenue - (r.ticket_revenue + r.concession_revenue)).abs() < tol);
        assert!(
            (r.total_cost - (r.ticket_cost + r.concession_cost + r.internalized_cost)).abs() < tol
        );
        assert!((r.profit - (r.total_revenue - r.total_cost)).abs() < tol);
        assert!(
            (r.social_welfare - (r.consumer_surplus + r.producer_surplus - r.externality_cost))
                .abs()
                < tol
        );
    }

    #[test]
    fn identities_hold_across_prices() {
        let model = model();
        for t in [3.5, 40.0, 80.0, 150.0, 200.0] {
            for p in [0.0, 2.1, 7.0, 12.5, 30.0] {
                assert_identities(&model.stadium_revenue(t, p));
            }
        }
    }

    #[test]
    fn baseline_matches_calibration() {
        let model = model();
        let r = model.stadium_revenue(80.0, 12.5);
        assert!((r.attendance - 46_537.0 * 0.85).abs() < 1.0);
        assert!((r.units_per_fan - 1.0).abs() < 1e-9);
        assert!(r.profit > 3.0e6 && r.profit < 3.4e6, "profit {}", r.profit);
    }

    #[test]
    fn net_price_backs_out_taxes() {
        let params = ModelParameters::default();
        let net = net_concession_price(12.5, &params);
        assert!((net - (12.5 / 1.08875 - 0.074)).abs() < 1e-12);
    }

    #[test]
    fn tax_split_reconciles_with_posted_price() {
        let model = model();
        let r = model.stadium_revenue(80.0, 12.5);
        let gross = r.concession_price * r.total_units;
        let reconstructed = r.concession_revenue + r.sales_tax_revenue + r.excise_tax_revenue;
        assert!((gross - reconstructed).abs() < 1e-6 * gross);
    }

    #[test]
    fn internalized_cost_is_convex() {
        let params = ModelParameters::default();
        let one = internalized_cost(10_000.0, &params);
        let two = internalized_cost(20_000.0, &params);
        assert!((two - 4.0 * one).abs() < 1e-6);
    }

    #[test]
    fn segment_breakdown_present() {
        let r = model().stadium_revenue(80.0, 12.5);
        assert_eq!(r.segments.len(), 2);
        let drinker = r.segment(DRINKER).expect("test: drinker segment");
        assert!((drinker.units_per_fan - 2.5).abs() < 1e-12);
        let share = r.attendance_share(DRINKER).expect("test: drinker share");
        assert!((share - 0.4).abs() < 1e-9);
    }

    #[test]
    fn prohibitive_price_sells_nothing() {
        let model = model();
        let r = model.stadium_revenue(80.0, model.params().ban_surrogate_price);
        assert_eq!(r.total_units, 0.0);
        assert_eq!(r.concession_revenue, 0.0);
        assert_eq!(r.internalized_cost, 0.0);
        assert!(r.numeric_fields().iter().all(|(_, v)| v.is_finite()));
    }
}
