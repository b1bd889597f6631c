// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Price optimizer.
//!
//! Bounded, derivative-free and deterministic. A coarse grid locates the best
//! bracket, then golden-section search refines it. The joint problem is solved
//! as a nested 1-D search: the outer search runs over the concession price and
//! the inner search finds the best ticket price for each trial.
//!
//! Profit is unimodal in the ticket price for the default calibration, but
//! social welfare is not at low concession prices, which is why the grid pass
//! precedes the refinement instead of a plain bracketing search.

use crate::model::Model;
use crate::types::{OutcomeReport, PricingPoint};
use crate::welfare::ExternalityRates;
use serde::{Deserialize, Serialize};

/// Objective value returned for trial points with a negative price.
pub const INFEASIBLE_PENALTY: f64 = 1e10;

const GRID_POINTS: usize = 48;
const GOLDEN_TOLERANCE: f64 = 1e-7;
const GOLDEN_MAX_ITERATIONS: usize = 200;
const INV_PHI: f64 = 0.618_033_988_749_894_8;

// ---------------------------------------------------------------------------
// Scalar search
// ---------------------------------------------------------------------------

/// Minimize `f` over `[lo, hi]`, returning `(x, f(x))`.
///
/// Never fails. If the refinement does no better than the grid, the best grid
/// point is returned.
pub fn minimize_scalar<F>(mut f: F, lo: f64, hi: f64) -> (f64, f64)
where
    F: FnMut(f64) -> f64,
{
    if hi <= lo {
        return (lo, f(lo));
    }

    let step = (hi - lo) / (GRID_POINTS - 1) as f64;
    let mut best_index = 0;
    let mut best_value = f64::INFINITY;
    for i in 0..GRID_POINTS {
        let value = f(lo + step * i as f64);
        if value < best_value {
            best_value = value;
            best_index = i;
        }
    }
    let grid_x = lo + step * best_index as f64;

    let mut a = lo + step * best_index.saturating_sub(1) as f64;
    let mut b = (lo + step * (best_index + 1) as f64).min(hi);
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    for _ in 0..GOLDEN_MAX_ITERATIONS {
        if (b - a).abs() <= GOLDEN_TOLERANCE {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d);
        }
    }

    let x = 0.5 * (a + b);
    let fx = f(x);
    if fx <= best_value {
        (x, fx)
    } else {
        (grid_x, best_value)
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a supplied concession price is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PriceConstraint {
    /// Do not exceed: `min(cap, unconstrained optimum)`.
    Ceiling(f64),
    /// Pin the price exactly.
    Fixed(f64),
}

impl PriceConstraint {
    pub fn value(&self) -> f64 {
        match *self {
            PriceConstraint::Ceiling(v) | PriceConstraint::Fixed(v) => v,
        }
    }
}

/// What the search maximizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Objective {
    Profit,
    SocialWelfare(ExternalityRates),
}

/// Optimizer result: the chosen prices and the full outcome there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSolution {
    pub ticket_price: f64,
    pub concession_price: f64,
    pub outcome: OutcomeReport,
}

impl PricingSolution {
    pub fn pricing_point(&self) -> PricingPoint {
        PricingPoint::new(self.ticket_price, self.concession_price)
    }
}

// ---------------------------------------------------------------------------
// Model optimizer
// ---------------------------------------------------------------------------

impl Model {
    /// Negative profit, or [`INFEASIBLE_PENALTY`] for a negative trial price.
    pub fn profit_objective(&self, ticket_price: f64, concession_price: f64) -> f64 {
        self.objective_value(ticket_price, concession_price, &Objective::Profit)
    }

    fn objective_value(&self, ticket_price: f64, concession_price: f64, objective: &Objective) -> f64 {
        if ticket_price < 0.0 || concession_price < 0.0 {
            return INFEASIBLE_PENALTY;
        }
        let value = match objective {
            Objective::Profit => -self.stadium_revenue(ticket_price, concession_price).profit,
            Objective::SocialWelfare(rates) => {
                -self.evaluate(ticket_price, concession_price, rates).social_welfare
            }
        };
        if value.is_finite() {
            value
        } else {
            INFEASIBLE_PENALTY
        }
    }

    /// Best ticket price for a fixed concession price.
    pub fn optimal_ticket_price(&self, concession_price: f64, objective: &Objective) -> f64 {
        let params = self.params();
        let (ticket_price, _) = minimize_scalar(
            |t| self.objective_value(t, concession_price, objective),
            params.ticket_cost,
            params.ticket_price_max,
        );
        ticket_price
    }

    fn joint_optimum(&self, objective: &Objective) -> PricingPoint {
        let params = self.params();
        let (concession_price, _) = minimize_scalar(
            |p| {
                let t = self.optimal_ticket_price(p, objective);
                self.objective_value(t, p, objective)
            },
            params.concession_price_floor(),
            params.concession_price_max,
        );
        PricingPoint::new(
            self.optimal_ticket_price(concession_price, objective),
            concession_price,
        )
    }

    /// Unconstrained profit optimum, computed on first use and memoized.
    pub fn unconstrained_optimum(&self) -> &PricingSolution {
        self.unconstrained.get_or_init(|| {
            let point = self.joint_optimum(&Objective::Profit);
            let outcome = self.stadium_revenue(point.ticket_price, point.concession_price);
            tracing::info!(
                target: "stadium_engine::optimizer",
                ticket_price = point.ticket_price,
                concession_price = point.concession_price,
                profit = outcome.profit,
                "unconstrained optimum"
            );
            PricingSolution {
                ticket_price: point.ticket_price,
                concession_price: point.concession_price,
                outcome,
            }
        })
    }

    /// Profit-maximizing prices, optionally under a concession constraint.
    ///
    /// A ceiling at or above the unconstrained concession optimum returns the
    /// unconstrained solution unchanged. A binding ceiling, or a fixed price,
    /// pins the concession price and re-optimizes the ticket price. Negative
    /// constraint values are treated as zero; a NaN or infinite value is
    /// ignored and the unconstrained solution is returned.
    pub fn optimal_pricing(&self, constraint: Option<PriceConstraint>) -> PricingSolution {
        let constraint = constraint.filter(|c| {
            let finite = c.value().is_finite();
            if !finite {
                tracing::warn!(
                    target: "stadium_engine::optimizer",
                    constraint = ?c,
                    "non-finite constraint ignored"
                );
            }
            finite
        });
        let concession_price = match constraint {
            None => return self.unconstrained_optimum().clone(),
            Some(PriceConstraint::Ceiling(cap)) => {
                let cap = cap.max(0.0);
                let unconstrained = self.unconstrained_optimum();
                if cap >= unconstrained.concession_price {
                    tracing::debug!(
                        target: "stadium_engine::optimizer",
                        ceiling = cap,
                        optimum = unconstrained.concession_price,
                        "ceiling does not bind"
                    );
                    return unconstrained.clone();
                }
                cap
            }
            Some(PriceConstraint::Fixed(price)) => price.max(0.0),
        };

        let ticket_price = self.optimal_ticket_price(concession_price, &Objective::Profit);
        tracing::debug!(
            target: "stadium_engine::optimizer",
            ticket_price,
            concession_price,
            "constrained optimum"
        );
        PricingSolution {
            ticket_price,
            concession_price,
            outcome: self.stadium_revenue(ticket_price, concession_price),
        }
    }

    /// Prices maximizing social welfare for the given externality rates.
    pub fn social_optimum(&self, rates: &ExternalityRates) -> PricingSolution {
        let point = self.joint_optimum(&Objective::SocialWelfare(*rates));
        let outcome = self.evaluate(point.ticket_price, point.concession_price, rates);
        tracing::info!(
            target: "stadium_engine::optimizer",
            ticket_price = point.ticket_price,
            concession_price = point.concession_price,
            social_welfare = outcome.social_welfare,
            "social optimum"
        );
        PricingSolution {
            ticket_price: point.ticket_price,
            concession_price: point.concession_price,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model::with_defaults().expect("test: default model")
    }

    #[test]
    fn minimizes_parabola() {
        let (x, fx) = minimize_scalar(|x| (x - 3.2) * (x - 3.2) + 1.0, 0.0, 10.0);
        assert!((x - 3.2).abs() < 1e-5, "x = {x}");
        assert!((fx - 1.0).abs() < 1e-9);
    }

    #[test]
    fn minimum_at_boundary() {
        let (x, _) = minimize_scalar(|x| x, 2.0, 5.0);
        assert!((x - 2.0).abs() < 1e-5);
        let (x, _) = minimize_scalar(|x| -x, 2.0, 5.0);
        assert!((x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn finds_global_of_two_wells() {
        let f = |x: f64| ((x - 1.0).powi(2)).min((x - 8.0).powi(2) - 0.5);
        let (x, _) = minimize_scalar(f, 0.0, 10.0);
        assert!((x - 8.0).abs() < 1e-4, "x = {x}");
    }

    #[test]
    fn negative_trial_penalized() {
        let model = model();
        assert_eq!(model.profit_objective(-1.0, 12.5), INFEASIBLE_PENALTY);
        assert_eq!(model.profit_objective(80.0, -0.5), INFEASIBLE_PENALTY);
        assert!(model.profit_objective(80.0, 12.5) < 0.0);
    }

    #[test]
    fn unconstrained_near_observed_prices() {
        let solution = model().optimal_pricing(None);
        assert!((solution.ticket_price - 80.0).abs() < 3.0, "T = {}", solution.ticket_price);
        assert!(
            (11.5..=14.5).contains(&solution.concession_price),
            "P = {}",
            solution.concession_price
        );
    }

    #[test]
    fn optimum_is_memoized() {
        let model = model();
        let first = model.unconstrained_optimum() as *const PricingSolution;
        let second = model.unconstrained_optimum() as *const PricingSolution;
        assert_eq!(first, second);
    }

    #[test]
    fn slack_ceiling_is_identity() {
        let model = model();
        let base = model.optimal_pricing(None);
        let capped = model.optimal_pricing(Some(PriceConstraint::Ceiling(base.concession_price + 0.5)));
        assert_eq!(base, capped);
    }

    #[test]
    fn binding_ceiling_pins_price() {
        let solution = model().optimal_pricing(Some(PriceConstraint::Ceiling(7.0)));
        assert_eq!(solution.concession_price, 7.0);
        assert!(solution.ticket_price > 100.0, "T = {}", solution.ticket_price);
    }

    #[test]
    fn fixed_pins_even_above_optimum() {
        let solution = model().optimal_pricing(Some(PriceConstraint::Fixed(20.0)));
        assert_eq!(solution.concession_price, 20.0);
        assert!((solution.outcome.units_per_fan - 0.427).abs() < 0.01);
    }

    #[test]
    fn negative_constraint_clamped_to_zero() {
        let solution = model().optimal_pricing(Some(PriceConstraint::Fixed(-4.0)));
        assert_eq!(solution.concession_price, 0.0);
        assert!(solution.outcome.numeric_fields().iter().all(|(_, v)| v.is_finite()));
    }

    #[test]
    fn non_finite_constraint_is_ignored() {
        let model = model();
        let base = model.optimal_pricing(None);
        for constraint in [
            PriceConstraint::Ceiling(f64::NAN),
            PriceConstraint::Fixed(f64::NAN),
            PriceConstraint::Ceiling(f64::NEG_INFINITY),
            PriceConstraint::Fixed(f64::INFINITY),
        ] {
            assert_eq!(model.optimal_pricing(Some(constraint)), base, "{constraint:?}");
        }
    }

    #[test]
    fn social_optimum_beats_profit_optimum_on_welfare() {
        let model = model();
        let rates = ExternalityRates::default();
        let social = model.social_optimum(&rates);
        let profit = model.optimal_pricing(None);
        let profit_sw = model.social_welfare(profit.ticket_price, profit.concession_price, &rates);
        assert!(social.outcome.social_welfare >= profit_sw.social_welfare - 1e-6);
        assert!(social.ticket_price < profit.ticket_price);
    }
}
