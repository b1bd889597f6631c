// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Demand and surplus engine.
//!
//! Each segment maximizes `α·ln(B + 1) - P·B` over concession units `B`
//! subject to `B <= B_max`. Concession demand and the exact concession
//! surplus both come from that one utility function. Attendance responds to
//! the *net cost* of a visit, `ticket_price - CS_concession`, so concession
//! prices move attendance without any assumed cross-price elasticity.

use crate::config::ModelParameters;
use crate::segment::ConsumerSegment;
use serde::{Deserialize, Serialize};

/// Prices at or below this are treated as "free".
pub const FREE_PRICE_THRESHOLD: f64 = 0.01;

// ---------------------------------------------------------------------------
// Per-person quantities
// ---------------------------------------------------------------------------

/// Concession units bought by one member of `segment` at `price`.
///
/// Interior optimum from the FOC `α / (B + 1) = P`, clamped to `[0, B_max]`.
/// A free good switches to the open-bar constant for segments that drink at
/// all, which sidesteps the `α / 0` singularity.
pub fn units_demanded(segment: &ConsumerSegment, price: f64, params: &ModelParameters) -> f64 {
    if price <= FREE_PRICE_THRESHOLD {
        return if segment.preference_weight > params.open_bar_alpha_threshold {
            params.open_bar_units
        } else {
            0.0
        };
    }
    (segment.preference_weight / price - 1.0).clamp(0.0, params.max_units_per_person)
}

/// Exact concession consumer surplus per person.
///
/// * `α <= P`: buys nothing, `CS = 0`
/// * `α/P - 1 <= B_max`: `CS = α·ln(α/P) - (α - P)`
/// * otherwise capped at `B_max`: `CS = α·ln(B_max + 1) - P·B_max`
///
/// The three branches meet continuously at both boundaries.
pub fn concession_surplus(segment: &ConsumerSegment, price: f64, max_units: f64) -> f64 {
    let alpha = segment.preference_weight;
    if alpha <= price {
        return 0.0;
    }
    if price <= 0.0 || alpha / price - 1.0 > max_units {
        return alpha * (max_units + 1.0).ln() - price * max_units;
    }
    alpha * (alpha / price).ln() - (alpha - price)
}

/// Effective cost of attending once concession surplus is netted out.
pub fn net_cost(
    segment: &ConsumerSegment,
    ticket_price: f64,
    concession_price: f64,
    params: &ModelParameters,
) -> f64 {
    ticket_price - concession_surplus(segment, concession_price, params.max_units_per_person)
}

/// Attendance of one segment before the venue capacity is applied.
///
/// Semi-log in the deviation of net cost from its baseline value, so every
/// segment attends at `capacity · occupancy · share` at the baseline prices.
pub fn raw_attendance(
    segment: &ConsumerSegment,
    ticket_price: f64,
    concession_price: f64,
    baseline_net_cost: f64,
    params: &ModelParameters,
) -> f64 {
    let deviation = net_cost(segment, ticket_price, concession_price, params) - baseline_net_cost;
    params.capacity_f64()
        * params.reference_occupancy
        * segment.share
        * (-params.ticket_price_sensitivity * deviation).exp()
}

// ---------------------------------------------------------------------------
// Crowd profile
// ---------------------------------------------------------------------------

/// Demand of one segment after capacity scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDemand {
    pub name: String,
    pub attendance: f64,
    pub units_per_fan: f64,
    pub total_units: f64,
    pub concession_surplus_per_fan: f64,
    pub net_cost: f64,
}

/// Segment demands at one pricing point, scaled to fit the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdProfile {
    pub segments: Vec<SegmentDemand>,
    /// Uniform scale applied to every segment, `min(1, capacity / raw_total)`.
    pub capacity_scale: f64,
    /// Total attendance; exactly the capacity when the venue is full.
    pub attendance: f64,
}

impl CrowdProfile {
    /// Evaluate every segment at the given prices.
    ///
    /// `baseline_net_costs` must be aligned with `segments`.
    pub fn evaluate(
        segments: &[ConsumerSegment],
        baseline_net_costs: &[f64],
        params: &ModelParameters,
        ticket_price: f64,
        concession_price: f64,
    ) -> Self {
        let raw: Vec<f64> = segments
            .iter()
            .zip(baseline_net_costs)
            .map(|(segment, &baseline)| {
                raw_attendance(segment, ticket_price, concession_price, baseline, params)
            })
            .collect();
        let raw_total: f64 = raw.iter().sum();
        let capacity = params.capacity_f64();
        let (capacity_scale, attendance, scaled) = if raw_total > capacity {
            let scale = capacity / raw_total;
            let mut scaled: Vec<f64> = raw.iter().map(|r| r * scale).collect();
            fit_to_capacity(&mut scaled, capacity);
            (scale, capacity, scaled)
        } else {
            (1.0, raw_total, raw)
        };

        let segments = segments
            .iter()
            .zip(scaled)
            .map(|(segment, attendance)| {
                let units_per_fan = units_demanded(segment, concession_price, params);
                let surplus = concession_surplus(
                    segment,
                    concession_price,
                    params.max_units_per_person,
                );
                SegmentDemand {
                    name: segment.name.clone(),
                    attendance,
                    units_per_fan,
                    total_units: attendance * units_per_fan,
                    concession_surplus_per_fan: surplus,
                    net_cost: ticket_price - surplus,
                }
            })
            .collect();

        Self {
            segments,
            capacity_scale,
            attendance,
        }
    }

    pub fn total_attendance(&self) -> f64 {
        self.attendance
    }

    pub fn total_units(&self) -> f64 {
        self.segments.iter().map(|s| s.total_units).sum()
    }
}

/// Trim rounding overshoot from the largest segment until the segments sum
/// to at most `capacity`.
fn fit_to_capacity(attendance: &mut [f64], capacity: f64) {
    let Some(largest) = attendance
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
    else {
        return;
    };
    loop {
        let total: f64 = attendance.iter().sum();
        let current = attendance[largest];
        if total <= capacity || current <= 0.0 {
            return;
        }
        // Step at least one ulp so the loop always makes progress.
        let one_ulp_down = f64::from_bits(current.to_bits() - 1);
        attendance[largest] = (current - (total - capacity)).min(one_ulp_down).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::default_segments;

    fn drinker() -> ConsumerSegment {
        ConsumerSegment::new("Drinker", 0.4, 43.75)
    }

    fn non_drinker() -> ConsumerSegment {
        ConsumerSegment::new("Non-Drinker", 0.6, 1.0)
    }

    #[test]
    fn drinker_buys_two_and_a_half_at_baseline() {
        let params = ModelParameters::default();
        let units = units_demanded(&drinker(), 12.5, &params);
        assert!((units - 2.5).abs() < 1e-12);
    }

    #[test]
    fn non_drinker_buys_nothing() {
        let params = ModelParameters::default();
        assert_eq!(units_demanded(&non_drinker(), 12.5, &params), 0.0);
        assert_eq!(units_demanded(&non_drinker(), FREE_PRICE_THRESHOLD, &params), 0.0);
    }

    #[test]
    fn free_good_uses_open_bar_constant() {
        let params = ModelParameters::default();
        assert_eq!(units_demanded(&drinker(), 0.0, &params), params.open_bar_units);
        assert_eq!(units_demanded(&drinker(), 0.01, &params), params.open_bar_units);
    }

    #[test]
    fn demand_capped_at_max() {
        let params = ModelParameters::default();
        assert_eq!(units_demanded(&drinker(), 1.0, &params), params.max_units_per_person);
    }

    #[test]
    fn demand_non_increasing_in_price() {
        let params = ModelParameters::default();
        let seg = drinker();
        let mut last = f64::INFINITY;
        let mut price = 0.02;
        while price < 60.0 {
            let units = units_demanded(&seg, price, &params);
            assert!(units <= last, "demand rose at {price}");
            last = units;
            price += 0.05;
        }
    }

    #[test]
    fn interior_surplus_matches_closed_form() {
        let alpha: f64 = 43.75;
        let p: f64 = 12.5;
        let expected = alpha * (alpha / p).ln() - (alpha - p);
        let cs = concession_surplus(&drinker(), p, 10.0);
        assert!((cs - expected).abs() < 1e-9);
        assert!((cs - 23.56).abs() < 0.01);
    }

    #[test]
    fn capped_surplus_matches_closed_form() {
        let expected = 43.75 * 11.0_f64.ln() - 10.0;
        let cs = concession_surplus(&drinker(), 1.0, 10.0);
        assert!((cs - expected).abs() < 1e-9);
    }

    #[test]
    fn non_buyer_surplus_is_zero() {
        for p in [1.0, 5.0, 12.5, 20.0] {
            assert_eq!(concession_surplus(&non_drinker(), p, 10.0), 0.0);
        }
    }

    #[test]
    fn surplus_continuous_at_branch_boundaries() {
        let seg = drinker();
        let eps = 1e-9;
        // alpha == price
        let at = seg.preference_weight;
        let below = concession_surplus(&seg, at - eps, 10.0);
        let above = concession_surplus(&seg, at + eps, 10.0);
        assert!(below.abs() < 1e-6 && above == 0.0);

        // alpha / price - 1 == B_max
        let kink = seg.preference_weight / 11.0;
        let capped = concession_surplus(&seg, kink - eps, 10.0);
        let interior = concession_surplus(&seg, kink + eps, 10.0);
        assert!((capped - interior).abs() < 1e-6, "{capped} vs {interior}");
    }

    #[test]
    fn surplus_non_negative_and_decreasing() {
        let seg = drinker();
        let mut last = f64::INFINITY;
        let mut price = 0.05;
        while price < 60.0 {
            let cs = concession_surplus(&seg, price, 10.0);
            assert!(cs >= 0.0);
            assert!(cs <= last + 1e-12);
            last = cs;
            price += 0.05;
        }
    }

    #[test]
    fn baseline_attendance_at_reference_occupancy() {
        let params = ModelParameters::default();
        let segments = default_segments();
        let baseline: Vec<f64> = segments
            .iter()
            .map(|s| net_cost(s, params.base_ticket_price, params.base_concession_price, &params))
            .collect();
        let crowd = CrowdProfile::evaluate(&segments, &baseline, &params, 80.0, 12.5);
        let expected = params.capacity_f64() * params.reference_occupancy;
        assert!((crowd.total_attendance() - expected).abs() < 1e-6);
        assert_eq!(crowd.capacity_scale, 1.0);
    }

    #[test]
    fn non_drinker_attendance_ignores_concession_price() {
        let params = ModelParameters::default();
        let seg = non_drinker();
        let baseline = net_cost(&seg, 80.0, 12.5, &params);
        let a = raw_attendance(&seg, 80.0, 10.0, baseline, &params);
        let b = raw_attendance(&seg, 80.0, 20.0, baseline, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn capacity_scaling_keeps_segments_consistent() {
        let params = ModelParameters::default();
        let segments = default_segments();
        let baseline: Vec<f64> = segments
            .iter()
            .map(|s| net_cost(s, 80.0, 12.5, &params))
            .collect();
        let crowd = CrowdProfile::evaluate(&segments, &baseline, &params, 5.0, 1.0);
        assert!(crowd.capacity_scale < 1.0);
        assert_eq!(crowd.total_attendance(), params.capacity_f64());
        let summed: f64 = crowd.segments.iter().map(|s| s.attendance).sum();
        assert!(summed <= params.capacity_f64());
        for seg in &crowd.segments {
            assert!((seg.total_units - seg.attendance * seg.units_per_fan).abs() < 1e-9);
        }
    }

    #[test]
    fn full_venue_never_overshoots_by_rounding() {
        let params = ModelParameters::default();
        let segments = default_segments();
        let baseline: Vec<f64> = segments
            .iter()
            .map(|s| net_cost(s, 80.0, 12.5, &params))
            .collect();
        let cap = params.capacity_f64();
        let mut t = 3.5;
        while t < 60.0 {
            let crowd = CrowdProfile::evaluate(&segments, &baseline, &params, t, 4.29);
            let summed: f64 = crowd.segments.iter().map(|s| s.attendance).sum();
            assert!(crowd.total_attendance() <= cap, "total over capacity at {t}");
            assert!(summed <= cap, "segments sum {summed} over capacity at {t}");
            for seg in &crowd.segments {
                assert_eq!(seg.total_units, seg.attendance * seg.units_per_fan);
            }
            t += 0.37;
        }
    }

    #[test]
    fn trimming_takes_excess_from_largest_segment() {
        let raw = [3.0, 7.0, 11.0];
        let capacity = 13.0;
        let scale = capacity / raw.iter().sum::<f64>();
        let mut attendance = raw.map(|r| r * scale);
        assert!(attendance.iter().sum::<f64>() > capacity);

        fit_to_capacity(&mut attendance, capacity);
        assert!(attendance.iter().sum::<f64>() <= capacity);
        assert_eq!(attendance[0], 3.0 * scale);
        assert_eq!(attendance[1], 7.0 * scale);
        assert!(attendance[2] < 11.0 * scale);
    }
}
