// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Value objects passed between the engines.

use crate::demand::SegmentDemand;
use serde::{Deserialize, Serialize};

// ─── Pricing Point ──────────────────────────────────────────────────────────

/// A ticket price and a concession price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingPoint {
    pub ticket_price: f64,
    pub concession_price: f64,
}

impl PricingPoint {
    pub fn new(ticket_price: f64, concession_price: f64) -> Self {
        Self {
            ticket_price,
            concession_price,
        }
    }
}

// ─── Outcome Report ─────────────────────────────────────────────────────────

/// Everything the model derives from one pricing point.
///
/// Recomputed on demand, never mutated. Identities that hold for every report:
/// `total_revenue = ticket_revenue + concession_revenue`,
/// `total_cost = ticket_cost + concession_cost + internalized_cost`,
/// `profit = total_revenue - total_cost`,
/// `social_welfare = consumer_surplus + producer_surplus - externality_cost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub ticket_price: f64,
    pub concession_price: f64,
    pub attendance: f64,
    /// Aggregate units per attendee (0 for an empty venue).
    pub units_per_fan: f64,
    pub total_units: f64,

    pub ticket_revenue: f64,
    /// Venue's concession revenue net of sales and excise tax.
    pub concession_revenue: f64,
    pub total_revenue: f64,

    pub ticket_cost: f64,
    pub concession_cost: f64,
    /// Convex congestion cost borne by the venue, `k·(units/1000)^2`.
    pub internalized_cost: f64,
    pub total_cost: f64,
    pub profit: f64,

    /// Collected for the state; informational, not part of profit.
    pub sales_tax_revenue: f64,
    pub excise_tax_revenue: f64,

    pub consumer_surplus: f64,
    pub producer_surplus: f64,
    pub externality_cost: f64,
    pub social_welfare: f64,

    pub segments: Vec<SegmentDemand>,
}

impl OutcomeReport {
    /// Segment breakdown by name.
    pub fn segment(&self, name: &str) -> Option<&SegmentDemand> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// Share of attendance coming from the named segment.
    pub fn attendance_share(&self, name: &str) -> Option<f64> {
        let seg = self.segment(name)?;
        if self.attendance > 0.0 {
            Some(seg.attendance / self.attendance)
        } else {
            Some(0.0)
        }
    }

    pub fn pricing_point(&self) -> PricingPoint {
        PricingPoint::new(self.ticket_price, self.concession_price)
    }

    /// Every numeric field, for finiteness checks and tabulation.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 19] {
        [
            ("ticket_price", self.ticket_price),
            ("concession_price", self.concession_price),
            ("attendance", self.attendance),
            ("units_per_fan", self.units_per_fan),
            ("total_units", self.total_units),
            ("ticket_revenue", self.ticket_revenue),
            ("concession_revenue", self.concession_revenue),
            ("total_revenue", self.total_revenue),
            ("ticket_cost", self.ticket_cost),
            ("concession_cost", self.concession_cost),
            ("internalized_cost", self.internalized_cost),
            ("total_cost", self.total_cost),
            ("profit", self.profit),
            ("sales_tax_revenue", self.sales_tax_revenue),
            ("excise_tax_revenue", self.excise_tax_revenue),
            ("consumer_surplus", self.consumer_surplus),
            ("producer_surplus", self.producer_surplus),
            ("externality_cost", self.externality_cost),
            ("social_welfare", self.social_welfare),
        ]
    }
}

// ─── Welfare Report ─────────────────────────────────────────────────────────

/// Welfare decomposition at one pricing point for one set of externality rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelfareReport {
    pub consumer_surplus: f64,
    pub producer_surplus: f64,
    pub externality_cost: f64,
    pub social_welfare: f64,
    pub total_units: f64,
    pub attendance: f64,
}
