// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Scenario runner.
//!
//! Evaluates named pricing policies against one model and tabulates the
//! results. Derived views (comparative statics, summary statistics) are free
//! functions over a [`ScenarioTable`].

use crate::config::{ConfigError, ModelParameters};
use crate::model::Model;
use crate::optimizer::PriceConstraint;
use crate::stats::MetricStats;
use crate::types::{OutcomeReport, WelfareReport};
use crate::welfare::ExternalityRates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario not found in table: {0}")]
    UnknownScenario(String),
    #[error("scenario table is empty")]
    EmptyTable,
    #[error("sensitivity analysis needs at least one value")]
    EmptyValues,
    #[error("unknown sensitivity parameter: {0}")]
    UnknownParameter(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Scenario names
// ---------------------------------------------------------------------------

pub const BASELINE: &str = "Baseline (Profit Max)";
pub const CURRENT_OBSERVED: &str = "Current Observed Prices";
pub const BEER_BAN: &str = "Beer Ban";
pub const SOCIAL_OPTIMUM: &str = "Social Optimum";

/// Ceiling used by `run_all_scenarios` callers that have no preference.
pub const DEFAULT_PRICE_CEILING: f64 = 8.0;

pub fn ceiling_scenario_name(ceiling: f64) -> String {
    format!("Price Ceiling (${ceiling:.2})")
}

pub fn floor_scenario_name(floor: f64) -> String {
    format!("Price Floor (${floor:.2})")
}

// ---------------------------------------------------------------------------
// Policies and records
// ---------------------------------------------------------------------------

/// A concession pricing policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScenarioPolicy {
    /// Unconstrained profit maximization.
    ProfitMax,
    /// Concession price pinned exactly.
    Fixed(f64),
    /// Concession price may not exceed the cap.
    Ceiling(f64),
    /// Concession price may not fall below the floor.
    Floor(f64),
    /// Both bounds given; the midpoint is applied as a ceiling.
    Band { min: f64, max: f64 },
    /// Concession good not sold; ticket price held at its base value.
    Ban,
    /// Both prices chosen to maximize social welfare.
    SocialOptimum,
}

/// Per-segment view of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentShare {
    pub name: String,
    pub attendance: f64,
    pub attendance_share: f64,
    pub units_per_fan: f64,
}

/// One row of the scenario table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario: String,
    pub policy: ScenarioPolicy,
    pub ticket_price: f64,
    /// `None` when the concession good is not sold.
    pub concession_price: Option<f64>,
    pub outcome: OutcomeReport,
    pub rates: ExternalityRates,
    pub segments: Vec<SegmentShare>,
}

impl ScenarioRecord {
    fn new(
        scenario: impl Into<String>,
        policy: ScenarioPolicy,
        concession_price: Option<f64>,
        outcome: OutcomeReport,
        rates: ExternalityRates,
    ) -> Self {
        let segments = outcome
            .segments
            .iter()
            .map(|s| SegmentShare {
                name: s.name.clone(),
                attendance: s.attendance,
                attendance_share: if outcome.attendance > 0.0 {
                    s.attendance / outcome.attendance
                } else {
                    0.0
                },
                units_per_fan: s.units_per_fan,
            })
            .collect();
        Self {
            scenario: scenario.into(),
            policy,
            ticket_price: outcome.ticket_price,
            concession_price,
            outcome,
            rates,
            segments,
        }
    }

    pub fn welfare(&self) -> WelfareReport {
        WelfareReport::from_outcome(&self.outcome)
    }

    pub fn segment(&self, name: &str) -> Option<&SegmentShare> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// Numeric metrics for tabulation. The concession price is omitted when
    /// the good is not sold.
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        self.outcome
            .numeric_fields()
            .into_iter()
            .filter_map(|(name, value)| match name {
                "concession_price" => self.concession_price.map(|p| (name, p)),
                _ => Some((name, value)),
            })
            .collect()
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics()
            .into_iter()
            .find(|(metric, _)| *metric == name)
            .map(|(_, value)| value)
    }
}

/// Ordered collection of scenario records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    pub records: Vec<ScenarioRecord>,
}

impl ScenarioTable {
    pub fn get(&self, scenario: &str) -> Option<&ScenarioRecord> {
        self.records.iter().find(|r| r.scenario == scenario)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: ScenarioRecord) {
        self.records.push(record);
    }
}

// ---------------------------------------------------------------------------
// Sensitivity and sweep rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    TicketPriceSensitivity,
    CrimeCost,
    HealthCost,
}

impl SensitivityParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TicketPriceSensitivity => "ticket_price_sensitivity",
            Self::CrimeCost => "crime_cost",
            Self::HealthCost => "health_cost",
        }
    }
}

impl fmt::Display for SensitivityParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensitivityParameter {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticket_price_sensitivity" => Ok(Self::TicketPriceSensitivity),
            "crime_cost" => Ok(Self::CrimeCost),
            "health_cost" => Ok(Self::HealthCost),
            other => Err(ScenarioError::UnknownParameter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub parameter: SensitivityParameter,
    pub value: f64,
    pub record: ScenarioRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeilingSweepRow {
    pub ceiling: f64,
    pub binding: bool,
    pub ticket_price: f64,
    pub concession_price: f64,
    pub attendance: f64,
    pub total_units: f64,
    pub profit: f64,
    pub welfare: WelfareReport,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Runs scenarios against a borrowed model.
pub struct ScenarioRunner<'a> {
    model: &'a Model,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Model {
        self.model
    }

    /// Evaluate one policy with the given externality rates.
    pub fn run_scenario(
        &self,
        name: &str,
        policy: ScenarioPolicy,
        rates: &ExternalityRates,
    ) -> ScenarioRecord {
        run_policy(self.model, name, policy, rates)
    }

    /// The standard battery: baseline, observed prices, ceiling, optional
    /// floor, ban, and social optimum.
    pub fn run_all_scenarios(
        &self,
        price_ceiling: f64,
        price_floor: Option<f64>,
        rates: &ExternalityRates,
    ) -> ScenarioTable {
        let params = self.model.params();
        let mut battery = vec![
            (BASELINE.to_string(), ScenarioPolicy::ProfitMax),
            (
                CURRENT_OBSERVED.to_string(),
                ScenarioPolicy::Fixed(params.base_concession_price),
            ),
            (
                ceiling_scenario_name(price_ceiling),
                ScenarioPolicy::Ceiling(price_ceiling),
            ),
        ];
        if let Some(floor) = price_floor {
            battery.push((floor_scenario_name(floor), ScenarioPolicy::Floor(floor)));
        }
        battery.push((BEER_BAN.to_string(), ScenarioPolicy::Ban));
        battery.push((SOCIAL_OPTIMUM.to_string(), ScenarioPolicy::SocialOptimum));

        let mut table = ScenarioTable::default();
        for (name, policy) in battery {
            table.push(self.run_scenario(&name, policy, rates));
        }
        tracing::info!(
            target: "stadium_engine::scenarios",
            scenarios = table.len(),
            crime = rates.crime_cost_per_unit,
            health = rates.health_cost_per_unit,
            "scenario battery complete"
        );
        table
    }

    /// Profit-maximizing scenario for each value of one parameter.
    ///
    /// Ticket price sensitivity changes the model itself, so each value gets a
    /// freshly built model; the runner's model is left untouched.
    pub fn sensitivity_analysis(
        &self,
        parameter: SensitivityParameter,
        values: &[f64],
        rates: &ExternalityRates,
    ) -> Result<Vec<SensitivityRow>, ScenarioError> {
        if values.is_empty() {
            return Err(ScenarioError::EmptyValues);
        }

        let mut rows = Vec::with_capacity(values.len());
        for &value in values {
            let name = format!("{parameter}={value}");
            let record = match parameter {
                SensitivityParameter::TicketPriceSensitivity => {
                    let params = ModelParameters {
                        ticket_price_sensitivity: value,
                        ..self.model.params().clone()
                    };
                    let model = Model::new(params, Some(self.model.segments().to_vec()))?;
                    run_policy(&model, &name, ScenarioPolicy::ProfitMax, rates)
                }
                SensitivityParameter::CrimeCost => {
                    self.run_scenario(&name, ScenarioPolicy::ProfitMax, &rates.with_crime(value))
                }
                SensitivityParameter::HealthCost => {
                    self.run_scenario(&name, ScenarioPolicy::ProfitMax, &rates.with_health(value))
                }
            };
            rows.push(SensitivityRow {
                parameter,
                value,
                record,
            });
        }
        tracing::debug!(target: "stadium_engine::scenarios", %parameter, rows = rows.len(), "sensitivity analysis");
        Ok(rows)
    }

    /// Profit-maximizing prices and welfare under each ceiling.
    pub fn ceiling_sweep(&self, ceilings: &[f64], rates: &ExternalityRates) -> Vec<CeilingSweepRow> {
        let optimum = self.model.unconstrained_optimum().concession_price;
        ceilings
            .iter()
            .map(|&ceiling| {
                let solution = self
                    .model
                    .optimal_pricing(Some(PriceConstraint::Ceiling(ceiling)));
                let welfare = self.model.social_welfare(
                    solution.ticket_price,
                    solution.concession_price,
                    rates,
                );
                CeilingSweepRow {
                    ceiling,
                    binding: ceiling.max(0.0) < optimum,
                    ticket_price: solution.ticket_price,
                    concession_price: solution.concession_price,
                    attendance: solution.outcome.attendance,
                    total_units: solution.outcome.total_units,
                    profit: solution.outcome.profit,
                    welfare,
                }
            })
            .collect()
    }
}

fn run_policy(
    model: &Model,
    name: &str,
    policy: ScenarioPolicy,
    rates: &ExternalityRates,
) -> ScenarioRecord {
    let params = model.params();
    let (ticket_price, concession_price) = match policy {
        ScenarioPolicy::Ban => {
            let outcome =
                model.outcome_with_rates(params.base_ticket_price, params.ban_surrogate_price, rates);
            tracing::debug!(target: "stadium_engine::scenarios", scenario = name, "concession good banned");
            return ScenarioRecord::new(name, policy, None, outcome, *rates);
        }
        ScenarioPolicy::SocialOptimum => {
            let solution = model.social_optimum(rates);
            (solution.ticket_price, solution.concession_price)
        }
        other => {
            let constraint = match other {
                ScenarioPolicy::Fixed(p) => Some(PriceConstraint::Fixed(p)),
                ScenarioPolicy::Ceiling(c) => Some(PriceConstraint::Ceiling(c)),
                ScenarioPolicy::Band { min, max } => {
                    Some(PriceConstraint::Ceiling(0.5 * (min + max)))
                }
                ScenarioPolicy::Floor(floor) => {
                    if model.unconstrained_optimum().concession_price < floor {
                        Some(PriceConstraint::Fixed(floor))
                    } else {
                        None
                    }
                }
                _ => None,
            };
            let solution = model.optimal_pricing(constraint);
            (solution.ticket_price, solution.concession_price)
        }
    };

    let outcome = model.outcome_with_rates(ticket_price, concession_price, rates);
    tracing::debug!(
        target: "stadium_engine::scenarios",
        scenario = name,
        ticket_price,
        concession_price,
        profit = outcome.profit,
        social_welfare = outcome.social_welfare,
        "scenario evaluated"
    );
    ScenarioRecord::new(name, policy, Some(concession_price), outcome, *rates)
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: String,
    pub value: f64,
    pub change: f64,
    /// Percent change; `None` when the baseline value is zero.
    pub pct_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeStaticsRow {
    pub scenario: String,
    pub deltas: Vec<MetricDelta>,
}

impl ComparativeStaticsRow {
    pub fn delta(&self, metric: &str) -> Option<&MetricDelta> {
        self.deltas.iter().find(|d| d.metric == metric)
    }
}

/// Deltas of every metric relative to the named baseline scenario.
///
/// Metrics missing from either record (the concession price of a ban) are
/// skipped.
pub fn calculate_comparative_statics(
    table: &ScenarioTable,
    baseline_scenario: &str,
) -> Result<Vec<ComparativeStaticsRow>, ScenarioError> {
    let baseline = table
        .get(baseline_scenario)
        .ok_or_else(|| ScenarioError::UnknownScenario(baseline_scenario.to_string()))?;

    Ok(table
        .iter()
        .map(|record| {
            let deltas = record
                .metrics()
                .into_iter()
                .filter_map(|(metric, value)| {
                    let base = baseline.metric(metric)?;
                    let change = value - base;
                    Some(MetricDelta {
                        metric: metric.to_string(),
                        value,
                        change,
                        pct_change: (base != 0.0).then(|| change / base * 100.0),
                    })
                })
                .collect();
            ComparativeStaticsRow {
                scenario: record.scenario.clone(),
                deltas,
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub attendance: MetricStats,
    pub total_units: MetricStats,
    pub profit: MetricStats,
    pub social_welfare: MetricStats,
    pub externality_cost: MetricStats,
    pub profit_maximizing_scenario: String,
    pub welfare_maximizing_scenario: String,
    pub lowest_externality_scenario: String,
}

/// Spread of the headline metrics and the extreme scenarios. Ties go to the
/// earlier record.
pub fn summary_statistics(table: &ScenarioTable) -> Result<SummaryStatistics, ScenarioError> {
    if table.is_empty() {
        return Err(ScenarioError::EmptyTable);
    }
    let column = |f: fn(&OutcomeReport) -> f64| {
        MetricStats::collect(table.iter().map(|r| (r.scenario.as_str(), f(&r.outcome))))
    };
    let profit = column(|o| o.profit);
    let social_welfare = column(|o| o.social_welfare);
    let externality_cost = column(|o| o.externality_cost);

    Ok(SummaryStatistics {
        attendance: column(|o| o.attendance),
        total_units: column(|o| o.total_units),
        profit_maximizing_scenario: profit.max_scenario.clone().unwrap_or_default(),
        welfare_maximizing_scenario: social_welfare.max_scenario.clone().unwrap_or_default(),
        lowest_externality_scenario: externality_cost.min_scenario.clone().unwrap_or_default(),
        profit,
        social_welfare,
        externality_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model::with_defaults().expect("test: default model")
    }

    #[test]
    fn battery_has_expected_names() {
        let model = model();
        let table = ScenarioRunner::new(&model).run_all_scenarios(
            8.0,
            Some(15.0),
            &ExternalityRates::default(),
        );
        let names: Vec<&str> = table.iter().map(|r| r.scenario.as_str()).collect();
        assert_eq!(
            names,
            vec![
                BASELINE,
                CURRENT_OBSERVED,
                "Price Ceiling ($8.00)",
                "Price Floor ($15.00)",
                BEER_BAN,
                SOCIAL_OPTIMUM,
            ]
        );
    }

    #[test]
    fn floor_binds_only_above_optimum() {
        let model = model();
        let runner = ScenarioRunner::new(&model);
        let rates = ExternalityRates::default();
        let slack = runner.run_scenario("slack", ScenarioPolicy::Floor(5.0), &rates);
        let base = runner.run_scenario("base", ScenarioPolicy::ProfitMax, &rates);
        assert_eq!(slack.outcome, base.outcome);

        let binding = runner.run_scenario("binding", ScenarioPolicy::Floor(15.0), &rates);
        assert_eq!(binding.concession_price, Some(15.0));
    }

    #[test]
    fn band_applies_midpoint_as_ceiling() {
        let model = model();
        let runner = ScenarioRunner::new(&model);
        let record = runner.run_scenario(
            "band",
            ScenarioPolicy::Band { min: 6.0, max: 10.0 },
            &ExternalityRates::default(),
        );
        assert_eq!(record.concession_price, Some(8.0));
    }

    #[test]
    fn ban_omits_concession_price() {
        let model = model();
        let record = ScenarioRunner::new(&model).run_scenario(
            BEER_BAN,
            ScenarioPolicy::Ban,
            &ExternalityRates::default(),
        );
        assert_eq!(record.concession_price, None);
        assert_eq!(record.outcome.total_units, 0.0);
        assert_eq!(record.outcome.externality_cost, 0.0);
        assert!(record.metric("concession_price").is_none());
        assert_eq!(record.ticket_price, 80.0);
    }

    #[test]
    fn unknown_baseline_rejected() {
        let table = ScenarioTable::default();
        let err = calculate_comparative_statics(&table, "nope");
        assert!(
            matches!(err, Err(ScenarioError::UnknownScenario(_))),
            "expected UnknownScenario, got {err:?}"
        );
    }

    #[test]
    fn empty_table_rejected() {
        assert!(matches!(
            summary_statistics(&ScenarioTable::default()),
            Err(ScenarioError::EmptyTable)
        ));
    }

    #[test]
    fn empty_sensitivity_rejected() {
        let model = model();
        let err = ScenarioRunner::new(&model).sensitivity_analysis(
            SensitivityParameter::CrimeCost,
            &[],
            &ExternalityRates::default(),
        );
        assert!(matches!(err, Err(ScenarioError::EmptyValues)));
    }

    #[test]
    fn parameter_names_parse() {
        assert_eq!(
            "crime_cost".parse::<SensitivityParameter>().expect("test: parses"),
            SensitivityParameter::CrimeCost
        );
        assert!("beer_elasticity".parse::<SensitivityParameter>().is_err());
    }

    #[test]
    fn lambda_sensitivity_leaves_model_untouched() {
        let model = model();
        let runner = ScenarioRunner::new(&model);
        let rows = runner
            .sensitivity_analysis(
                SensitivityParameter::TicketPriceSensitivity,
                &[0.010, 0.016],
                &ExternalityRates::default(),
            )
            .expect("test: sensitivity runs");
        assert_eq!(rows.len(), 2);
        assert_eq!(model.params().ticket_price_sensitivity, 0.013_178_5);
        // Less price-sensitive fans tolerate higher tickets.
        assert!(rows[0].record.ticket_price > rows[1].record.ticket_price);
    }

    #[test]
    fn crime_sensitivity_moves_only_welfare() {
        let model = model();
        let rows = ScenarioRunner::new(&model)
            .sensitivity_analysis(
                SensitivityParameter::CrimeCost,
                &[0.0, 10.0],
                &ExternalityRates::default(),
            )
            .expect("test: sensitivity runs");
        assert_eq!(rows[0].record.outcome.profit, rows[1].record.outcome.profit);
        assert!(rows[0].record.outcome.social_welfare > rows[1].record.outcome.social_welfare);
        assert_eq!(rows[1].record.rates.crime_cost_per_unit, 10.0);
    }
}
