// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Running statistics over one metric of a scenario table.

use serde::{Deserialize, Serialize};

/// Mean, spread and extremes of one metric, with the scenarios that hit the
/// extremes. Accumulated in a single pass (Welford).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two scenarios.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
    /// First scenario reaching `max`.
    pub max_scenario: Option<String>,
    /// First scenario reaching `min`.
    pub min_scenario: Option<String>,
    #[serde(skip)]
    sum_sq_dev: f64,
}

impl Default for MetricStats {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            n: 0,
            max_scenario: None,
            min_scenario: None,
            sum_sq_dev: 0.0,
        }
    }
}

impl MetricStats {
    /// Fold `(scenario, value)` pairs in table order.
    pub fn collect<'a>(values: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut stats = Self::default();
        for (scenario, value) in values {
            stats.push(scenario, value);
        }
        stats
    }

    pub fn push(&mut self, scenario: &str, value: f64) {
        self.n += 1;
        if self.n == 1 {
            self.min = value;
            self.max = value;
            self.min_scenario = Some(scenario.to_string());
            self.max_scenario = Some(scenario.to_string());
        } else {
            if value > self.max {
                self.max = value;
                self.max_scenario = Some(scenario.to_string());
            }
            if value < self.min {
                self.min = value;
                self.min_scenario = Some(scenario.to_string());
            }
        }

        let delta = value - self.mean;
        self.mean += delta / self.n as f64;
        self.sum_sq_dev += delta * (value - self.mean);
        self.std_dev = if self.n > 1 {
            (self.sum_sq_dev / (self.n - 1) as f64).sqrt()
        } else {
            0.0
        };
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
