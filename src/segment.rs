// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Consumer segments: behaviorally homogeneous slices of the crowd.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance on the sum of segment shares.
pub const SHARE_TOLERANCE: f64 = 1e-6;

/// One homogeneous sub-population.
///
/// Utility is quasilinear in money with `α·ln(B + 1)` from concession
/// consumption `B`, where `α` is [`preference_weight`](Self::preference_weight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerSegment {
    pub name: String,
    /// Fraction of the baseline crowd in this segment.
    pub share: f64,
    /// `α` -- marginal utility weight on concession consumption.
    pub preference_weight: f64,
}

impl ConsumerSegment {
    pub fn new(name: impl Into<String>, share: f64, preference_weight: f64) -> Self {
        Self {
            name: name.into(),
            share,
            preference_weight,
        }
    }
}

/// Name of the default majority segment.
pub const NON_DRINKER: &str = "Non-Drinker";
/// Name of the default minority segment.
pub const DRINKER: &str = "Drinker";

/// Two-segment population: 60% who (almost) never buy, 40% who buy 2.5 units
/// at $12.50 (`43.75 / 12.50 - 1 = 2.5`).
pub fn default_segments() -> Vec<ConsumerSegment> {
    vec![
        ConsumerSegment::new(NON_DRINKER, 0.60, 1.0),
        ConsumerSegment::new(DRINKER, 0.40, 43.75),
    ]
}

/// Check shares, preference weights, and name uniqueness.
pub fn validate_segments(segments: &[ConsumerSegment]) -> Result<(), ConfigError> {
    if segments.is_empty() {
        return Err(ConfigError::NoSegments);
    }

    let mut seen = HashSet::new();
    for segment in segments {
        if !seen.insert(segment.name.as_str()) {
            return Err(ConfigError::DuplicateSegment(segment.name.clone()));
        }
        if !segment.share.is_finite() || segment.share < 0.0 {
            return Err(ConfigError::InvalidSegment {
                name: segment.name.clone(),
                reason: format!("share {} must be finite and non-negative", segment.share),
            });
        }
        if !segment.preference_weight.is_finite() || segment.preference_weight <= 0.0 {
            return Err(ConfigError::InvalidSegment {
                name: segment.name.clone(),
                reason: format!(
                    "preference weight {} must be finite and positive",
                    segment.preference_weight
                ),
            });
        }
    }

    let total: f64 = segments.iter().map(|s| s.share).sum();
    if (total - 1.0).abs() > SHARE_TOLERANCE {
        return Err(ConfigError::SharesDoNotSumToOne(total));
    }
    Ok(())
}
