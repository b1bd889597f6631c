// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Stadium pricing engine.
//!
//! A monopoly venue sells tickets and one concession good to a crowd made of
//! heterogeneous consumer segments. The engine evaluates demand, revenue and
//! welfare at any pricing point, finds profit- or welfare-maximizing prices
//! under optional concession price controls, and runs a battery of policy
//! scenarios.

pub mod config;
pub mod segment;
pub mod demand;
pub mod types;
pub mod model;
pub mod accounting;
pub mod optimizer;
pub mod welfare;
pub mod scenarios;
pub mod stats;
pub mod money;
pub mod wasm;

pub use config::{ConfigError, ModelParameters, ParameterFile};
pub use model::Model;
pub use optimizer::{Objective, PriceConstraint, PricingSolution};
pub use scenarios::{
    calculate_comparative_statics, summary_statistics, ScenarioError, ScenarioPolicy,
    ScenarioRecord, ScenarioRunner, ScenarioTable, SensitivityParameter,
};
pub use segment::ConsumerSegment;
pub use types::{OutcomeReport, PricingPoint, WelfareReport};
pub use wasm::StadiumModel;
pub use welfare::ExternalityRates;
