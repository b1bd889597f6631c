// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Dashboard binding. Values cross the boundary as plain JS objects.

use crate::config::ParameterFile;
use crate::model::Model;
use crate::optimizer::PriceConstraint;
use crate::scenarios::ScenarioRunner;
use crate::welfare::ExternalityRates;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct StadiumModel {
    model: Model,
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl StadiumModel {
    /// Build from an optional JSON parameter object; defaults otherwise.
    #[wasm_bindgen(constructor)]
    pub fn new(params_json: Option<String>) -> Result<StadiumModel, JsError> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let model = match params_json {
            Some(json) => Model::from_parameter_file(ParameterFile::from_json_str(&json)?)?,
            None => Model::with_defaults()?,
        };
        Ok(Self { model })
    }

    pub fn stadium_revenue(&self, ticket_price: f64, concession_price: f64) -> JsValue {
        let outcome = self.model.stadium_revenue(ticket_price, concession_price);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    /// `constraint` is a ceiling when `ceiling_mode` is set, a pinned price otherwise.
    pub fn optimal_pricing(&self, constraint: Option<f64>, ceiling_mode: bool) -> JsValue {
        let constraint = constraint.map(|price| {
            if ceiling_mode {
                PriceConstraint::Ceiling(price)
            } else {
                PriceConstraint::Fixed(price)
            }
        });
        let solution = self.model.optimal_pricing(constraint);
        serde_wasm_bindgen::to_value(&solution).unwrap_or(JsValue::NULL)
    }

    pub fn social_welfare(
        &self,
        ticket_price: f64,
        concession_price: f64,
        crime_cost: f64,
        health_cost: f64,
    ) -> JsValue {
        let rates = ExternalityRates::new(crime_cost, health_cost);
        let welfare = self.model.social_welfare(ticket_price, concession_price, &rates);
        serde_wasm_bindgen::to_value(&welfare).unwrap_or(JsValue::NULL)
    }

    pub fn run_all_scenarios(
        &self,
        price_ceiling: f64,
        price_floor: Option<f64>,
        crime_cost: f64,
        health_cost: f64,
    ) -> JsValue {
        let rates = ExternalityRates::new(crime_cost, health_cost);
        let table = ScenarioRunner::new(&self.model).run_all_scenarios(price_ceiling, price_floor, &rates);
        serde_wasm_bindgen::to_value(&table).unwrap_or(JsValue::NULL)
    }

    pub fn ceiling_sweep(&self, ceilings: Vec<f64>, crime_cost: f64, health_cost: f64) -> JsValue {
        let rates = ExternalityRates::new(crime_cost, health_cost);
        let rows = ScenarioRunner::new(&self.model).ceiling_sweep(&ceilings, &rates);
        serde_wasm_bindgen::to_value(&rows).unwrap_or(JsValue::NULL)
    }

    pub fn get_parameters(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.model.params()).unwrap_or(JsValue::NULL)
    }
}
