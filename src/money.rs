// Copyright © 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Adapter between the model's f64 world and `Decimal` money for display.

use num_traits::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert f64 to Decimal (lossy; non-finite values become zero).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Round a dollar amount to cents, half away from zero.
pub fn to_cents(v: f64) -> Decimal {
    to_decimal(v).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `$1,234,567.89` style, with a leading minus for losses.
pub fn format_dollars(v: f64) -> String {
    let cents = to_cents(v);
    let text = cents.abs().to_string();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w.to_string(), format!("{f:0<2}")),
        None => (text, "00".to_string()),
    };
    let sign = if cents.is_sign_negative() && !cents.is_zero() { "-" } else { "" };
    format!("{sign}${}.{frac}", group_thousands(&whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
