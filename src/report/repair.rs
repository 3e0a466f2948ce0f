//! Normalization of structurally-plausible but incomplete reports.
//!
//! Upstream generation is not trusted to have produced numeric risk
//! amounts or a correct total: every clause missing a numeric `riskAmount`
//! gets the fixed default, and `summary.totalMaxRisk` is always recomputed
//! as the exact sum of the (possibly defaulted) per-clause amounts. Repair
//! only fills and recomputes — it never removes or renames fields — and is
//! idempotent.

use serde_json::{Number, Value};

use super::DEFAULT_RISK_AMOUNT;

/// Fill missing `riskAmount` defaults and recompute `summary.totalMaxRisk`.
pub fn ensure_risk_amounts(mut candidate: Value) -> Value {
    let mut total_int: i64 = 0;
    let mut total_frac: f64 = 0.0;
    let mut any_float = false;

    if let Some(clauses) = candidate.get_mut("clauses").and_then(Value::as_array_mut) {
        for clause in clauses.iter_mut() {
            let Some(obj) = clause.as_object_mut() else {
                continue;
            };

            let amount = match obj.get("riskAmount").and_then(Value::as_number) {
                Some(n) => n.clone(),
                None => {
                    obj.insert("riskAmount".into(), Value::from(DEFAULT_RISK_AMOUNT));
                    Number::from(DEFAULT_RISK_AMOUNT)
                }
            };

            match amount.as_i64() {
                Some(i) => total_int = total_int.saturating_add(i),
                None => {
                    any_float = true;
                    total_frac += amount.as_f64().unwrap_or(0.0);
                }
            }
        }
    }

    // Integer inputs stay integer-exact in the recomputed total.
    let total = if any_float {
        Number::from_f64(total_int as f64 + total_frac).unwrap_or_else(|| Number::from(0))
    } else {
        Number::from(total_int)
    };

    if let Some(summary) = candidate.get_mut("summary").and_then(Value::as_object_mut) {
        summary.insert("totalMaxRisk".into(), Value::Number(total));
    }

    candidate
}
