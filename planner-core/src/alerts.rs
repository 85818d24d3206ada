//! Evaluates a declarative alert catalog against a computed result.
//!
//! Evaluation is pure and idempotent: running the same catalog against
//! the same profile and result twice yields byte-identical alert lists.
//! Output ordering is total: priority, then deadline (sooner first,
//! undated last), then id, so rendered reports are stable.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    Alert, AlertDefinition, Comparison, Condition, FieldRef, FinancialProfile, TaxResult,
};

/// Evaluates every catalog entry and returns the firing alerts, sorted
/// and deduplicated by id.
pub fn evaluate(
    catalog: &[AlertDefinition],
    profile: &FinancialProfile,
    result: &TaxResult,
) -> Vec<Alert> {
    let mut seen = BTreeSet::new();
    let mut alerts = Vec::new();

    for definition in catalog {
        if !seen.insert(definition.id.as_str()) {
            debug!(id = %definition.id, "duplicate alert id in catalog; keeping first");
            continue;
        }
        if !holds(&definition.condition, profile, result) {
            continue;
        }
        alerts.push(Alert {
            id: definition.id.clone(),
            category: definition.category.clone(),
            priority: definition.priority,
            message: render(&definition.message, profile, result),
            deadline: definition
                .deadline
                .as_ref()
                .and_then(|rule| rule.deadline(result.tax_year)),
        });
    }

    alerts.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.id.cmp(&b.id))
    });
    alerts
}

fn holds(condition: &Condition, profile: &FinancialProfile, result: &TaxResult) -> bool {
    match condition {
        Condition::Leaf { field, comparison } => {
            let left = field.resolve(profile, result);
            match comparison {
                Comparison::Gt { value } => left > value.resolve(profile, result),
                Comparison::Lt { value } => left < value.resolve(profile, result),
                Comparison::Gte { value } => left >= value.resolve(profile, result),
                Comparison::Lte { value } => left <= value.resolve(profile, result),
                Comparison::Eq { value } => left == value.resolve(profile, result),
                Comparison::Between { low, high } => {
                    left >= low.resolve(profile, result) && left <= high.resolve(profile, result)
                }
            }
        }
        Condition::All(children) => children.iter().all(|child| holds(child, profile, result)),
        Condition::Any(children) => children.iter().any(|child| holds(child, profile, result)),
    }
}

/// Substitutes `{token}` placeholders with field values formatted at two
/// decimal places. Unknown tokens pass through untouched.
fn render(template: &str, profile: &FinancialProfile, result: &TaxResult) -> String {
    let mut message = template.to_string();
    for field in FieldRef::ALL {
        let placeholder = format!("{{{}}}", field.token());
        if message.contains(&placeholder) {
            let value = field.resolve(profile, result).round_dp(2);
            message = message.replace(&placeholder, &format_amount(value));
        }
    }
    message
}

fn format_amount(value: Decimal) -> String {
    // Always show cents, even for whole-dollar values.
    format!("{:.2}", value)
}
