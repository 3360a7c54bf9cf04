//! Aggregate statistics across all stored responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{PayIntent, ResponseRecord};
use crate::scorer::percent_of;

/// Summary statistics over a set of response records.
///
/// Serialized as `{ total, accuracy, concernAvg, pay, roles }`. Only observed
/// pay intents and roles appear as keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    /// Number of records folded.
    pub total: u64,
    /// Rounded percentage of correct quiz answers across all records.
    pub accuracy: u8,
    /// Mean concern level over records that set one.
    pub concern_avg: f64,
    pub pay: BTreeMap<PayIntent, u64>,
    pub roles: BTreeMap<String, u64>,
}

impl AggregateMetrics {
    pub fn pay_count(&self, intent: PayIntent) -> u64 {
        self.pay.get(&intent).copied().unwrap_or(0)
    }

    pub fn role_count(&self, role: &str) -> u64 {
        self.roles.get(role).copied().unwrap_or(0)
    }
}

/// Fold records into [`AggregateMetrics`] in a single pass.
///
/// The result does not depend on input order.
pub fn aggregate<'a, I>(records: I) -> AggregateMetrics
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let mut total = 0u64;
    let mut answers = 0u64;
    let mut correct = 0u64;
    let mut concern_sum = 0u64;
    let mut concern_count = 0u64;
    let mut pay: BTreeMap<PayIntent, u64> = BTreeMap::new();
    let mut roles: BTreeMap<String, u64> = BTreeMap::new();

    for record in records {
        total += 1;
        answers += record.quiz_answers.len() as u64;
        correct += record.quiz_answers.iter().filter(|a| a.correct).count() as u64;

        if let Some(concern) = record.concern_level {
            concern_sum += u64::from(concern);
            concern_count += 1;
        }
        if let Some(intent) = record.willingness_to_pay {
            *pay.entry(intent).or_default() += 1;
        }
        if let Some(role) = record.effective_role() {
            *roles.entry(role.to_string()).or_default() += 1;
        }
    }

    let concern_avg = if concern_count == 0 {
        0.0
    } else {
        concern_sum as f64 / concern_count as f64
    };

    AggregateMetrics {
        total,
        accuracy: percent_of(correct, answers),
        concern_avg,
        pay,
        roles,
    }
}
