//! Session scoring: progress, quiz accuracy, and the composite risk score.
//!
//! Everything here is a pure function of one [`ResponseRecord`]. Missing
//! inputs fall back to neutral defaults, so the scorer never fails and can be
//! re-run after every single-field change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::QuizCatalog;
use crate::model::{PayIntent, ResponseRecord, Role, YesNo};

/// Number of completion checkpoints tracked by [`compute_progress`].
pub const CHECKPOINT_COUNT: u8 = 6;

/// Risk weights. The five terms sum to at most 1.0.
pub const WEIGHT_INACCURACY: f64 = 0.4;
pub const WEIGHT_CONCERN: f64 = 0.2;
pub const WEIGHT_DAMAGE: f64 = 0.3;
pub const USE_TOOL_YES: f64 = 0.05;
pub const USE_TOOL_OTHER: f64 = 0.15;
pub const PAY_YES: f64 = 0.05;
pub const PAY_OTHER: f64 = 0.10;

/// `score >= HIGH_THRESHOLD` is High, `score <= LOW_THRESHOLD` is Low.
pub const HIGH_THRESHOLD: f64 = 0.7;
pub const LOW_THRESHOLD: f64 = 0.4;

const DEFAULT_ACCURACY: f64 = 0.5;
const DEFAULT_LEVEL: u8 = 5;

/// One step of the survey funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// Every catalog item has an answer.
    QuizComplete,
    /// Encounter frequency and concern are both set.
    Exposure,
    /// Damage, use-intent and pay-intent are all set.
    Intent,
    ScanComplete,
    RoleSet,
    ContactEmail,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; CHECKPOINT_COUNT as usize] = [
        Checkpoint::QuizComplete,
        Checkpoint::Exposure,
        Checkpoint::Intent,
        Checkpoint::ScanComplete,
        Checkpoint::RoleSet,
        Checkpoint::ContactEmail,
    ];

    pub fn is_satisfied(self, record: &ResponseRecord, catalog: &QuizCatalog) -> bool {
        match self {
            Checkpoint::QuizComplete => record.quiz_answers.len() >= catalog.len(),
            Checkpoint::Exposure => {
                record.encounter_level.is_some() && record.concern_level.is_some()
            }
            Checkpoint::Intent => {
                record.damage_level.is_some()
                    && record.would_use_tool.is_some()
                    && record.willingness_to_pay.is_some()
            }
            Checkpoint::ScanComplete => record.scan_result.is_some(),
            Checkpoint::RoleSet => record.role.is_some(),
            Checkpoint::ContactEmail => record.has_contact_email(),
        }
    }
}

/// Funnel completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub satisfied: u8,
    pub total: u8,
    pub percent: u8,
    /// Checkpoints still open, in funnel order.
    pub remaining: Vec<Checkpoint>,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.satisfied >= self.total
    }
}

/// Compute funnel progress as a 0–100 percentage.
pub fn compute_progress(record: &ResponseRecord, catalog: &QuizCatalog) -> Progress {
    let (done, remaining): (Vec<Checkpoint>, Vec<Checkpoint>) = Checkpoint::ALL
        .into_iter()
        .partition(|c| c.is_satisfied(record, catalog));
    let satisfied = done.len() as u8;
    let percent = (100.0 * f64::from(satisfied) / f64::from(CHECKPOINT_COUNT)).round() as u8;

    Progress {
        satisfied,
        total: CHECKPOINT_COUNT,
        percent: percent.min(100),
        remaining,
    }
}

/// Quiz accuracy for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    pub correct_count: u32,
    pub total_count: u32,
    pub percent: u8,
}

impl Accuracy {
    /// Fraction in [0, 1], or `None` before any answer.
    pub fn fraction(&self) -> Option<f64> {
        if self.total_count == 0 {
            None
        } else {
            Some(f64::from(self.correct_count) / f64::from(self.total_count))
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_count == 0 {
            write!(f, "—")
        } else {
            write!(
                f,
                "{}% ({}/{})",
                self.percent, self.correct_count, self.total_count
            )
        }
    }
}

/// Percentage of correct answers, rounded; 0 when nothing is answered.
pub fn compute_accuracy(record: &ResponseRecord) -> Accuracy {
    let total_count = record.quiz_answers.len() as u32;
    let correct_count = record.quiz_answers.iter().filter(|a| a.correct).count() as u32;
    Accuracy {
        correct_count,
        total_count,
        percent: percent_of(u64::from(correct_count), u64::from(total_count)),
    }
}

/// `round(100 * part / whole)`, or 0 for an empty whole.
pub(crate) fn percent_of(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round().min(100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score <= LOW_THRESHOLD {
            RiskLevel::Low
        } else {
            RiskLevel::Medium
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// The inputs as they were used, after defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub accuracy_percent: u8,
    pub concern: u8,
    pub damage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub level: RiskLevel,
    /// Weighted composite in [0, 1].
    pub score: f64,
    pub components: RiskComponents,
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Risk: {} • Accuracy: {}% • Concern: {}/10 • Damage: {}/10",
            self.level,
            self.components.accuracy_percent,
            self.components.concern,
            self.components.damage
        )
    }
}

/// Weighted risk composite from inverse accuracy, concern, damage, and intent.
pub fn compute_risk_score(record: &ResponseRecord) -> RiskScore {
    let accuracy = compute_accuracy(record)
        .fraction()
        .unwrap_or(DEFAULT_ACCURACY);
    let concern = record.concern_level.unwrap_or(DEFAULT_LEVEL);
    let damage = record.damage_level.unwrap_or(DEFAULT_LEVEL);
    let use_tool = if record.would_use_tool == Some(YesNo::Yes) {
        USE_TOOL_YES
    } else {
        USE_TOOL_OTHER
    };
    let pay = if record.willingness_to_pay == Some(PayIntent::Yes) {
        PAY_YES
    } else {
        PAY_OTHER
    };

    let score = WEIGHT_INACCURACY * (1.0 - accuracy)
        + WEIGHT_CONCERN * (f64::from(concern) / 10.0)
        + WEIGHT_DAMAGE * (f64::from(damage) / 10.0)
        + use_tool
        + pay;

    RiskScore {
        level: RiskLevel::from_score(score),
        score,
        components: RiskComponents {
            accuracy_percent: (accuracy * 100.0).round() as u8,
            concern,
            damage,
        },
    }
}

/// Everything the survey page shows after an input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub progress: Progress,
    pub accuracy: Accuracy,
    pub risk: RiskScore,
    pub concern_label: String,
    pub pay_label: String,
    pub role_label: String,
}

/// Run all scorers over one record.
pub fn score(record: &ResponseRecord, catalog: &QuizCatalog) -> Scorecard {
    Scorecard {
        progress: compute_progress(record, catalog),
        accuracy: compute_accuracy(record),
        risk: compute_risk_score(record),
        concern_label: record
            .concern_level
            .map(|c| format!("{c}/10"))
            .unwrap_or_else(|| "—".into()),
        pay_label: record
            .willingness_to_pay
            .map(|p| p.to_string())
            .unwrap_or_else(|| "—".into()),
        role_label: record
            .role
            .as_ref()
            .map(Role::to_string)
            .unwrap_or_else(|| "—".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, QuizAnswer, ScanResult, Verdict};

    fn answered(correct: &[bool]) -> ResponseRecord {
        ResponseRecord {
            quiz_answers: correct
                .iter()
                .enumerate()
                .map(|(i, &c)| QuizAnswer {
                    item_index: i,
                    choice: Verdict::Fake,
                    correct: c,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn complete_record() -> ResponseRecord {
        ResponseRecord {
            encounter_level: Some(0),
            concern_level: Some(6),
            damage_level: Some(4),
            would_use_tool: Some(YesNo::No),
            willingness_to_pay: Some(PayIntent::Maybe),
            role: Some(Role::Consumer),
            scan_result: Some(ScanResult {
                score: 82,
                label: Verdict::Real,
                explanation: "Stable lighting".into(),
            }),
            contact: Some(Contact {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: None,
            }),
            ..answered(&[true, true, false])
        }
    }

    #[test]
    fn accuracy_with_no_answers_is_zero() {
        let acc = compute_accuracy(&ResponseRecord::default());
        assert_eq!(acc.percent, 0);
        assert_eq!(acc.total_count, 0);
        assert_eq!(acc.fraction(), None);
        assert_eq!(acc.to_string(), "—");
    }

    #[test]
    fn accuracy_rounds() {
        let acc = compute_accuracy(&answered(&[true, true, false]));
        assert_eq!(acc.correct_count, 2);
        assert_eq!(acc.total_count, 3);
        assert_eq!(acc.percent, 67);
        assert_eq!(acc.to_string(), "67% (2/3)");
    }

    #[test]
    fn empty_record_has_no_progress() {
        let catalog = QuizCatalog::builtin();
        let progress = compute_progress(&ResponseRecord::default(), &catalog);
        assert_eq!(progress.satisfied, 0);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.remaining.len(), 6);
    }

    #[test]
    fn progress_is_100_only_when_every_checkpoint_holds() {
        let catalog = QuizCatalog::builtin();
        let full = complete_record();
        let progress = compute_progress(&full, &catalog);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete());

        // Drop each checkpoint in turn: never 100.
        let mut variants = Vec::new();
        variants.push(ResponseRecord {
            quiz_answers: full.quiz_answers[..2].to_vec(),
            ..full.clone()
        });
        variants.push(ResponseRecord {
            concern_level: None,
            ..full.clone()
        });
        variants.push(ResponseRecord {
            would_use_tool: None,
            ..full.clone()
        });
        variants.push(ResponseRecord {
            scan_result: None,
            ..full.clone()
        });
        variants.push(ResponseRecord {
            role: None,
            ..full.clone()
        });
        variants.push(ResponseRecord {
            contact: None,
            ..full.clone()
        });
        for record in &variants {
            let progress = compute_progress(record, &catalog);
            assert!(progress.percent < 100, "{record:?}");
            assert_eq!(progress.satisfied, 5);
            assert_eq!(progress.percent, 83);
        }
    }

    #[test]
    fn role_alone_counts_once() {
        let catalog = QuizCatalog::builtin();
        let record = ResponseRecord {
            role: Some(Role::Professional),
            ..Default::default()
        };
        let progress = compute_progress(&record, &catalog);
        assert_eq!(progress.satisfied, 1);
        assert_eq!(progress.percent, 17);
    }

    #[test]
    fn risk_defaults_for_empty_record() {
        // 0.4*0.5 + 0.2*0.5 + 0.3*0.5 + 0.15 + 0.10 = 0.70
        let risk = compute_risk_score(&ResponseRecord::default());
        assert!((risk.score - 0.70).abs() < 1e-9, "got {}", risk.score);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.components.accuracy_percent, 50);
        assert_eq!(risk.components.concern, 5);
        assert_eq!(risk.components.damage, 5);
        assert_eq!(
            risk.to_string(),
            "Risk: High • Accuracy: 50% • Concern: 5/10 • Damage: 5/10"
        );
    }

    #[test]
    fn risk_low_for_accurate_unconcerned_buyer() {
        let record = ResponseRecord {
            concern_level: Some(1),
            damage_level: Some(1),
            would_use_tool: Some(YesNo::Yes),
            willingness_to_pay: Some(PayIntent::Yes),
            ..answered(&[true, true, true])
        };
        // 0 + 0.02 + 0.03 + 0.05 + 0.05 = 0.15
        let risk = compute_risk_score(&record);
        assert!((risk.score - 0.15).abs() < 1e-9);
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.components.accuracy_percent, 100);
    }

    #[test]
    fn risk_medium_band() {
        let record = ResponseRecord {
            concern_level: Some(5),
            damage_level: Some(5),
            would_use_tool: Some(YesNo::Yes),
            willingness_to_pay: Some(PayIntent::Maybe),
            ..answered(&[true, true, false])
        };
        // 0.4/3 + 0.1 + 0.15 + 0.05 + 0.10 ≈ 0.533
        let risk = compute_risk_score(&record);
        assert_eq!(risk.level, RiskLevel::Medium);
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(RiskLevel::from_score(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.4), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.55), RiskLevel::Medium);
    }

    #[test]
    fn risk_is_monotonic_in_concern_and_damage() {
        let base = answered(&[true, false]);
        for damage in 1..=10u8 {
            let mut previous = f64::MIN;
            for concern in 1..=10u8 {
                let record = ResponseRecord {
                    concern_level: Some(concern),
                    damage_level: Some(damage),
                    ..base.clone()
                };
                let score = compute_risk_score(&record).score;
                assert!(score >= previous);
                previous = score;
            }
        }
        for concern in 1..=10u8 {
            let mut previous = f64::MIN;
            for damage in 1..=10u8 {
                let record = ResponseRecord {
                    concern_level: Some(concern),
                    damage_level: Some(damage),
                    ..base.clone()
                };
                let score = compute_risk_score(&record).score;
                assert!(score >= previous);
                previous = score;
            }
        }
    }

    #[test]
    fn scorecard_labels() {
        let catalog = QuizCatalog::builtin();
        let card = score(&ResponseRecord::default(), &catalog);
        assert_eq!(card.concern_label, "—");
        assert_eq!(card.pay_label, "—");
        assert_eq!(card.role_label, "—");

        let card = score(&complete_record(), &catalog);
        assert_eq!(card.concern_label, "6/10");
        assert_eq!(card.pay_label, "Maybe");
        assert_eq!(card.role_label, "Consumer");
        assert_eq!(card.progress.percent, 100);
    }
}
