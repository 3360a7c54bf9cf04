//! Core data model types for truthpulse.
//!
//! A [`ResponseRecord`] is the full set of answers collected from one survey
//! session. Decoding is permissive: every field may be missing, `null`, or a
//! blank string, and the legacy field names of the first browser client
//! are accepted as aliases.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::QuizCatalog;
use crate::error::CatalogError;

/// A deepfake-or-not verdict, used both for quiz choices and scan labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verdict {
    Real,
    Fake,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Real => write!(f, "Real"),
            Verdict::Fake => write!(f, "Fake"),
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "real" => Ok(Verdict::Real),
            "fake" => Ok(Verdict::Fake),
            other => Err(format!("unknown verdict: {other}")),
        }
    }
}

/// A binary survey answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YesNo::Yes => write!(f, "Yes"),
            YesNo::No => write!(f, "No"),
        }
    }
}

/// Stated willingness to pay for a verification tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PayIntent {
    Yes,
    No,
    Maybe,
}

impl fmt::Display for PayIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayIntent::Yes => write!(f, "Yes"),
            PayIntent::No => write!(f, "No"),
            PayIntent::Maybe => write!(f, "Maybe"),
        }
    }
}

/// Self-reported role of the respondent.
///
/// Unknown role strings are preserved verbatim in [`Role::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Consumer,
    Professional,
    BusinessOwner,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Consumer => "Consumer",
            Role::Professional => "Professional",
            Role::BusinessOwner => "BusinessOwner",
            Role::Other(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "consumer" => Role::Consumer,
            "professional" => Role::Professional,
            "businessowner" | "business" => Role::BusinessOwner,
            _ => Role::Other(s.trim().to_string()),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::from(s.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// One answered quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    #[serde(alias = "index")]
    pub item_index: usize,
    pub choice: Verdict,
    /// Always `choice == groundTruth[item_index]`; re-derived on ingestion.
    #[serde(default)]
    pub correct: bool,
}

/// Follow-up answers collected only from business owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Would verify media before publishing.
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub verify: Option<YesNo>,
    /// Has suffered damage from manipulated media.
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub damage: Option<YesNo>,
    /// Interested in API access.
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub api: Option<YesNo>,
    /// Organization size bucket, e.g. "1–10".
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub size: Option<String>,
    /// Wants a demo.
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub demo: Option<YesNo>,
}

impl BusinessProfile {
    pub fn is_empty(&self) -> bool {
        self.verify.is_none()
            && self.damage.is_none()
            && self.api.is_none()
            && self.size.is_none()
            && self.demo.is_none()
    }
}

/// Outcome of a (simulated) media scan. Score and label are always paired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub score: u8,
    pub label: Verdict,
    #[serde(default, alias = "explain")]
    pub explanation: String,
}

/// Contact details; submitting them is what makes a record persistable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub role: Option<Role>,
}

impl Contact {
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

/// One session's answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(default, alias = "deepfakeAnswers", deserialize_with = "lenient_answers")]
    pub quiz_answers: Vec<QuizAnswer>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub encounter_level: Option<u32>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub concern_level: Option<u8>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub damage_level: Option<u8>,
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub would_use_tool: Option<YesNo>,
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub willingness_to_pay: Option<PayIntent>,
    #[serde(default, deserialize_with = "lenient_as_none")]
    pub role: Option<Role>,
    #[serde(default, alias = "b2b", deserialize_with = "lenient_profile")]
    pub business_profile: Option<BusinessProfile>,
    #[serde(default, alias = "productScan", deserialize_with = "lenient_scan")]
    pub scan_result: Option<ScanResult>,
    #[serde(default, alias = "user", deserialize_with = "lenient_contact")]
    pub contact: Option<Contact>,
}

/// Lower and upper bound of the 1–10 rating sliders.
pub const LEVEL_MIN: u8 = 1;
pub const LEVEL_MAX: u8 = 10;

impl ResponseRecord {
    /// Record (or replace) the answer for one quiz item.
    ///
    /// `correct` is derived from the catalog's ground truth, never taken from
    /// the caller.
    pub fn answer(
        &mut self,
        item_index: usize,
        choice: Verdict,
        catalog: &QuizCatalog,
    ) -> Result<(), CatalogError> {
        let truth = catalog.ground_truth(item_index)?;
        let answer = QuizAnswer {
            item_index,
            choice,
            correct: choice == truth,
        };
        match self
            .quiz_answers
            .iter_mut()
            .find(|a| a.item_index == item_index)
        {
            Some(existing) => *existing = answer,
            None => self.quiz_answers.push(answer),
        }
        Ok(())
    }

    pub fn answer_for(&self, item_index: usize) -> Option<&QuizAnswer> {
        self.quiz_answers.iter().find(|a| a.item_index == item_index)
    }

    /// Role as reported, falling back to the contact form's role.
    pub fn effective_role(&self) -> Option<&Role> {
        self.role
            .as_ref()
            .or_else(|| self.contact.as_ref().and_then(|c| c.role.as_ref()))
    }

    pub fn has_contact_email(&self) -> bool {
        self.contact.as_ref().is_some_and(Contact::has_email)
    }

    /// Bring a record received from outside back in line with its invariants.
    ///
    /// Duplicate item indices collapse to the last answer, answers for items
    /// outside the catalog are dropped, `correct` flags are re-derived, and
    /// levels and scan scores are clamped into range. Returns the number of
    /// dropped answers.
    pub fn normalize(&mut self, catalog: &QuizCatalog) -> usize {
        let mut normalized: Vec<QuizAnswer> = Vec::with_capacity(self.quiz_answers.len());
        let mut dropped = 0;
        for answer in std::mem::take(&mut self.quiz_answers) {
            let Ok(truth) = catalog.ground_truth(answer.item_index) else {
                dropped += 1;
                continue;
            };
            let answer = QuizAnswer {
                correct: answer.choice == truth,
                ..answer
            };
            match normalized
                .iter_mut()
                .find(|a| a.item_index == answer.item_index)
            {
                Some(existing) => *existing = answer,
                None => normalized.push(answer),
            }
        }
        self.quiz_answers = normalized;

        self.concern_level = self.concern_level.map(clamp_level);
        self.damage_level = self.damage_level.map(clamp_level);
        if let Some(scan) = self.scan_result.as_mut() {
            scan.score = scan.score.min(100);
        }
        dropped
    }
}

pub(crate) fn clamp_level(level: u8) -> u8 {
    level.clamp(LEVEL_MIN, LEVEL_MAX)
}

/// Identifier of a stored record.
///
/// Fresh ids are UUID v4 strings. Documents written by earlier deployments
/// carry short nanoid-style ids; those are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A record as held by a record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Minted on read when a legacy entry has none.
    #[serde(default)]
    pub id: RecordId,
    /// Server-assigned append time.
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ResponseRecord,
}

impl StoredRecord {
    /// Stamp a record with a fresh id and the current time.
    pub fn stamp(record: ResponseRecord) -> Self {
        Self {
            id: RecordId::new(),
            ts: Utc::now(),
            record,
        }
    }
}

// ---------------------------------------------------------------------------
// Permissive field decoders
//
// A field that cannot be read never fails the whole record: it decodes to
// `None` (or an empty value) and a warning is logged.
// ---------------------------------------------------------------------------

/// Decode `null`, a missing value, a blank string, or an unreadable value
/// as `None`.
fn lenient_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(lenient_value))
}

fn lenient_value<T: DeserializeOwned>(value: Value) -> Option<T> {
    match value {
        Value::Null => None,
        Value::String(ref s) if s.trim().is_empty() => None,
        value => match serde_json::from_value(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(err) => coerce(&value).or_else(|| {
                tracing::warn!(%value, error = %err, "ignoring unreadable field value");
                None
            }),
        },
    }
}

/// Second attempt for near-miss scalars: numeric strings and fractional
/// numbers become rounded integers, other strings are retried title-cased
/// ("yes" as "Yes").
fn coerce<T: DeserializeOwned>(value: &Value) -> Option<T> {
    let candidate = match value {
        Value::Number(n) => Value::from(n.as_f64()?.round() as i64),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<f64>() {
                Ok(f) if f.is_finite() => Value::from(f.round() as i64),
                _ => Value::String(title_case(s)),
            }
        }
        _ => return None,
    };
    serde_json::from_value(candidate).ok()
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_as_none::<D, String>(deserializer)?.unwrap_or_default())
}

/// A 1–10 slider value; out-of-range numbers are clamped, not dropped.
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let level = lenient_as_none::<D, i64>(deserializer)?;
    Ok(level.map(|l| l.clamp(i64::from(LEVEL_MIN), i64::from(LEVEL_MAX)) as u8))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = lenient_as_none::<D, i64>(deserializer)?;
    Ok(count.map(|c| c.clamp(0, i64::from(u32::MAX)) as u32))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialAnswer {
    #[serde(default, alias = "index", deserialize_with = "lenient_as_none")]
    item_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient_as_none")]
    choice: Option<Verdict>,
    #[serde(default, deserialize_with = "lenient_as_none")]
    correct: Option<bool>,
}

/// Keep every readable answer; entries without a usable index or choice
/// are skipped.
fn lenient_answers<'de, D>(deserializer: D) -> Result<Vec<QuizAnswer>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries,
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            tracing::warn!(value = %other, "ignoring quiz answers that are not a list");
            return Ok(Vec::new());
        }
    };
    let total = entries.len();
    let answers: Vec<QuizAnswer> = entries
        .into_iter()
        .filter_map(lenient_value::<PartialAnswer>)
        .filter_map(|a| {
            Some(QuizAnswer {
                item_index: usize::try_from(a.item_index?).ok()?,
                choice: a.choice?,
                correct: a.correct.unwrap_or(false),
            })
        })
        .collect();
    if answers.len() < total {
        tracing::warn!(
            skipped = total - answers.len(),
            "skipped unreadable quiz answers"
        );
    }
    Ok(answers)
}

fn lenient_profile<'de, D>(deserializer: D) -> Result<Option<BusinessProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    let profile = lenient_as_none::<D, BusinessProfile>(deserializer)?;
    Ok(profile.filter(|p| !p.is_empty()))
}

fn lenient_contact<'de, D>(deserializer: D) -> Result<Option<Contact>, D::Error>
where
    D: Deserializer<'de>,
{
    let contact = lenient_as_none::<D, Contact>(deserializer)?;
    Ok(contact.filter(|c| {
        !c.name.trim().is_empty() || !c.email.trim().is_empty() || c.role.is_some()
    }))
}

#[derive(Deserialize)]
struct PartialScan {
    #[serde(default, deserialize_with = "lenient_as_none")]
    score: Option<i64>,
    #[serde(default, deserialize_with = "lenient_as_none")]
    label: Option<Verdict>,
    #[serde(default, alias = "explain", deserialize_with = "lenient_as_none")]
    explanation: Option<String>,
}

/// A scan object counts only when both score and label are present.
fn lenient_scan<'de, D>(deserializer: D) -> Result<Option<ScanResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let partial = lenient_as_none::<D, PartialScan>(deserializer)?;
    Ok(partial.and_then(|p| match (p.score, p.label) {
        (Some(score), Some(label)) => Some(ScanResult {
            score: score.clamp(0, 100) as u8,
            label,
            explanation: p.explanation.unwrap_or_default(),
        }),
        _ => None,
    }))
}
