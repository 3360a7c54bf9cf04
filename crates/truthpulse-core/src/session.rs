//! Interactive survey session.
//!
//! A [`Session`] owns the only mutable [`ResponseRecord`] of one respondent.
//! Each mutator keeps the record's invariants and hands back a fresh
//! [`Scorecard`] for the caller to render.

use std::sync::Arc;

use crate::catalog::{QuizCatalog, QuizItem};
use crate::error::CatalogError;
use crate::model::{
    clamp_level, BusinessProfile, Contact, PayIntent, ResponseRecord, Role, ScanResult, Verdict,
    YesNo,
};
use crate::scorer::{score, Scorecard};

/// Outcome of a contact form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The record is ready to persist.
    Ready(ResponseRecord),
    /// This exact contact was already submitted from this session.
    Duplicate,
    /// Name, email, or role is blank.
    Incomplete,
}

/// Feedback shown after a quiz answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback<'a> {
    pub correct: bool,
    pub item: &'a QuizItem,
    pub scorecard: Scorecard,
}

pub struct Session {
    record: ResponseRecord,
    catalog: Arc<QuizCatalog>,
    last_submitted: Option<Contact>,
}

impl Session {
    pub fn new(catalog: Arc<QuizCatalog>) -> Self {
        Self {
            record: ResponseRecord::default(),
            catalog,
            last_submitted: None,
        }
    }

    pub fn record(&self) -> &ResponseRecord {
        &self.record
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn scorecard(&self) -> Scorecard {
        score(&self.record, &self.catalog)
    }

    /// Answer (or re-answer) a quiz item.
    pub fn answer_quiz(
        &mut self,
        item_index: usize,
        choice: Verdict,
    ) -> Result<AnswerFeedback<'_>, CatalogError> {
        self.record.answer(item_index, choice, &self.catalog)?;
        let correct = self
            .record
            .answer_for(item_index)
            .is_some_and(|a| a.correct);
        let scorecard = self.scorecard();
        let item = self
            .catalog
            .get(item_index)
            .ok_or(CatalogError::UnknownItem {
                index: item_index,
                len: self.catalog.len(),
            })?;
        Ok(AnswerFeedback {
            correct,
            item,
            scorecard,
        })
    }

    pub fn set_encounter(&mut self, level: u32) -> Scorecard {
        self.record.encounter_level = Some(level);
        self.scorecard()
    }

    /// Set concern; values outside 1–10 are clamped.
    pub fn set_concern(&mut self, level: u8) -> Scorecard {
        self.record.concern_level = Some(clamp_level(level));
        self.scorecard()
    }

    /// Set expected damage; values outside 1–10 are clamped.
    pub fn set_damage(&mut self, level: u8) -> Scorecard {
        self.record.damage_level = Some(clamp_level(level));
        self.scorecard()
    }

    pub fn set_would_use_tool(&mut self, answer: YesNo) -> Scorecard {
        self.record.would_use_tool = Some(answer);
        self.scorecard()
    }

    pub fn set_willingness_to_pay(&mut self, intent: PayIntent) -> Scorecard {
        self.record.willingness_to_pay = Some(intent);
        self.scorecard()
    }

    /// Set the role. Leaving `BusinessOwner` discards the business profile.
    pub fn set_role(&mut self, role: Role) -> Scorecard {
        if role != Role::BusinessOwner {
            self.record.business_profile = None;
        }
        self.record.role = Some(role);
        self.scorecard()
    }

    /// Record business follow-ups; ignored unless the role is `BusinessOwner`.
    pub fn set_business_profile(&mut self, profile: BusinessProfile) -> Scorecard {
        if self.record.role == Some(Role::BusinessOwner) {
            self.record.business_profile = Some(profile).filter(|p| !p.is_empty());
        }
        self.scorecard()
    }

    pub fn complete_scan(&mut self, mut result: ScanResult) -> Scorecard {
        result.score = result.score.min(100);
        self.record.scan_result = Some(result);
        self.scorecard()
    }

    /// Submit the contact form.
    ///
    /// All three fields must be non-blank. A repeat of the previously
    /// submitted contact yields [`Submission::Duplicate`] so the same
    /// response is persisted once.
    pub fn submit_contact(&mut self, name: &str, email: &str, role: &str) -> Submission {
        let (name, email, role) = (name.trim(), email.trim(), role.trim());
        if name.is_empty() || email.is_empty() || role.is_empty() {
            return Submission::Incomplete;
        }

        let contact = Contact {
            name: name.to_string(),
            email: email.to_string(),
            role: Some(Role::from(role)),
        };
        if self.last_submitted.as_ref() == Some(&contact) {
            return Submission::Duplicate;
        }

        self.record.contact = Some(contact.clone());
        self.last_submitted = Some(contact);
        Submission::Ready(self.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::RiskLevel;

    fn session() -> Session {
        Session::new(Arc::new(QuizCatalog::builtin()))
    }

    #[test]
    fn answer_feedback_uses_catalog() {
        let mut s = session();
        let feedback = s.answer_quiz(2, Verdict::Real).unwrap();
        assert!(feedback.correct);
        assert_eq!(feedback.item.population_stat, "62% identified this correctly.");
        assert_eq!(feedback.scorecard.accuracy.percent, 100);
    }

    #[test]
    fn reanswer_keeps_single_entry() {
        let mut s = session();
        s.answer_quiz(0, Verdict::Real).unwrap();
        let feedback = s.answer_quiz(0, Verdict::Fake).unwrap();
        assert!(feedback.correct);
        assert_eq!(s.record().quiz_answers.len(), 1);
    }

    #[test]
    fn unknown_item_errors() {
        let mut s = session();
        assert!(s.answer_quiz(3, Verdict::Fake).is_err());
        assert!(s.record().quiz_answers.is_empty());
    }

    #[test]
    fn full_funnel_reaches_100() {
        let mut s = session();
        s.answer_quiz(0, Verdict::Fake).unwrap();
        s.answer_quiz(1, Verdict::Fake).unwrap();
        s.answer_quiz(2, Verdict::Fake).unwrap();
        s.set_encounter(3);
        s.set_concern(9);
        s.set_damage(9);
        s.set_would_use_tool(YesNo::No);
        s.set_willingness_to_pay(PayIntent::No);
        s.complete_scan(ScanResult {
            score: 31,
            label: Verdict::Fake,
            explanation: "Warped edges".into(),
        });
        let card = s.set_role(Role::Consumer);
        assert_eq!(card.progress.percent, 83);

        match s.submit_contact("Ada", "ada@example.com", "Consumer") {
            Submission::Ready(record) => {
                assert!(record.has_contact_email());
                let card = score(&record, s.catalog());
                assert_eq!(card.progress.percent, 100);
                assert_eq!(card.risk.level, RiskLevel::High);
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[test]
    fn levels_are_clamped() {
        let mut s = session();
        assert_eq!(s.set_concern(0).concern_label, "1/10");
        assert_eq!(s.set_concern(42).concern_label, "10/10");
        s.set_damage(11);
        assert_eq!(s.record().damage_level, Some(10));
    }

    #[test]
    fn business_profile_requires_business_owner() {
        let mut s = session();
        let profile = BusinessProfile {
            demo: Some(YesNo::Yes),
            ..Default::default()
        };
        s.set_role(Role::Consumer);
        s.set_business_profile(profile.clone());
        assert!(s.record().business_profile.is_none());

        s.set_role(Role::BusinessOwner);
        s.set_business_profile(profile.clone());
        assert_eq!(s.record().business_profile, Some(profile));

        s.set_role(Role::Professional);
        assert!(s.record().business_profile.is_none());
    }

    #[test]
    fn contact_submission_is_idempotent() {
        let mut s = session();
        assert_eq!(
            s.submit_contact("", "ada@example.com", "Consumer"),
            Submission::Incomplete
        );
        assert!(matches!(
            s.submit_contact(" Ada ", "ada@example.com", "Consumer"),
            Submission::Ready(_)
        ));
        assert_eq!(
            s.submit_contact("Ada", "ada@example.com", "Consumer"),
            Submission::Duplicate
        );
        assert!(matches!(
            s.submit_contact("Ada", "ada@work.example", "Professional"),
            Submission::Ready(_)
        ));
    }
}
