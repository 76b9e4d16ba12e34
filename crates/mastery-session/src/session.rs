//! The session controller.
//!
//! A [`Session`] owns one learner's catalogue and drives it through the
//! ledger and the gate. Every mutating call validates its input first, then
//! records, then settles the gate, so the catalogue a caller observes is
//! always settled.

use crate::activity::ActivityLog;
use crate::error::SessionError;
use crate::profile::LearnerProfile;
use mastery_curriculum::{AssessmentSet, Curriculum, Grade};
use mastery_kernel::{
    Catalogue, Gate, KernelError, Percentage, ScoreLedger, SlotIndex, Transition,
    completion_percentage,
};
use serde::Serialize;

pub const BELOW_THRESHOLD_FEEDBACK: &str = "Score below 50%. Mastery required for advancement.";
pub const PASSED_FEEDBACK: &str = "Threshold passed! Aim for 100% to hit full completion.";
pub const PERFECT_FEEDBACK: &str = "Perfect! 100% mastery achieved.";

/// Feedback advisory set by a submission before the gate runs.
pub fn submission_feedback(score: Percentage) -> &'static str {
    if score.is_perfect() {
        PERFECT_FEEDBACK
    } else if score.is_passing() {
        PASSED_FEEDBACK
    } else {
        BELOW_THRESHOLD_FEEDBACK
    }
}

/// The assessment currently being taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAssessment {
    pub material_id: String,
    pub slot: SlotIndex,
}

/// Result of grading submitted answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReport {
    pub percentage: Percentage,
    pub grade: Grade,
}

#[derive(Debug, Clone)]
pub struct Session {
    curriculum: Curriculum,
    gate: Gate,
    catalogue: Catalogue,
    advisory: Option<String>,
    active: Option<ActiveAssessment>,
    profile: LearnerProfile,
    log: ActivityLog,
    last_fired: Vec<Transition>,
}

impl Session {
    pub fn new(curriculum: Curriculum) -> Result<Self, SessionError> {
        let gate = curriculum.gate()?;
        let catalogue = curriculum.seed_catalogue()?;
        Ok(Self {
            curriculum,
            gate,
            catalogue,
            advisory: None,
            active: None,
            profile: LearnerProfile::default(),
            log: ActivityLog::new(),
            last_fired: Vec::new(),
        })
    }

    /// A session over the embedded default curriculum.
    pub fn builtin() -> Result<Self, SessionError> {
        Self::new(Curriculum::builtin()?)
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn dismiss_advisory(&mut self) {
        self.advisory = None;
        self.last_fired.clear();
    }

    pub fn completion_percentage(&self) -> u8 {
        completion_percentage(&self.catalogue)
    }

    pub fn active_assessment(&self) -> Option<&ActiveAssessment> {
        self.active.as_ref()
    }

    /// Questions of the assessment in progress.
    pub fn active_questions(&self) -> Option<&AssessmentSet> {
        let active = self.active.as_ref()?;
        self.curriculum.assessment(&active.material_id, active.slot)
    }

    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }

    /// Transitions fired by the most recent operation; empty when it fired
    /// none or did not evaluate the gate.
    pub fn last_fired(&self) -> &[Transition] {
        &self.last_fired
    }

    /// Discard all progress and re-seed from the curriculum.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.catalogue = self.curriculum.seed_catalogue()?;
        self.advisory = None;
        self.active = None;
        self.profile = LearnerProfile::default();
        self.log.clear();
        self.last_fired.clear();
        tracing::debug!("session reset");
        Ok(())
    }

    /// Study notes of an unlocked material.
    pub fn open_material(&mut self, material_id: &str) -> Result<&str, SessionError> {
        let material = self
            .catalogue
            .get(material_id)
            .ok_or_else(|| KernelError::UnknownMaterial(material_id.to_string()))?;
        if material.locked {
            return Err(SessionError::MaterialLocked(material_id.to_string()));
        }
        self.log
            .sensor(format!("Opened study notes for {}", material.title));
        let notes = self
            .curriculum
            .definition(material_id)
            .map(|d| d.notes.as_str())
            .unwrap_or_default();
        Ok(notes)
    }

    /// Begin an assessment. Clears the pending advisory.
    pub fn start_assessment(&mut self, material_id: &str, slot: usize) -> Result<(), SessionError> {
        let slot = SlotIndex::new(slot)?;
        let material = self
            .catalogue
            .get(material_id)
            .ok_or_else(|| KernelError::UnknownMaterial(material_id.to_string()))?;
        if material.locked {
            return Err(SessionError::MaterialLocked(material_id.to_string()));
        }
        if let Some(active) = &self.active {
            return Err(SessionError::AssessmentInProgress {
                material_id: active.material_id.clone(),
                slot: active.slot,
            });
        }
        if self.curriculum.assessment(material_id, slot).is_none() {
            return Err(SessionError::MissingQuestions {
                material_id: material_id.to_string(),
                slot,
            });
        }

        self.active = Some(ActiveAssessment {
            material_id: material_id.to_string(),
            slot,
        });
        self.advisory = None;
        self.last_fired.clear();
        self.log
            .sensor(format!("Started assessment {slot} of {material_id}"));
        tracing::debug!(material = material_id, %slot, "assessment started");
        Ok(())
    }

    /// Leave the active assessment without a score.
    ///
    /// Returns the abandoned assessment; `None` when nothing was active.
    /// Gating resumes immediately.
    pub fn abandon_assessment(&mut self) -> Option<ActiveAssessment> {
        let abandoned = self.active.take()?;
        self.log.sensor(format!(
            "Abandoned assessment {} of {}",
            abandoned.slot, abandoned.material_id
        ));
        self.settle();
        Some(abandoned)
    }

    /// Record `correct` out of `total` for a slot and settle the gate.
    ///
    /// A matching active assessment is finished by the submission; one for a
    /// different slot rejects it. Locked materials are accepted here: the lock
    /// only guards starting an assessment.
    pub fn submit_assessment_result(
        &mut self,
        material_id: &str,
        slot: usize,
        correct: u32,
        total: u32,
    ) -> Result<Percentage, SessionError> {
        let slot = SlotIndex::new(slot)?;
        if !self.catalogue.contains(material_id) {
            return Err(KernelError::UnknownMaterial(material_id.to_string()).into());
        }
        if let Some(active) = &self.active {
            if active.material_id != material_id || active.slot != slot {
                return Err(SessionError::AssessmentInProgress {
                    material_id: active.material_id.clone(),
                    slot: active.slot,
                });
            }
        }
        let score = Percentage::from_fraction(correct, total)?;

        let previous = self.catalogue.record_score(material_id, slot, score)?;
        self.active = None;
        self.advisory = Some(submission_feedback(score).to_string());
        self.profile
            .record_result(score, total.saturating_sub(correct), previous);
        self.log
            .sensor(format!("Assessment {slot} of {material_id} scored {score}"));
        tracing::debug!(material = material_id, %slot, %score, "assessment submitted");

        self.settle();
        Ok(score)
    }

    /// Grade answers for the active assessment and submit the result.
    pub fn submit_answers(&mut self, answers: &[usize]) -> Result<AnswerReport, SessionError> {
        let active = self.active.clone().ok_or(SessionError::NoActiveAssessment)?;
        let set = self
            .curriculum
            .assessment(&active.material_id, active.slot)
            .ok_or_else(|| SessionError::MissingQuestions {
                material_id: active.material_id.clone(),
                slot: active.slot,
            })?;
        let grade = set.grade(answers).ok_or(SessionError::AnswerCount {
            expected: set.len(),
            found: answers.len(),
        })?;
        let percentage = self.submit_assessment_result(
            &active.material_id,
            active.slot.index(),
            grade.correct,
            grade.total,
        )?;
        Ok(AnswerReport { percentage, grade })
    }

    /// Settle the gate unless an assessment is in progress.
    pub fn evaluate(&mut self) -> &[Transition] {
        if self.active.is_some() {
            self.last_fired.clear();
            return &self.last_fired;
        }
        self.settle();
        &self.last_fired
    }

    /// The learner asked the tutor something.
    pub fn record_tutor_engagement(&mut self) {
        self.profile.record_engagement();
        self.log.sensor("Asked the tutor a question");
    }

    /// The tutor answered.
    pub fn record_tutor_response(&mut self) {
        self.profile.record_response();
        self.log.actuator("Tutor response delivered");
    }

    fn settle(&mut self) {
        let settled = self
            .gate
            .settle(std::mem::take(&mut self.catalogue), self.advisory.take());
        self.catalogue = settled.catalogue;
        self.advisory = settled.advisory;
        for transition in &settled.fired {
            self.log.reasoning(reasoning_message(*transition));
        }
        self.last_fired = settled.fired;
    }
}

fn reasoning_message(transition: Transition) -> &'static str {
    match transition {
        Transition::InjectRemedial => "Foundational score below 50%; remedial material added",
        Transition::UnlockAdvanced => "Every quiz at or above 50%; Advanced unlocked",
        Transition::RelockAdvanced => "A score fell below 50%; Advanced locked again",
        Transition::NoOp => "No change",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityKind;

    fn session() -> Session {
        Session::builtin().expect("builtin curriculum")
    }

    #[test]
    fn feedback_tracks_the_score_band() {
        let pct = |v| Percentage::new(v).unwrap();
        assert_eq!(submission_feedback(pct(49)), BELOW_THRESHOLD_FEEDBACK);
        assert_eq!(submission_feedback(pct(50)), PASSED_FEEDBACK);
        assert_eq!(submission_feedback(pct(99)), PASSED_FEEDBACK);
        assert_eq!(submission_feedback(pct(100)), PERFECT_FEEDBACK);
    }

    #[test]
    fn passing_submission_keeps_its_feedback() {
        let mut s = session();
        let score = s.submit_assessment_result("t4-1", 0, 3, 4).unwrap();
        assert_eq!(score.value(), 75);
        assert_eq!(s.advisory(), Some(PASSED_FEEDBACK));
        assert!(s.last_fired().is_empty());
    }

    #[test]
    fn start_rejects_locked_unknown_and_out_of_range() {
        let mut s = session();
        assert!(matches!(
            s.start_assessment("t5-1", 0),
            Err(SessionError::MaterialLocked(id)) if id == "t5-1"
        ));
        assert!(s.start_assessment("nope", 0).unwrap_err().is_unknown_material());
        assert!(matches!(
            s.start_assessment("t4-1", 2),
            Err(SessionError::Kernel(KernelError::SlotOutOfRange { index: 2, .. }))
        ));
        assert!(s.active_assessment().is_none());
    }

    #[test]
    fn only_one_assessment_at_a_time() {
        let mut s = session();
        s.start_assessment("t4-1", 0).unwrap();
        let err = s.start_assessment("t4-2", 1).unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(
            s.submit_assessment_result("t4-2", 0, 1, 1),
            Err(SessionError::AssessmentInProgress { .. })
        ));
    }

    #[test]
    fn start_clears_advisory_and_abandon_resumes_gating() {
        let mut s = session();
        s.submit_assessment_result("t4-1", 0, 3, 4).unwrap();
        assert!(s.advisory().is_some());
        s.start_assessment("t4-1", 1).unwrap();
        assert_eq!(s.advisory(), None);
        assert_eq!(s.active_questions().map(|q| q.len()), Some(4));

        let abandoned = s.abandon_assessment().expect("an assessment was active");
        assert_eq!(abandoned.material_id, "t4-1");
        assert_eq!(abandoned.slot, SlotIndex::SECOND);
        assert!(s.abandon_assessment().is_none());
    }

    #[test]
    fn evaluate_is_suspended_during_an_assessment() {
        let mut s = session();
        s.start_assessment("t4-2", 0).unwrap();
        // A score recorded behind the controller's back.
        let mut catalogue = s.catalogue.clone();
        catalogue
            .record_score("t4-1", SlotIndex::FIRST, Percentage::new(10).unwrap())
            .unwrap();
        s.catalogue = catalogue;

        assert!(s.evaluate().is_empty());
        assert!(!s.catalogue().has_remedial());

        s.abandon_assessment();
        assert!(s.catalogue().has_remedial());
        assert_eq!(s.last_fired(), &[Transition::InjectRemedial]);
    }

    #[test]
    fn submit_answers_grades_against_the_question_set() {
        let mut s = session();
        assert!(matches!(
            s.submit_answers(&[0]),
            Err(SessionError::NoActiveAssessment)
        ));

        s.start_assessment("t4-1", 0).unwrap();
        let key: Vec<usize> = s
            .active_questions()
            .unwrap()
            .questions
            .iter()
            .map(|q| q.correct_answer)
            .collect();
        assert!(matches!(
            s.submit_answers(&key[..1]),
            Err(SessionError::AnswerCount { expected: 4, found: 1 })
        ));

        let report = s.submit_answers(&key).unwrap();
        assert_eq!(report.percentage.value(), 100);
        assert!(report.grade.missed.is_empty());
        assert_eq!(s.advisory(), Some(PERFECT_FEEDBACK));
        assert!(s.active_assessment().is_none());
    }

    #[test]
    fn invalid_submission_leaves_state_untouched() {
        let mut s = session();
        let before = s.catalogue().clone();
        assert!(matches!(
            s.submit_assessment_result("t4-1", 0, 0, 0),
            Err(SessionError::Kernel(KernelError::NoQuestions))
        ));
        assert!(s.submit_assessment_result("ghost", 0, 1, 1).is_err());
        assert_eq!(s.catalogue(), &before);
        assert!(s.activity().is_empty());
        assert_eq!(s.advisory(), None);
    }

    #[test]
    fn open_material_returns_notes_for_unlocked_only() {
        let mut s = session();
        let notes = s.open_material("t4-1").unwrap();
        assert!(!notes.is_empty());
        assert!(matches!(
            s.open_material("t5-2"),
            Err(SessionError::MaterialLocked(_))
        ));
        assert_eq!(s.activity().len(), 1);
        assert_eq!(s.activity().latest().unwrap().kind, ActivityKind::Sensor);
    }

    #[test]
    fn fired_rules_are_logged_as_reasoning() {
        let mut s = session();
        s.submit_assessment_result("t4-1", 0, 1, 4).unwrap();
        let kinds: Vec<_> = s.activity().entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ActivityKind::Reasoning, ActivityKind::Sensor]);
    }

    #[test]
    fn tutor_hooks_update_profile_and_log() {
        let mut s = session();
        s.record_tutor_engagement();
        s.record_tutor_response();
        assert_eq!(
            s.profile().engagement,
            crate::profile::EngagementStatus::Responded
        );
        assert_eq!(s.activity().latest().unwrap().kind, ActivityKind::Actuator);
    }

    #[test]
    fn reset_reseeds_everything() {
        let mut s = session();
        s.submit_assessment_result("t4-1", 0, 0, 4).unwrap();
        s.start_assessment("basic-1", 0).unwrap();
        s.reset().unwrap();
        assert_eq!(s.catalogue(), &s.curriculum().seed_catalogue().unwrap());
        assert_eq!(s.advisory(), None);
        assert!(s.active_assessment().is_none());
        assert!(s.activity().is_empty());
        assert_eq!(s.profile(), &LearnerProfile::default());
    }
}
