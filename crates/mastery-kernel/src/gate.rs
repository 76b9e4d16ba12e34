//! Gating Engine.
//!
//! The gate inspects the scores held in a [`Catalogue`] and picks the single
//! highest-priority transition:
//!
//! 1. inject the remedial material
//! 2. unlock Advanced
//! 3. re-lock Advanced
//! 4. no-op
//!
//! Rules are an ordered table of `(transition, predicate)` pairs; the first
//! matching predicate wins and later rules are not consulted. Deciding is
//! separate from applying, and both take the catalogue by value or by
//! reference, so a pass is a pure function of
//! `(catalogue, advisory) -> (catalogue', transition, advisory')`.
//!
//! The gate never fails: every catalogue, including an empty one, maps to
//! exactly one transition.

use crate::catalogue::Catalogue;
use crate::error::KernelError;
use crate::material::{Level, Material, SlotScores};
use serde::{Deserialize, Serialize};

pub const UNLOCK_ADVISORY: &str =
    "Advanced material unlocked! You've maintained the required 50% threshold.";
pub const RELOCK_ADVISORY: &str =
    "Advanced modules locked. All quizzes must score at least 50% to maintain access.";
pub const REMINDER_ADVISORY: &str =
    "Access to Advanced material requires at least 50% on all current quizzes.";

/// When the remedial material is injected.
///
/// Two variants of this rule existed historically and they produce
/// different unlock timing, so the choice is configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemedialTrigger {
    /// Inject on the first Foundational score below the threshold.
    #[default]
    FirstFailure,
    /// Inject only once every Foundational slot has been attempted and at
    /// least one of them scored below the threshold.
    AllFoundationalAttempted,
}

impl RemedialTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemedialTrigger::FirstFailure => "first_failure",
            RemedialTrigger::AllFoundationalAttempted => "all_foundational_attempted",
        }
    }
}

/// Tunable parts of the decision list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatingPolicy {
    pub remedial_trigger: RemedialTrigger,
    /// Emit [`REMINDER_ADVISORY`] on a no-op pass when no advisory is
    /// pending, Advanced is locked, and every Foundational slot was attempted.
    pub remind_when_locked: bool,
}

impl Default for GatingPolicy {
    fn default() -> Self {
        Self {
            remedial_trigger: RemedialTrigger::FirstFailure,
            remind_when_locked: true,
        }
    }
}

/// The outcome of one gating decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    InjectRemedial,
    UnlockAdvanced,
    RelockAdvanced,
    NoOp,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::InjectRemedial => "inject_remedial",
            Transition::UnlockAdvanced => "unlock_advanced",
            Transition::RelockAdvanced => "relock_advanced",
            Transition::NoOp => "no_op",
        }
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self, Transition::NoOp)
    }
}

/// One entry of the decision list.
#[derive(Clone, Copy)]
pub struct Rule {
    pub transition: Transition,
    pub predicate: fn(&Catalogue, &GatingPolicy) -> bool,
}

/// The decision list in priority order. Anything not matched is a no-op.
pub const RULES: [Rule; 3] = [
    Rule {
        transition: Transition::InjectRemedial,
        predicate: needs_remedial,
    },
    Rule {
        transition: Transition::UnlockAdvanced,
        predicate: can_unlock_advanced,
    },
    Rule {
        transition: Transition::RelockAdvanced,
        predicate: must_relock_advanced,
    },
];

/// Pick the first transition whose predicate holds.
pub fn decide(catalogue: &Catalogue, policy: &GatingPolicy) -> Transition {
    RULES
        .iter()
        .find(|rule| (rule.predicate)(catalogue, policy))
        .map(|rule| rule.transition)
        .unwrap_or(Transition::NoOp)
}

/// Some Foundational material failed, no remedial material exists yet, and
/// the configured trigger variant is satisfied.
pub fn needs_remedial(catalogue: &Catalogue, policy: &GatingPolicy) -> bool {
    if catalogue.has_remedial() {
        return false;
    }
    let any_failed = catalogue
        .by_level(Level::Foundational)
        .any(Material::has_failing_score);
    if !any_failed {
        return false;
    }
    match policy.remedial_trigger {
        RemedialTrigger::FirstFailure => true,
        RemedialTrigger::AllFoundationalAttempted => all_foundational_attempted(catalogue),
    }
}

/// Every Foundational slot passed, the remedial material (if present)
/// passed, nothing anywhere is failing, and Advanced is still locked.
pub fn can_unlock_advanced(catalogue: &Catalogue, _policy: &GatingPolicy) -> bool {
    let mut foundational = catalogue.by_level(Level::Foundational).peekable();
    if foundational.peek().is_none() {
        return false;
    }
    let foundational_passed = foundational.all(|m| m.assessment_scores.all_passed());
    let remedial_passed = catalogue
        .remedial()
        .is_none_or(|m| m.assessment_scores.all_passed());

    foundational_passed && remedial_passed && !catalogue.any_failing() && catalogue.advanced_locked()
}

/// Something is failing while Advanced is open.
pub fn must_relock_advanced(catalogue: &Catalogue, _policy: &GatingPolicy) -> bool {
    catalogue.any_failing() && catalogue.advanced_unlocked()
}

/// Foundational materials exist and every one of their slots was attempted.
pub fn all_foundational_attempted(catalogue: &Catalogue) -> bool {
    let mut foundational = catalogue.by_level(Level::Foundational).peekable();
    foundational.peek().is_some() && foundational.all(|m| m.assessment_scores.all_attempted())
}

/// Result of one gating pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateOutcome {
    pub catalogue: Catalogue,
    pub transition: Transition,
    pub advisory: Option<String>,
    /// The requirement reminder was emitted on this no-op pass.
    pub reminded: bool,
}

/// The gating engine bound to a remedial template and a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    remedial: Material,
    policy: GatingPolicy,
}

impl Gate {
    /// The template is normalized to a fresh, unlocked, unscored material.
    pub fn new(remedial: Material, policy: GatingPolicy) -> Result<Self, KernelError> {
        if remedial.level != Level::Basic {
            return Err(KernelError::RemedialLevel {
                id: remedial.id,
                level: remedial.level,
            });
        }
        let remedial = Material {
            locked: false,
            assessment_scores: SlotScores::default(),
            ..remedial
        };
        Ok(Self { remedial, policy })
    }

    pub fn policy(&self) -> &GatingPolicy {
        &self.policy
    }

    pub fn remedial(&self) -> &Material {
        &self.remedial
    }

    pub fn decide(&self, catalogue: &Catalogue) -> Transition {
        decide(catalogue, &self.policy)
    }

    /// Perform `transition` on the catalogue.
    pub fn apply(&self, mut catalogue: Catalogue, transition: Transition) -> Catalogue {
        match transition {
            Transition::InjectRemedial => {
                catalogue.prepend_if_absent(self.remedial.clone());
            }
            Transition::UnlockAdvanced => catalogue.set_advanced_locked(false),
            Transition::RelockAdvanced => catalogue.set_advanced_locked(true),
            Transition::NoOp => {}
        }
        catalogue
    }

    /// Advisory emitted when `transition` fires; `None` for the no-op.
    pub fn advisory_for(&self, transition: Transition) -> Option<String> {
        match transition {
            Transition::InjectRemedial => Some(format!(
                "Foundational challenges detected. I've added {} to help you bridge the gap.",
                self.remedial.title
            )),
            Transition::UnlockAdvanced => Some(UNLOCK_ADVISORY.to_string()),
            Transition::RelockAdvanced => Some(RELOCK_ADVISORY.to_string()),
            Transition::NoOp => None,
        }
    }

    /// One full pass: decide, apply, and update the advisory.
    ///
    /// A no-op never clears an existing advisory.
    pub fn run(&self, catalogue: Catalogue, advisory: Option<String>) -> GateOutcome {
        let transition = self.decide(&catalogue);
        let catalogue = self.apply(catalogue, transition);

        if let Some(message) = self.advisory_for(transition) {
            tracing::info!(transition = transition.as_str(), "gate transition");
            return GateOutcome {
                catalogue,
                transition,
                advisory: Some(message),
                reminded: false,
            };
        }

        let remind = advisory.is_none()
            && self.policy.remind_when_locked
            && catalogue.advanced_locked()
            && all_foundational_attempted(&catalogue);
        if remind {
            tracing::debug!("advanced still locked; reminder emitted");
        }
        GateOutcome {
            catalogue,
            transition,
            advisory: if remind {
                Some(REMINDER_ADVISORY.to_string())
            } else {
                advisory
            },
            reminded: remind,
        }
    }

    /// Run passes until one is a no-op.
    ///
    /// One pass fires at most one rule, but a firing rule can make another
    /// rule applicable (a fresh failure after Advanced opened injects the
    /// remedial material first, and the next pass re-locks). Settling leaves
    /// the catalogue in a state where another pass changes nothing. Unlock
    /// and re-lock exclude each other and injection happens once, so this
    /// takes at most `RULES.len() + 1` passes.
    pub fn settle(&self, mut catalogue: Catalogue, mut advisory: Option<String>) -> Settlement {
        let mut fired = Vec::new();
        let mut reminded = false;
        for _ in 0..=RULES.len() {
            let outcome = self.run(catalogue, advisory);
            catalogue = outcome.catalogue;
            advisory = outcome.advisory;
            if outcome.transition.is_no_op() {
                reminded = outcome.reminded;
                break;
            }
            fired.push(outcome.transition);
        }
        Settlement {
            catalogue,
            fired,
            advisory,
            reminded,
        }
    }
}

/// Result of settling the gate after a ledger change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub catalogue: Catalogue,
    /// Transitions fired, in order; empty when the first pass was a no-op.
    pub fired: Vec<Transition>,
    pub advisory: Option<String>,
    pub reminded: bool,
}
