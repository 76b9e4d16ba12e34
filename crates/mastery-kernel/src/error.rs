//! Error types for Mastery kernel operations.

use crate::material::Level;

/// Errors arising from malformed ledger input.
///
/// These are caller contract violations, never learner-facing conditions:
/// the gating rules themselves have no error path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    /// No material with this id is present in the catalogue.
    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    /// Slot indices are bounded by the number of assessments per material.
    #[error("assessment slot {index} out of range (materials have {slots} slots)")]
    SlotOutOfRange { index: usize, slots: usize },

    /// Percentages live in `0..=100`.
    #[error("percentage {0} out of range (expected 0..=100)")]
    PercentageOutOfRange(u32),

    /// An assessment with zero questions cannot be graded.
    #[error("assessment has no questions")]
    NoQuestions,

    /// The remedial template must belong to the Basic tier.
    #[error("remedial material {id} must be Basic, found {level}")]
    RemedialLevel { id: String, level: Level },

    /// Material ids must be unique within a catalogue.
    #[error("duplicate material id: {0}")]
    DuplicateMaterial(String),
}
