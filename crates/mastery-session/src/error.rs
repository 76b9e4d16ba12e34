use mastery_curriculum::CurriculumError;
use mastery_kernel::{KernelError, SlotIndex};

/// Errors raised by session operations.
///
/// Every variant is raised before any state changes, so a failed call leaves
/// the session exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Curriculum(#[from] CurriculumError),

    #[error("material {0} is locked")]
    MaterialLocked(String),

    #[error("assessment {slot} of {material_id} is already in progress")]
    AssessmentInProgress { material_id: String, slot: SlotIndex },

    #[error("no assessment is in progress")]
    NoActiveAssessment,

    #[error("expected {expected} answers, got {found}")]
    AnswerCount { expected: usize, found: usize },

    #[error("no questions defined for assessment {slot} of {material_id}")]
    MissingQuestions { material_id: String, slot: SlotIndex },
}

impl SessionError {
    /// True when the error names a material the catalogue does not hold.
    pub fn is_unknown_material(&self) -> bool {
        matches!(self, SessionError::Kernel(KernelError::UnknownMaterial(_)))
    }

    /// True when the call conflicts with the current session state rather
    /// than being malformed.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            SessionError::MaterialLocked(_)
                | SessionError::AssessmentInProgress { .. }
                | SessionError::NoActiveAssessment
        )
    }
}
