//! Session-scoped controller over the mastery kernel.
//!
//! One [`Session`] is one learner working through one curriculum. It is the
//! only owner of the catalogue: callers submit results and read snapshots,
//! and the session settles the gate after every change. Alongside the
//! catalogue it keeps a [`LearnerProfile`] (context for the tutor) and an
//! [`ActivityLog`] of what happened.

pub mod activity;
pub mod error;
pub mod profile;
pub mod session;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use error::SessionError;
pub use profile::{
    EngagementStatus, ErrorPattern, ImprovementStatus, LearnerProfile,
    PerformanceClassification, QuizStatus, ScoreLevel,
};
pub use session::{
    ActiveAssessment, AnswerReport, BELOW_THRESHOLD_FEEDBACK, PASSED_FEEDBACK, PERFECT_FEEDBACK,
    Session, submission_feedback,
};
