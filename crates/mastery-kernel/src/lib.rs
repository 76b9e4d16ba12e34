//! # Mastery Kernel
//!
//! Score-driven gating over a tiered curriculum: a learner's assessment
//! scores decide which materials are open to them.
//!
//! This crate is **content-agnostic**: it does not know what the materials
//! teach or how questions are graded. It only holds percentages per
//! assessment slot and decides, after every change, whether the catalogue
//! should change shape.
//!
//! ## Architecture
//!
//! ```text
//! Material              ← id, tier, lock flag, two assessment slots
//!     │
//! Catalogue             ← ordered materials; lock state derived from Advanced
//!     │
//! ScoreLedger           ← record / read percentages per slot
//!     │
//! Gate                  ← ordered rules: remedial → unlock → re-lock → no-op
//!     │
//! completion_percentage ← share of slots scored at exactly 100%
//! ```

pub mod catalogue;
pub mod completion;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod material;

pub use catalogue::Catalogue;
pub use completion::completion_percentage;
pub use error::KernelError;
pub use gate::{
    Gate, GateOutcome, GatingPolicy, RULES, RemedialTrigger, Rule, Settlement, Transition,
};
pub use ledger::ScoreLedger;
pub use material::{
    Level, Material, MaterialFormat, PASS_THRESHOLD, PERFECT_SCORE, Percentage, SLOTS_PER_MATERIAL,
    SlotIndex, SlotScores,
};
