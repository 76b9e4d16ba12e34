//! Materials and their assessment slots.
//!
//! A material is one unit of curriculum content. Each material owns exactly
//! [`SLOTS_PER_MATERIAL`] assessment slots; a slot holds the most recent
//! percentage scored on it, or nothing if it was never attempted. The set of
//! completed slots is derived from the scores, so "every scored slot is
//! completed" holds by construction.

use crate::error::KernelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of assessment slots every material carries.
pub const SLOTS_PER_MATERIAL: usize = 2;

/// Scores strictly below this percentage are failures; the threshold itself passes.
pub const PASS_THRESHOLD: u8 = 50;

/// A perfect score, the only value that counts toward completion.
pub const PERFECT_SCORE: u8 = 100;

/// Gating tier of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// Remedial tier, injected by the gating engine.
    Basic,
    Foundational,
    /// Starts locked; opened and closed by the gating engine.
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Basic => "Basic",
            Level::Foundational => "Foundational",
            Level::Advanced => "Advanced",
        }
    }

    /// Whether a freshly seeded material of this tier starts locked.
    pub fn starts_locked(&self) -> bool {
        matches!(self, Level::Advanced)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation format of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialFormat {
    Article,
    Video,
    Interactive,
}

/// Index of an assessment slot, bounded by [`SLOTS_PER_MATERIAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct SlotIndex(usize);

impl SlotIndex {
    pub const FIRST: SlotIndex = SlotIndex(0);
    pub const SECOND: SlotIndex = SlotIndex(1);

    pub fn new(index: usize) -> Result<Self, KernelError> {
        if index < SLOTS_PER_MATERIAL {
            Ok(Self(index))
        } else {
            Err(KernelError::SlotOutOfRange {
                index,
                slots: SLOTS_PER_MATERIAL,
            })
        }
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// All slot indices in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOTS_PER_MATERIAL).map(SlotIndex)
    }
}

impl TryFrom<usize> for SlotIndex {
    type Error = KernelError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<SlotIndex> for usize {
    fn from(slot: SlotIndex) -> Self {
        slot.0
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A percentage-correct score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Percentage(u8);

impl Percentage {
    pub fn new(value: u32) -> Result<Self, KernelError> {
        if value <= u32::from(PERFECT_SCORE) {
            Ok(Self(value as u8))
        } else {
            Err(KernelError::PercentageOutOfRange(value))
        }
    }

    /// `round(100 * min(correct, total) / total)`, rounding halves up.
    pub fn from_fraction(correct: u32, total: u32) -> Result<Self, KernelError> {
        if total == 0 {
            return Err(KernelError::NoQuestions);
        }
        let capped = u64::from(correct.min(total));
        let total = u64::from(total);
        let rounded = (200 * capped + total) / (2 * total);
        Ok(Self(rounded as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_passing(self) -> bool {
        self.0 >= PASS_THRESHOLD
    }

    pub fn is_perfect(self) -> bool {
        self.0 == PERFECT_SCORE
    }
}

impl TryFrom<u32> for Percentage {
    type Error = KernelError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u32 {
    fn from(p: Percentage) -> Self {
        u32::from(p.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Slot index → most recent score. Serialized as a fixed-length array with
/// `null` for unattempted slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotScores([Option<Percentage>; SLOTS_PER_MATERIAL]);

impl SlotScores {
    pub fn get(&self, slot: SlotIndex) -> Option<Percentage> {
        self.0[slot.index()]
    }

    /// Store a score, returning the one it replaced.
    pub fn set(&mut self, slot: SlotIndex, score: Percentage) -> Option<Percentage> {
        self.0[slot.index()].replace(score)
    }

    /// Scored slots in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, Percentage)> + '_ {
        SlotIndex::all().filter_map(|slot| self.get(slot).map(|score| (slot, score)))
    }

    /// Slots attempted at least once.
    pub fn completed(&self) -> Vec<SlotIndex> {
        self.iter().map(|(slot, _)| slot).collect()
    }

    pub fn is_complete(&self, slot: SlotIndex) -> bool {
        self.get(slot).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    pub fn all_attempted(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    pub fn any_failing(&self) -> bool {
        self.iter().any(|(_, score)| !score.is_passing())
    }

    /// Every slot attempted and none below the pass threshold.
    pub fn all_passed(&self) -> bool {
        self.all_attempted() && !self.any_failing()
    }

    pub fn perfect_count(&self) -> usize {
        self.iter().filter(|(_, score)| score.is_perfect()).count()
    }
}

/// One unit of content plus its assessment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    pub format: MaterialFormat,
    pub level: Level,
    pub locked: bool,
    #[serde(default)]
    pub recommended: bool,
    #[serde(default)]
    pub assessment_scores: SlotScores,
}

impl Material {
    /// A fresh material: no scores, locked only if its tier starts locked.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        format: MaterialFormat,
        level: Level,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            format,
            level,
            locked: level.starts_locked(),
            recommended: false,
            assessment_scores: SlotScores::default(),
        }
    }

    pub fn recommended(mut self, recommended: bool) -> Self {
        self.recommended = recommended;
        self
    }

    pub fn completed_assessments(&self) -> Vec<SlotIndex> {
        self.assessment_scores.completed()
    }

    pub fn has_failing_score(&self) -> bool {
        self.assessment_scores.any_failing()
    }
}
