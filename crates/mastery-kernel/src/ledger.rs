//! Score Ledger: per-material record of attempted slots and their scores.
//!
//! The ledger is pure data. Recording a score never triggers a gating pass;
//! the caller runs the gate after every `record_score`.

use crate::catalogue::Catalogue;
use crate::error::KernelError;
use crate::material::{Percentage, SlotIndex, SlotScores};

/// Read/write access to assessment scores keyed by material id.
pub trait ScoreLedger {
    /// Mark `slot` completed and store `score`, overwriting any previous one.
    ///
    /// Returns the score that was replaced.
    fn record_score(
        &mut self,
        material_id: &str,
        slot: SlotIndex,
        score: Percentage,
    ) -> Result<Option<Percentage>, KernelError>;

    /// Slot → most recent score for one material.
    fn scores_for(&self, material_id: &str) -> Result<SlotScores, KernelError>;

    /// Whether `slot` of the material was attempted at least once.
    fn is_complete(&self, material_id: &str, slot: SlotIndex) -> Result<bool, KernelError> {
        Ok(self.scores_for(material_id)?.is_complete(slot))
    }
}

impl ScoreLedger for Catalogue {
    fn record_score(
        &mut self,
        material_id: &str,
        slot: SlotIndex,
        score: Percentage,
    ) -> Result<Option<Percentage>, KernelError> {
        let material = self
            .get_mut(material_id)
            .ok_or_else(|| KernelError::UnknownMaterial(material_id.to_string()))?;
        let previous = material.assessment_scores.set(slot, score);
        tracing::debug!(
            material = material_id,
            slot = slot.index(),
            score = score.value(),
            "score recorded"
        );
        Ok(previous)
    }

    fn scores_for(&self, material_id: &str) -> Result<SlotScores, KernelError> {
        self.get(material_id)
            .map(|m| m.assessment_scores)
            .ok_or_else(|| KernelError::UnknownMaterial(material_id.to_string()))
    }
}
