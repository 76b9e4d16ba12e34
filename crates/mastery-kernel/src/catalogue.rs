//! The ordered collection of materials visible to the learner.

use crate::error::KernelError;
use crate::material::{Level, Material, SLOTS_PER_MATERIAL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordered materials, unique by id.
///
/// Lock state is not stored separately: "Advanced is locked" means at least
/// one Advanced material has `locked = true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    materials: Vec<Material>,
}

impl Catalogue {
    /// Build a catalogue, rejecting duplicate ids.
    pub fn new(materials: Vec<Material>) -> Result<Self, KernelError> {
        let mut seen = BTreeSet::new();
        for material in &materials {
            if !seen.insert(material.id.as_str()) {
                return Err(KernelError::DuplicateMaterial(material.id.clone()));
            }
        }
        Ok(Self { materials })
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        self.materials.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn by_level(&self, level: Level) -> impl Iterator<Item = &Material> + '_ {
        self.materials.iter().filter(move |m| m.level == level)
    }

    /// The injected remedial material, if any.
    pub fn remedial(&self) -> Option<&Material> {
        self.by_level(Level::Basic).next()
    }

    pub fn has_remedial(&self) -> bool {
        self.remedial().is_some()
    }

    /// At least one Advanced material is locked.
    pub fn advanced_locked(&self) -> bool {
        self.by_level(Level::Advanced).any(|m| m.locked)
    }

    /// Advanced materials exist and none of them is locked.
    pub fn advanced_unlocked(&self) -> bool {
        let mut advanced = self.by_level(Level::Advanced).peekable();
        advanced.peek().is_some() && advanced.all(|m| !m.locked)
    }

    /// Any material anywhere holds a score below the pass threshold.
    pub fn any_failing(&self) -> bool {
        self.materials.iter().any(Material::has_failing_score)
    }

    /// Set `locked` on every Advanced material.
    pub fn set_advanced_locked(&mut self, locked: bool) {
        for material in self
            .materials
            .iter_mut()
            .filter(|m| m.level == Level::Advanced)
        {
            material.locked = locked;
        }
    }

    /// Insert at the front unless a material with the same id exists.
    ///
    /// Returns whether the material was inserted.
    pub fn prepend_if_absent(&mut self, material: Material) -> bool {
        if self.contains(&material.id) {
            return false;
        }
        self.materials.insert(0, material);
        true
    }

    /// Assessment slots across every material, locked or not.
    pub fn total_slots(&self) -> usize {
        self.materials.len() * SLOTS_PER_MATERIAL
    }
}

impl<'a> IntoIterator for &'a Catalogue {
    type Item = &'a Material;
    type IntoIter = std::slice::Iter<'a, Material>;

    fn into_iter(self) -> Self::IntoIter {
        self.materials.iter()
    }
}
