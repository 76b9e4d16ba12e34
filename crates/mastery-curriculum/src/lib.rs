//! Curriculum definitions.
//!
//! A curriculum is the fixed input of a learning session: the seed catalogue
//! (Foundational and Advanced materials), the remedial template the gate
//! injects, the question sets behind every assessment slot, and the gating
//! policy. It is authored as TOML; a default curriculum is embedded.
//!
//! Loading validates the shape the kernel relies on:
//! - material ids are unique across the catalogue and the remedial template
//! - the remedial template is Basic and the catalogue holds no Basic material
//! - every material has exactly two non-empty question sets
//! - every question's correct answer indexes into its options

pub mod definition;

pub use definition::{AssessmentSet, Grade, MaterialDefinition, QuizQuestion};

use mastery_kernel::{
    Catalogue, Gate, GatingPolicy, KernelError, Level, SLOTS_PER_MATERIAL, SlotIndex,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The curriculum shipped with the binary.
pub const DEFAULT_CURRICULUM: &str = include_str!("../curriculum/default.toml");

/// Errors raised while loading or validating a curriculum.
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    #[error("failed to read curriculum {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse curriculum: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate material id: {0}")]
    DuplicateId(String),

    #[error("remedial material {id} must be Basic, found {level}")]
    RemedialLevel { id: String, level: Level },

    #[error("catalogue material {0} is Basic; only the remedial template may be Basic")]
    BasicInCatalogue(String),

    #[error("material {id} has {found} assessments, expected {expected}")]
    AssessmentCount {
        id: String,
        found: usize,
        expected: usize,
    },

    #[error("material {id} assessment {slot} has no questions")]
    EmptyAssessment { id: String, slot: usize },

    #[error(
        "material {id} question {question}: correct answer {correct} is outside its {options} options"
    )]
    AnswerOutOfRange {
        id: String,
        question: u32,
        correct: usize,
        options: usize,
    },

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// A validated curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub policy: GatingPolicy,
    pub remedial: MaterialDefinition,
    pub materials: Vec<MaterialDefinition>,
}

impl Curriculum {
    /// Parse and validate the embedded default curriculum.
    pub fn builtin() -> Result<Self, CurriculumError> {
        Self::from_toml_str(DEFAULT_CURRICULUM)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CurriculumError> {
        let curriculum: Curriculum = toml::from_str(text)?;
        curriculum.validate()?;
        Ok(curriculum)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CurriculumError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CurriculumError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let curriculum = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            materials = curriculum.materials.len(),
            "curriculum loaded"
        );
        Ok(curriculum)
    }

    /// Replace the gating policy, keeping the content.
    pub fn with_policy(mut self, policy: GatingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), CurriculumError> {
        if self.remedial.level != Level::Basic {
            return Err(CurriculumError::RemedialLevel {
                id: self.remedial.id.clone(),
                level: self.remedial.level,
            });
        }

        let mut seen = BTreeSet::new();
        for def in self.definitions() {
            if !seen.insert(def.id.as_str()) {
                return Err(CurriculumError::DuplicateId(def.id.clone()));
            }
            validate_assessments(def)?;
        }

        if let Some(def) = self.materials.iter().find(|d| d.level == Level::Basic) {
            return Err(CurriculumError::BasicInCatalogue(def.id.clone()));
        }
        Ok(())
    }

    /// Every definition: the remedial template first, then the catalogue.
    pub fn definitions(&self) -> impl Iterator<Item = &MaterialDefinition> + '_ {
        std::iter::once(&self.remedial).chain(self.materials.iter())
    }

    pub fn definition(&self, id: &str) -> Option<&MaterialDefinition> {
        self.definitions().find(|d| d.id == id)
    }

    pub fn assessment(&self, id: &str, slot: SlotIndex) -> Option<&AssessmentSet> {
        self.definition(id).and_then(|d| d.assessment(slot))
    }

    /// The fixed starting catalogue: every non-remedial material, unscored.
    pub fn seed_catalogue(&self) -> Result<Catalogue, CurriculumError> {
        let materials = self
            .materials
            .iter()
            .map(MaterialDefinition::to_material)
            .collect();
        Ok(Catalogue::new(materials)?)
    }

    /// The gating engine for this curriculum's remedial template and policy.
    pub fn gate(&self) -> Result<Gate, CurriculumError> {
        Ok(Gate::new(self.remedial.to_material(), self.policy)?)
    }
}

fn validate_assessments(def: &MaterialDefinition) -> Result<(), CurriculumError> {
    if def.assessments.len() != SLOTS_PER_MATERIAL {
        return Err(CurriculumError::AssessmentCount {
            id: def.id.clone(),
            found: def.assessments.len(),
            expected: SLOTS_PER_MATERIAL,
        });
    }
    for (slot, set) in def.assessments.iter().enumerate() {
        if set.is_empty() {
            return Err(CurriculumError::EmptyAssessment {
                id: def.id.clone(),
                slot,
            });
        }
        for q in &set.questions {
            if q.correct_answer >= q.options.len() {
                return Err(CurriculumError::AnswerOutOfRange {
                    id: def.id.clone(),
                    question: q.id,
                    correct: q.correct_answer,
                    options: q.options.len(),
                });
            }
        }
    }
    Ok(())
}
