//! Curriculum content: materials, their notes, and their question sets.

use mastery_kernel::{Level, Material, MaterialFormat, SlotIndex};
use serde::{Deserialize, Serialize};

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    #[serde(alias = "correct_answer")]
    pub correct_answer: usize,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub explanation: String,
}

/// The questions behind one assessment slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssessmentSet {
    pub questions: Vec<QuizQuestion>,
}

/// Outcome of grading one set of answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub correct: u32,
    pub total: u32,
    /// Ids of the questions answered wrongly, in question order.
    pub missed: Vec<u32>,
}

impl AssessmentSet {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Grade chosen option indices, one per question in order.
    ///
    /// Returns `None` when the number of answers does not match the number
    /// of questions.
    pub fn grade(&self, answers: &[usize]) -> Option<Grade> {
        if answers.len() != self.questions.len() {
            return None;
        }
        let missed: Vec<u32> = self
            .questions
            .iter()
            .zip(answers)
            .filter(|(q, answer)| q.correct_answer != **answer)
            .map(|(q, _)| q.id)
            .collect();
        let total = self.questions.len() as u32;
        Some(Grade {
            correct: total - missed.len() as u32,
            total,
            missed,
        })
    }
}

/// A material as authored: metadata, study notes, and its question sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDefinition {
    pub id: String,
    pub title: String,
    pub format: MaterialFormat,
    pub level: Level,
    #[serde(default)]
    pub recommended: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub assessments: Vec<AssessmentSet>,
}

impl MaterialDefinition {
    /// A fresh, unscored material for the catalogue.
    pub fn to_material(&self) -> Material {
        Material::new(self.id.clone(), self.title.clone(), self.format, self.level)
            .recommended(self.recommended)
    }

    pub fn assessment(&self, slot: SlotIndex) -> Option<&AssessmentSet> {
        self.assessments.get(slot.index())
    }
}
