//! UX composition layer.
//!
//! This crate defines the view and command contracts frontends use against
//! one [`Session`]. The session stays the only owner of learner state; this
//! crate shapes what a frontend reads and translates what it asks for.

pub mod http;

use mastery_kernel::{Level, Material, MaterialFormat, SlotIndex, SlotScores, Transition};
use mastery_session::{ActiveAssessment, LearnerProfile, Session, SessionError};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialView {
    pub id: String,
    pub title: String,
    pub format: MaterialFormat,
    pub level: Level,
    pub locked: bool,
    pub recommended: bool,
    pub assessment_scores: SlotScores,
    pub completed_assessments: Vec<SlotIndex>,
}

impl From<&Material> for MaterialView {
    fn from(material: &Material) -> Self {
        Self {
            id: material.id.clone(),
            title: material.title.clone(),
            format: material.format,
            level: material.level,
            locked: material.locked,
            recommended: material.recommended,
            assessment_scores: material.assessment_scores,
            completed_assessments: material.completed_assessments(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub catalogue: Vec<MaterialView>,
    pub advisory: Option<String>,
    pub completion: u8,
    pub advanced_locked: bool,
    pub active_assessment: Option<ActiveAssessment>,
    pub last_fired: Vec<Transition>,
    pub profile: LearnerProfile,
    pub goal_reached: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UxQuery {
    State,
    Catalogue,
    Advisory,
    Completion,
    Activity,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UxCommand {
    StartAssessment {
        material_id: String,
        slot: usize,
    },
    AbandonAssessment,
    OpenMaterial {
        material_id: String,
    },
    Submit {
        material_id: String,
        slot: usize,
        correct: u32,
        total: u32,
    },
    Answer {
        answers: Vec<usize>,
    },
    DismissAdvisory,
    Evaluate,
    Reset,
}

#[derive(Debug, Error)]
pub enum UxError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone)]
pub struct UxService {
    session: Session,
}

impl UxService {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn catalogue(&self) -> Vec<MaterialView> {
        self.session
            .catalogue()
            .iter()
            .map(MaterialView::from)
            .collect()
    }

    pub fn state(&self) -> StateView {
        let session = &self.session;
        StateView {
            catalogue: self.catalogue(),
            advisory: session.advisory().map(str::to_string),
            completion: session.completion_percentage(),
            advanced_locked: session.catalogue().advanced_locked(),
            active_assessment: session.active_assessment().cloned(),
            last_fired: session.last_fired().to_vec(),
            profile: *session.profile(),
            goal_reached: session.profile().reached_goal(),
        }
    }

    pub fn query_json(&self, query: UxQuery) -> Result<Value, UxError> {
        match query {
            UxQuery::State => to_json(self.state()),
            UxQuery::Catalogue => to_json(self.catalogue()),
            UxQuery::Advisory => Ok(json!({ "advisory": self.session.advisory() })),
            UxQuery::Completion => {
                Ok(json!({ "completion": self.session.completion_percentage() }))
            }
            UxQuery::Activity => to_json(self.session.activity()),
            UxQuery::Profile => Ok(json!({
                "profile": self.session.profile(),
                "goal": LearnerProfile::goal(),
                "goalReached": self.session.profile().reached_goal(),
            })),
        }
    }

    /// Run a command and answer with the resulting state.
    pub fn execute(&mut self, command: UxCommand) -> Result<Value, UxError> {
        let session = &mut self.session;
        let detail = match command {
            UxCommand::StartAssessment { material_id, slot } => {
                session.start_assessment(&material_id, slot)?;
                json!({ "questions": session.active_questions() })
            }
            UxCommand::AbandonAssessment => {
                json!({ "abandoned": session.abandon_assessment() })
            }
            UxCommand::OpenMaterial { material_id } => {
                json!({ "notes": session.open_material(&material_id)? })
            }
            UxCommand::Submit {
                material_id,
                slot,
                correct,
                total,
            } => {
                let percentage = session.submit_assessment_result(&material_id, slot, correct, total)?;
                json!({ "percentage": percentage })
            }
            UxCommand::Answer { answers } => to_json(session.submit_answers(&answers)?)?,
            UxCommand::DismissAdvisory => {
                session.dismiss_advisory();
                Value::Null
            }
            UxCommand::Evaluate => json!({ "fired": session.evaluate() }),
            UxCommand::Reset => {
                session.reset()?;
                Value::Null
            }
        };
        Ok(json!({ "result": detail, "state": to_json(self.state())? }))
    }
}

fn to_json(value: impl Serialize) -> Result<Value, UxError> {
    serde_json::to_value(value).map_err(|e| UxError::Serialization(e.to_string()))
}
