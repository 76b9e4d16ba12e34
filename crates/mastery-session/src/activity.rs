//! Learner-facing activity log.
//!
//! Entries are kept newest first. The log is a record of what the learner and
//! the system did during a session; it is separate from `tracing` output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    /// Something the learner did.
    Sensor,
    /// A gating decision.
    Reasoning,
    /// Something the system said back.
    Actuator,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Sensor => "SENSOR",
            ActivityKind::Reasoning => "REASONING",
            ActivityKind::Actuator => "ACTUATOR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ActivityKind, message: impl Into<String>) -> &ActivityEntry {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            message: message.into(),
        };
        self.entries.insert(0, entry);
        &self.entries[0]
    }

    pub fn sensor(&mut self, message: impl Into<String>) {
        self.push(ActivityKind::Sensor, message);
    }

    pub fn reasoning(&mut self, message: impl Into<String>) {
        self.push(ActivityKind::Reasoning, message);
    }

    pub fn actuator(&mut self, message: impl Into<String>) {
        self.push(ActivityKind::Actuator, message);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
