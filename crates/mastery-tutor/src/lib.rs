//! Tutor collaborator boundary.
//!
//! The tutor is the only asynchronous edge of a session. A [`TutorBackend`]
//! turns a [`TutorRequest`] into reply text; [`Tutor`] wraps a backend with a
//! timeout and swallows every failure into [`FALLBACK_REPLY`], so nothing the
//! backend does can reach learner state.
//!
//! No network transport ships here. [`Unavailable`] is the backend used when
//! none is configured.

use async_trait::async_trait;
use mastery_session::LearnerProfile;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert AI Computer Science Tutor for the Malaysian SPM syllabus.";

pub const FALLBACK_REPLY: &str = "I'm having trouble connecting to the tutor service right now.";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error("tutor unavailable: {0}")]
    Unavailable(String),

    #[error("tutor backend failed: {0}")]
    Backend(String),

    #[error("tutor did not answer within {0:?}")]
    Timeout(Duration),

    #[error("message is empty")]
    EmptyMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Everything a backend sees for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
    pub system_instruction: &'static str,
    pub message: String,
    pub profile: LearnerProfile,
    /// Earlier turns, oldest first.
    pub history: Vec<ChatTurn>,
}

#[async_trait]
pub trait TutorBackend: Send + Sync {
    async fn reply(&self, request: &TutorRequest) -> Result<String, TutorError>;
}

/// Backend for sessions with no tutor configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl TutorBackend for Unavailable {
    async fn reply(&self, _request: &TutorRequest) -> Result<String, TutorError> {
        Err(TutorError::Unavailable("no tutor backend configured".to_string()))
    }
}

/// What the learner sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorReply {
    pub text: String,
    /// The backend failed and `text` is the fallback message.
    pub fallback: bool,
}

/// A conversation with one backend.
pub struct Tutor<B> {
    backend: B,
    timeout: Duration,
    history: Vec<ChatTurn>,
}

impl<B: TutorBackend> Tutor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
            history: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Ask one question. Backend failures and timeouts become the fallback
    /// reply; only an empty message is an error.
    pub async fn ask(
        &mut self,
        message: &str,
        profile: &LearnerProfile,
    ) -> Result<TutorReply, TutorError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(TutorError::EmptyMessage);
        }
        let request = TutorRequest {
            system_instruction: SYSTEM_INSTRUCTION,
            message: message.to_string(),
            profile: *profile,
            history: self.history.clone(),
        };

        let reply = match self.try_reply(&request).await {
            Ok(text) => TutorReply {
                text,
                fallback: false,
            },
            Err(e) => {
                tracing::warn!(error = %e, "tutor fallback");
                TutorReply {
                    text: FALLBACK_REPLY.to_string(),
                    fallback: true,
                }
            }
        };

        self.history.push(ChatTurn {
            role: ChatRole::User,
            text: request.message,
        });
        self.history.push(ChatTurn {
            role: ChatRole::Model,
            text: reply.text.clone(),
        });
        Ok(reply)
    }

    async fn try_reply(&self, request: &TutorRequest) -> Result<String, TutorError> {
        tokio::time::timeout(self.timeout, self.backend.reply(request))
            .await
            .map_err(|_| TutorError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers with the number of history turns it was given.
    struct Counting;

    #[async_trait]
    impl TutorBackend for Counting {
        async fn reply(&self, request: &TutorRequest) -> Result<String, TutorError> {
            Ok(format!("{} turns before: {}", request.history.len(), request.message))
        }
    }

    struct Slow;

    #[async_trait]
    impl TutorBackend for Slow {
        async fn reply(&self, _request: &TutorRequest) -> Result<String, TutorError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<TutorRequest>>);

    #[async_trait]
    impl TutorBackend for Recording {
        async fn reply(&self, request: &TutorRequest) -> Result<String, TutorError> {
            self.0.lock().unwrap().push(request.clone());
            Err(TutorError::Backend("HTTP 500".to_string()))
        }
    }

    #[tokio::test]
    async fn replies_carry_history_forward() {
        let mut tutor = Tutor::new(Counting);
        let profile = LearnerProfile::default();
        let first = tutor.ask("what is a loop?", &profile).await.unwrap();
        assert_eq!(first.text, "0 turns before: what is a loop?");
        assert!(!first.fallback);

        let second = tutor.ask("  and recursion?  ", &profile).await.unwrap();
        assert_eq!(second.text, "2 turns before: and recursion?");
        assert_eq!(tutor.history().len(), 4);
        assert_eq!(tutor.history()[2].role, ChatRole::User);
        assert_eq!(tutor.history()[2].text, "and recursion?");
    }

    #[tokio::test]
    async fn unavailable_backend_falls_back() {
        let mut tutor = Tutor::new(Unavailable);
        let reply = tutor.ask("hello", &LearnerProfile::default()).await.unwrap();
        assert!(reply.fallback);
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert_eq!(tutor.history()[1].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn slow_backend_times_out_into_fallback() {
        let mut tutor = Tutor::new(Slow).with_timeout(Duration::from_millis(20));
        let reply = tutor.ask("hello", &LearnerProfile::default()).await.unwrap();
        assert!(reply.fallback);
    }

    #[tokio::test]
    async fn request_includes_instruction_and_profile() {
        let backend = Recording::default();
        let mut profile = LearnerProfile::default();
        profile.record_engagement();
        let mut tutor = Tutor::new(backend);
        tutor.ask("explain SQL joins", &profile).await.unwrap();

        let seen = tutor.backend.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system_instruction, SYSTEM_INSTRUCTION);
        assert_eq!(seen[0].profile, profile);

        let json = serde_json::to_value(&seen[0]).unwrap();
        assert_eq!(json["profile"]["engagement"], "engaged");
        assert_eq!(json["systemInstruction"], SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_a_call() {
        let mut tutor = Tutor::new(Counting);
        let err = tutor.ask("   ", &LearnerProfile::default()).await.unwrap_err();
        assert!(matches!(err, TutorError::EmptyMessage));
        assert!(tutor.history().is_empty());
    }
}
