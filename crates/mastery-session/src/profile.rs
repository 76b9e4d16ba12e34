//! Learner profile: a coarse classification of recent performance.
//!
//! The profile is context for the tutor, not an input to gating.

use mastery_kernel::Percentage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    #[default]
    NotCompleted,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    #[default]
    NoScore,
    Low,
    Medium,
    High,
}

impl ScoreLevel {
    /// Low below 50, Medium below 80, High otherwise.
    pub fn classify(score: Percentage) -> Self {
        match score.value() {
            0..50 => ScoreLevel::Low,
            50..80 => ScoreLevel::Medium,
            _ => ScoreLevel::High,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementStatus {
    #[default]
    NotImproved,
    Improved,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPattern {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    #[default]
    NoInteraction,
    Engaged,
    Responded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceClassification {
    #[default]
    Low,
    High,
}

/// Score at or above which performance counts as high.
pub const HIGH_PERFORMANCE: u8 = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub quiz_status: QuizStatus,
    pub score_level: ScoreLevel,
    pub improvement: ImprovementStatus,
    pub error_pattern: ErrorPattern,
    pub engagement: EngagementStatus,
    pub performance: PerformanceClassification,
}

impl LearnerProfile {
    /// The profile a learner is working toward.
    pub fn goal() -> Self {
        Self {
            quiz_status: QuizStatus::Completed,
            score_level: ScoreLevel::High,
            improvement: ImprovementStatus::Improved,
            error_pattern: ErrorPattern::Low,
            engagement: EngagementStatus::Responded,
            performance: PerformanceClassification::High,
        }
    }

    pub fn reached_goal(&self) -> bool {
        *self == Self::goal()
    }

    /// Fold in one graded submission.
    ///
    /// `previous` is the score the slot held before this submission; beating
    /// it marks the learner as improved.
    pub fn record_result(&mut self, score: Percentage, missed: u32, previous: Option<Percentage>) {
        self.quiz_status = QuizStatus::Completed;
        self.score_level = ScoreLevel::classify(score);
        self.error_pattern = if missed > 0 {
            ErrorPattern::High
        } else {
            ErrorPattern::Low
        };
        self.performance = if score.value() >= HIGH_PERFORMANCE {
            PerformanceClassification::High
        } else {
            PerformanceClassification::Low
        };
        if previous.is_some_and(|prev| score > prev) {
            self.improvement = ImprovementStatus::Improved;
        }
    }

    pub fn record_engagement(&mut self) {
        if self.engagement == EngagementStatus::NoInteraction {
            self.engagement = EngagementStatus::Engaged;
        }
    }

    pub fn record_response(&mut self) {
        self.engagement = EngagementStatus::Responded;
    }
}
