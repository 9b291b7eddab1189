//! Stage and status enums for flow ordering

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Furthest page a participant has reached
///
/// Advanced by the client as pages are completed. Ordering is meaningful:
/// a later stage compares greater than an earlier one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum StudyStage {
    Introduction,
    Consent,
    PreStudy,
    Token,
    StudyExplanation,
    Study,
    PostStudy,
    Finish,
}

impl StudyStage {
    /// Wire name of the stage, as stored in `lastStage`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyStage::Introduction => "introduction",
            StudyStage::Consent => "consent",
            StudyStage::PreStudy => "pre-study",
            StudyStage::Token => "token",
            StudyStage::StudyExplanation => "study-explanation",
            StudyStage::Study => "study",
            StudyStage::PostStudy => "post-study",
            StudyStage::Finish => "finish",
        }
    }

    /// All stages in flow order
    #[inline]
    #[must_use]
    pub fn ordered() -> [StudyStage; 8] {
        [
            StudyStage::Introduction,
            StudyStage::Consent,
            StudyStage::PreStudy,
            StudyStage::Token,
            StudyStage::StudyExplanation,
            StudyStage::Study,
            StudyStage::PostStudy,
            StudyStage::Finish,
        ]
    }
}

impl Display for StudyStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StudyStage {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudyStage::ordered()
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| StageError::UnknownStage(s.to_string()))
    }
}

/// Overall study status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyStatus {
    InProgress,
    Completed,
}

impl StudyStatus {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyStatus::InProgress => "in_progress",
            StudyStatus::Completed => "completed",
        }
    }
}

impl Display for StudyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordinal index into the four experimental conditions of the main study
///
/// Domain is 1..=4 and advancement is monotonic non-decreasing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScenarioStage(u8);

impl ScenarioStage {
    pub const MIN: ScenarioStage = ScenarioStage(1);
    pub const MAX: ScenarioStage = ScenarioStage(4);

    /// Create from an ordinal, validating the 1..=4 domain
    pub fn new(stage: u8) -> Result<Self, StageError> {
        if (1..=4).contains(&stage) {
            Ok(Self(stage))
        } else {
            Err(StageError::ScenarioOutOfRange(stage))
        }
    }

    /// First scenario stage
    #[inline]
    #[must_use]
    pub fn first() -> Self {
        Self::MIN
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Next stage, clamped at the ceiling
    #[inline]
    #[must_use]
    pub fn next_clamped(&self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    #[inline]
    #[must_use]
    pub fn is_last(&self) -> bool {
        *self == Self::MAX
    }

    /// Key used in the per-stage timing maps, e.g. `stage_3`
    #[inline]
    #[must_use]
    pub fn timing_key(&self) -> String {
        format!("stage_{}", self.0)
    }
}

impl Display for ScenarioStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage parsing and domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// Not one of the known page stages
    #[error("unknown study stage: {0:?}")]
    UnknownStage(String),

    /// Scenario ordinal outside 1..=4
    #[error("scenario stage {0} outside the valid range 1..=4")]
    ScenarioOutOfRange(u8),
}
