//! The per-participant document
//!
//! [`ParticipantRecord`] mirrors the stored JSON document one-to-one. It is
//! created in full on first registration (every later mutation is a partial
//! field update, so the skeleton must already contain every path) and is
//! never deleted by the normal flow.

use crate::stage::{ScenarioStage, StudyStage, StudyStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// The four experimental conditions of the main study, in document order
pub const SCENARIO_CONDITIONS: [&str; 4] = ["slow_easy", "fast_easy", "slow_hard", "fast_hard"];

/// Opaque per-participant identifier
///
/// Issued externally as a UUID, used both as the document key and as the
/// identity display-name. Immutable once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyToken(Uuid);

impl StudyToken {
    /// Generate a fresh token
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for StudyToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudyToken {
    type Err = TokenError;

    /// Accepts only the canonical lowercase-hyphenated form, matching the
    /// server-side validation of issued tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TokenError::Missing);
        }
        let parsed = Uuid::parse_str(s).map_err(|_| TokenError::Malformed(s.to_string()))?;
        if parsed.to_string() != s {
            return Err(TokenError::Malformed(s.to_string()));
        }
        Ok(Self(parsed))
    }
}

/// Study token errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// No token present at all
    #[error("no study token present")]
    Missing,

    /// Not a canonical UUID
    #[error("study token is not a canonical UUID: {0:?}")]
    Malformed(String),
}

/// Full participant document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub study_token: StudyToken,
    /// Server-time stamps in epoch milliseconds, resolved by the store
    pub created_at: Option<i64>,
    pub last_active_at: Option<i64>,
    pub completion_timestamp: Option<i64>,
    pub consent_timestamp: Option<i64>,
    pub consent_given: bool,
    pub last_stage: StudyStage,
    pub study_status: StudyStatus,
    pub device_info: DeviceInfo,
    pub pre_study_questionnaire: PreStudySection,
    pub main_study: MainStudySection,
    pub post_study_questionnaire: PostStudySection,
    pub study_compensation: CompensationSection,
}

impl ParticipantRecord {
    /// Full skeleton written on first visit
    ///
    /// Every nested field is present (as null/false/empty) so that later
    /// dotted partial updates always have a parent object to land in.
    #[must_use]
    pub fn new(study_token: StudyToken) -> Self {
        Self {
            study_token,
            created_at: None,
            last_active_at: None,
            completion_timestamp: None,
            consent_timestamp: None,
            consent_given: false,
            last_stage: StudyStage::Introduction,
            study_status: StudyStatus::InProgress,
            device_info: DeviceInfo::default(),
            pre_study_questionnaire: PreStudySection::default(),
            main_study: MainStudySection::default(),
            post_study_questionnaire: PostStudySection::default(),
            study_compensation: CompensationSection::default(),
        }
    }

    /// Serialize into the stored document form
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Deserialize from the stored document form
    pub fn from_document(doc: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(doc)
    }
}

/// Client environment captured at registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub screen_resolution: Option<String>,
}

/// Pre-study questionnaire sub-document
///
/// `completed` guards re-submission: once true, the form is gated from
/// re-entry and a second write is refused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreStudySection {
    pub timestamp: Option<i64>,
    pub demographics: Demographics,
    pub digital_confidence: Option<u8>,
    pub ai_experience: AiExperience,
    pub ai_trust: AiTrust,
    pub health_literacy: HealthLiteracy,
    pub expectations: Expectations,
    pub device_type: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub native_language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiExperience {
    pub frequency: Option<String>,
    pub health_usage: Option<String>,
    pub health_usage_details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTrust {
    pub general_trust: Option<u8>,
    pub accuracy: Option<u8>,
    pub compared_to_humans: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLiteracy {
    pub online_search_frequency: Option<String>,
    pub understanding_ability: Option<u8>,
    pub trust_sources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectations {
    pub response_preferences: Vec<String>,
    pub speed_importance: Option<u8>,
    pub accept_slower: Option<u8>,
    pub open_expectations: Option<String>,
}

/// Main-scenario section: timing maps, progression state and the four
/// condition records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainStudySection {
    /// Click-to-loading-indicator latency per stage, keyed `stage_N`, ms
    pub submit_vs_loading_appear_time_difference: BTreeMap<String, u64>,
    /// Loading-indicator-to-response latency per stage, keyed `stage_N`, ms
    pub loading_to_response_time_difference: BTreeMap<String, u64>,
    /// Timeout markers (epoch ms of the abort), keyed `stage_N`. A stage has
    /// either a response latency or a timeout marker, never a fabricated one.
    pub observer_timeouts: BTreeMap<String, i64>,
    pub last_scenario_stage: Option<ScenarioStage>,
    pub gradio_app_finished: bool,
    pub scenarios: ScenarioSet,
}

impl Default for MainStudySection {
    fn default() -> Self {
        Self {
            submit_vs_loading_appear_time_difference: BTreeMap::new(),
            loading_to_response_time_difference: BTreeMap::new(),
            observer_timeouts: BTreeMap::new(),
            last_scenario_stage: None,
            gradio_app_finished: false,
            scenarios: ScenarioSet::default(),
        }
    }
}

/// Fixed set of the four named conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub slow_easy: ScenarioCondition,
    pub fast_easy: ScenarioCondition,
    pub slow_hard: ScenarioCondition,
    pub fast_hard: ScenarioCondition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCondition {
    pub number_in_study_order: Option<u8>,
    pub scenario_title: Option<String>,
    pub tokens_per_second: Option<f64>,
    pub feedback: ScenarioFeedback,
}

/// Five-point feedback ratings collected per condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFeedback {
    pub perceived_accuracy: Option<u8>,
    pub perceived_completeness: Option<u8>,
    pub perceived_usefulness: Option<u8>,
    pub comprehensibility: Option<u8>,
    pub trust_in_answer: Option<u8>,
}

/// Post-study questionnaire sub-document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStudySection {
    pub timestamp: Option<i64>,
    pub ai_perception: AiPerception,
    pub trust_change: TrustChange,
    pub health_literacy: HealthLiteracy,
    pub answer_preferences: AnswerPreferences,
    pub user_experience: UserExperience,
    pub open_feedback: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPerception {
    pub trustworthiness: Option<u8>,
    pub credibility: Option<u8>,
    pub consistency: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustChange {
    pub direction: Option<String>,
    pub reason: Option<String>,
    pub general_trust: Option<u8>,
    pub ai_accuracy: Option<u8>,
    pub ai_vs_human: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPreferences {
    pub preferred_style: Option<String>,
    pub speed_importance: Option<u8>,
    pub accept_slower_for_accuracy: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExperience {
    pub usability_frustration: Option<u8>,
    pub ai_thinking: Option<u8>,
    pub response_time_natural: Option<u8>,
}

/// Compensation section; freely re-editable, unlike the questionnaires
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationSection {
    pub matriculation_number: Option<String>,
    pub submitted_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_accepts_only_canonical_uuids() {
        let token = StudyToken::generate();
        let round = token.to_string().parse::<StudyToken>().unwrap();
        assert_eq!(round, token);

        assert_eq!("".parse::<StudyToken>(), Err(TokenError::Missing));
        assert!(matches!(
            "not-a-uuid".parse::<StudyToken>(),
            Err(TokenError::Malformed(_))
        ));
        // Uppercase parses as a UUID but is not the canonical form we issue.
        let upper = token.to_string().to_uppercase();
        assert!(matches!(
            upper.parse::<StudyToken>(),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn skeleton_contains_every_update_target() {
        let record = ParticipantRecord::new(StudyToken::generate());
        let doc = record.to_document().unwrap();

        assert_eq!(doc["consentGiven"], serde_json::json!(false));
        assert_eq!(doc["studyStatus"], serde_json::json!("in_progress"));
        assert_eq!(doc["lastStage"], serde_json::json!("introduction"));
        assert!(doc["mainStudy"]["scenarios"]["slow_easy"]["feedback"].is_object());
        assert!(doc["mainStudy"]["submit_vs_loading_appear_time_difference"].is_object());
        assert!(doc["postStudyQuestionnaire"]["completed"]
            .as_bool()
            .is_some_and(|b| !b));
        assert!(doc["studyCompensation"]["matriculationNumber"].is_null());
    }

    #[test]
    fn document_round_trip() {
        let record = ParticipantRecord::new(StudyToken::generate());
        let doc = record.to_document().unwrap();
        let back = ParticipantRecord::from_document(doc).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn scenario_set_has_all_four_conditions() {
        let record = ParticipantRecord::new(StudyToken::generate());
        let doc = record.to_document().unwrap();
        for name in SCENARIO_CONDITIONS {
            assert!(doc["mainStudy"]["scenarios"][name].is_object(), "{name}");
        }
    }
}
