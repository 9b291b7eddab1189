//! SFK Record - Participant Record Model
//!
//! Typed model of the per-participant document held in the remote store.
//!
//! # Core Concepts
//!
//! - [`ParticipantRecord`]: the full per-token document, created once on
//!   registration and mutated field-by-field throughout the study
//! - [`FieldPath`]: dotted addressing for partial updates
//!   (`mainStudy.last_scenario_stage`)
//! - [`UpdateValue`]: a concrete JSON value or one of the store sentinels
//!   (server time, array union)
//! - [`StudyStage`] / [`StudyStatus`] / [`ScenarioStage`]: the enums that
//!   gate and order the flow

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod fields;
mod path;
mod record;
mod stage;
mod update;

pub use path::{FieldPath, PathError};
pub use record::{
    AiExperience, AiPerception, AiTrust, AnswerPreferences, CompensationSection, Demographics,
    DeviceInfo, Expectations, HealthLiteracy, MainStudySection, ParticipantRecord,
    PostStudySection, PreStudySection, ScenarioCondition, ScenarioFeedback, ScenarioSet,
    StudyToken, TokenError, TrustChange, UserExperience, SCENARIO_CONDITIONS,
};
pub use stage::{ScenarioStage, StageError, StudyStage, StudyStatus};
pub use update::{apply_update, UpdateError, UpdateValue};
