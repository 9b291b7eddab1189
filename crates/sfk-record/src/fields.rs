//! Well-known field paths of the participant document
//!
//! Controllers build their partial updates from these instead of ad-hoc
//! strings so a renamed document field breaks compilation in one place.

use crate::path::FieldPath;
use crate::stage::ScenarioStage;

pub const CREATED_AT: &str = "createdAt";
pub const CONSENT_GIVEN: &str = "consentGiven";
pub const CONSENT_TIMESTAMP: &str = "consentTimestamp";
pub const LAST_STAGE: &str = "lastStage";
pub const LAST_ACTIVE_AT: &str = "lastActiveAt";
pub const STUDY_STATUS: &str = "studyStatus";
pub const COMPLETION_TIMESTAMP: &str = "completionTimestamp";
pub const PRE_STUDY: &str = "preStudyQuestionnaire";
pub const POST_STUDY: &str = "postStudyQuestionnaire";
pub const STUDY_COMPENSATION: &str = "studyCompensation";

#[inline]
#[must_use]
pub fn created_at() -> FieldPath {
    FieldPath::single(CREATED_AT)
}

#[inline]
#[must_use]
pub fn consent_given() -> FieldPath {
    FieldPath::single(CONSENT_GIVEN)
}

#[inline]
#[must_use]
pub fn consent_timestamp() -> FieldPath {
    FieldPath::single(CONSENT_TIMESTAMP)
}

#[inline]
#[must_use]
pub fn last_stage() -> FieldPath {
    FieldPath::single(LAST_STAGE)
}

#[inline]
#[must_use]
pub fn last_active_at() -> FieldPath {
    FieldPath::single(LAST_ACTIVE_AT)
}

#[inline]
#[must_use]
pub fn study_status() -> FieldPath {
    FieldPath::single(STUDY_STATUS)
}

#[inline]
#[must_use]
pub fn completion_timestamp() -> FieldPath {
    FieldPath::single(COMPLETION_TIMESTAMP)
}

#[inline]
#[must_use]
pub fn device_user_agent() -> FieldPath {
    FieldPath::single("deviceInfo").child("userAgent")
}

#[inline]
#[must_use]
pub fn device_screen_resolution() -> FieldPath {
    FieldPath::single("deviceInfo").child("screenResolution")
}

#[inline]
#[must_use]
pub fn pre_study() -> FieldPath {
    FieldPath::single(PRE_STUDY)
}

#[inline]
#[must_use]
pub fn post_study() -> FieldPath {
    FieldPath::single(POST_STUDY)
}

#[inline]
#[must_use]
pub fn study_compensation() -> FieldPath {
    FieldPath::single(STUDY_COMPENSATION)
}

#[inline]
#[must_use]
pub fn last_scenario_stage() -> FieldPath {
    FieldPath::single("mainStudy").child("last_scenario_stage")
}

#[inline]
#[must_use]
pub fn gradio_app_finished() -> FieldPath {
    FieldPath::single("mainStudy").child("gradio_app_finished")
}

/// `mainStudy.submit_vs_loading_appear_time_difference.stage_N`
#[inline]
#[must_use]
pub fn appear_latency(stage: ScenarioStage) -> FieldPath {
    FieldPath::single("mainStudy")
        .child("submit_vs_loading_appear_time_difference")
        .child(stage.timing_key())
}

/// `mainStudy.loading_to_response_time_difference.stage_N`
#[inline]
#[must_use]
pub fn response_latency(stage: ScenarioStage) -> FieldPath {
    FieldPath::single("mainStudy")
        .child("loading_to_response_time_difference")
        .child(stage.timing_key())
}

/// `mainStudy.observer_timeouts.stage_N`
#[inline]
#[must_use]
pub fn observer_timeout(stage: ScenarioStage) -> FieldPath {
    FieldPath::single("mainStudy")
        .child("observer_timeouts")
        .child(stage.timing_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_paths_are_stage_keyed() {
        let stage = ScenarioStage::new(3).unwrap();
        assert_eq!(
            appear_latency(stage).to_string(),
            "mainStudy.submit_vs_loading_appear_time_difference.stage_3"
        );
        assert_eq!(
            response_latency(stage).to_string(),
            "mainStudy.loading_to_response_time_difference.stage_3"
        );
        assert_eq!(
            observer_timeout(stage).to_string(),
            "mainStudy.observer_timeouts.stage_3"
        );
    }
}
