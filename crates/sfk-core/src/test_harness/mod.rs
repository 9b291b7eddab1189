//! End-to-end test harness
//!
//! The simulator drives seeded participants through the full flow over
//! the in-memory services and checks the flow invariants on every
//! document it produces. Also home to the filled-in sample forms the
//! tests and the simulator share.

mod simulator;

pub use simulator::{
    run_simulator, run_walkthrough, SimulatorConfig, SimulatorReport, SimulatorStats, Violation,
};

use crate::forms::{PostStudyForm, PreStudyForm};

/// A pre-study form that passes validation
#[must_use]
pub fn sample_pre_study() -> PreStudyForm {
    PreStudyForm {
        age: Some(27),
        gender: Some("female".into()),
        education: Some("bachelor".into()),
        native_language: Some("english".into()),
        digital_confidence: Some(4),
        ai_frequency: Some("weekly".into()),
        ai_health_usage: Some("sometimes".into()),
        ai_health_usage_details: None,
        general_trust: Some(3),
        ai_accuracy: Some(3),
        compared_to_humans: Some("similar".into()),
        online_search_frequency: Some("monthly".into()),
        understanding_ability: Some(4),
        trust_sources: vec!["doctor".into(), "official sites".into()],
        response_preferences: vec!["concise".into()],
        speed_importance: Some(3),
        accept_slower: Some(4),
        open_expectations: None,
        device_type: Some("laptop".into()),
    }
}

/// A post-study form that passes validation
#[must_use]
pub fn sample_post_study() -> PostStudyForm {
    PostStudyForm {
        trustworthiness: Some(4),
        credibility: Some(4),
        consistency: Some(3),
        trust_direction: Some("increased".into()),
        trust_reason: Some("answers matched what my doctor said".into()),
        general_trust: Some(4),
        ai_accuracy: Some(3),
        ai_vs_human: Some("similar".into()),
        online_search_frequency: Some("monthly".into()),
        understanding_ability: Some(4),
        trust_sources: vec!["doctor".into()],
        preferred_style: Some("detailed".into()),
        speed_importance: Some(3),
        accept_slower_for_accuracy: Some(4),
        usability_frustration: Some(1),
        ai_thinking: Some(3),
        response_time_natural: Some(4),
        open_feedback: None,
    }
}
