//! Questionnaire inputs and validation
//!
//! Forms carry exactly what the participant typed; [`validate`] runs the
//! client-side rules before any remote call, and `to_section` shapes the
//! answers into the document sub-sections. Scale answers are 1..=5
//! throughout.

use once_cell::sync::Lazy;
use regex::Regex;
use sfk_record::{
    AiExperience, AiPerception, AiTrust, AnswerPreferences, Demographics, Expectations,
    HealthLiteracy, PostStudySection, PreStudySection, TrustChange, UserExperience,
};

const FREE_TEXT_MAX: usize = 1_000;

static MATRICULATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6,8}$").expect("matriculation pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("select at least one option for {0}")]
    EmptyChoiceGroup(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("matriculation number must be 6 to 8 digits")]
    InvalidMatriculation,

    #[error("consent is required to participate")]
    ConsentRequired,

    #[error("please describe the problem before sending")]
    EmptyDescription,
}

/// Matriculation numbers are 6 to 8 digits, nothing else
pub fn validate_matriculation(input: &str) -> Result<&str, ValidationError> {
    let trimmed = input.trim();
    if MATRICULATION.is_match(trimmed) {
        Ok(trimmed)
    } else {
        Err(ValidationError::InvalidMatriculation)
    }
}

fn require<T>(value: &Option<T>, field: &'static str) -> Result<(), ValidationError> {
    if value.is_some() {
        Ok(())
    } else {
        Err(ValidationError::Missing(field))
    }
}

fn scale(value: Option<u8>, field: &'static str) -> Result<(), ValidationError> {
    match value {
        None => Err(ValidationError::Missing(field)),
        Some(v) if (1..=5).contains(&v) => Ok(()),
        Some(_) => Err(ValidationError::OutOfRange {
            field,
            min: 1,
            max: 5,
        }),
    }
}

fn at_least_one(values: &[String], field: &'static str) -> Result<(), ValidationError> {
    if values.iter().any(|v| !v.trim().is_empty()) {
        Ok(())
    } else {
        Err(ValidationError::EmptyChoiceGroup(field))
    }
}

fn free_text(value: &Option<String>, field: &'static str) -> Result<(), ValidationError> {
    match value {
        Some(text) if text.chars().count() > FREE_TEXT_MAX => Err(ValidationError::TooLong {
            field,
            max: FREE_TEXT_MAX,
        }),
        _ => Ok(()),
    }
}

/// Pre-study questionnaire input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreStudyForm {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub native_language: Option<String>,
    pub digital_confidence: Option<u8>,
    pub ai_frequency: Option<String>,
    pub ai_health_usage: Option<String>,
    pub ai_health_usage_details: Option<String>,
    pub general_trust: Option<u8>,
    pub ai_accuracy: Option<u8>,
    pub compared_to_humans: Option<String>,
    pub online_search_frequency: Option<String>,
    pub understanding_ability: Option<u8>,
    pub trust_sources: Vec<String>,
    pub response_preferences: Vec<String>,
    pub speed_importance: Option<u8>,
    pub accept_slower: Option<u8>,
    pub open_expectations: Option<String>,
    pub device_type: Option<String>,
}

impl PreStudyForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.age {
            None => return Err(ValidationError::Missing("age")),
            Some(age) if !(18..=120).contains(&age) => {
                return Err(ValidationError::OutOfRange {
                    field: "age",
                    min: 18,
                    max: 120,
                })
            }
            Some(_) => {}
        }
        require(&self.gender, "gender")?;
        require(&self.education, "education")?;
        require(&self.native_language, "native language")?;
        scale(self.digital_confidence, "digital confidence")?;
        require(&self.ai_frequency, "AI usage frequency")?;
        require(&self.ai_health_usage, "AI health usage")?;
        free_text(&self.ai_health_usage_details, "AI health usage details")?;
        scale(self.general_trust, "general trust")?;
        scale(self.ai_accuracy, "AI accuracy")?;
        require(&self.compared_to_humans, "comparison to humans")?;
        require(&self.online_search_frequency, "online search frequency")?;
        scale(self.understanding_ability, "understanding ability")?;
        at_least_one(&self.trust_sources, "trusted sources")?;
        at_least_one(&self.response_preferences, "response preferences")?;
        scale(self.speed_importance, "speed importance")?;
        scale(self.accept_slower, "accepting slower answers")?;
        free_text(&self.open_expectations, "expectations")?;
        require(&self.device_type, "device type")?;
        Ok(())
    }

    /// Shape into the document sub-section; `completed` is set here so the
    /// write and the completion marker cannot drift apart.
    #[must_use]
    pub fn to_section(&self) -> PreStudySection {
        PreStudySection {
            timestamp: None,
            demographics: Demographics {
                age: self.age,
                gender: self.gender.clone(),
                education: self.education.clone(),
                native_language: self.native_language.clone(),
            },
            digital_confidence: self.digital_confidence,
            ai_experience: AiExperience {
                frequency: self.ai_frequency.clone(),
                health_usage: self.ai_health_usage.clone(),
                health_usage_details: self.ai_health_usage_details.clone(),
            },
            ai_trust: AiTrust {
                general_trust: self.general_trust,
                accuracy: self.ai_accuracy,
                compared_to_humans: self.compared_to_humans.clone(),
            },
            health_literacy: HealthLiteracy {
                online_search_frequency: self.online_search_frequency.clone(),
                understanding_ability: self.understanding_ability,
                trust_sources: self.trust_sources.clone(),
            },
            expectations: Expectations {
                response_preferences: self.response_preferences.clone(),
                speed_importance: self.speed_importance,
                accept_slower: self.accept_slower,
                open_expectations: self.open_expectations.clone(),
            },
            device_type: self.device_type.clone(),
            completed: true,
        }
    }
}

/// Post-study questionnaire input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostStudyForm {
    pub trustworthiness: Option<u8>,
    pub credibility: Option<u8>,
    pub consistency: Option<u8>,
    pub trust_direction: Option<String>,
    pub trust_reason: Option<String>,
    pub general_trust: Option<u8>,
    pub ai_accuracy: Option<u8>,
    pub ai_vs_human: Option<String>,
    pub online_search_frequency: Option<String>,
    pub understanding_ability: Option<u8>,
    pub trust_sources: Vec<String>,
    pub preferred_style: Option<String>,
    pub speed_importance: Option<u8>,
    pub accept_slower_for_accuracy: Option<u8>,
    pub usability_frustration: Option<u8>,
    pub ai_thinking: Option<u8>,
    pub response_time_natural: Option<u8>,
    pub open_feedback: Option<String>,
}

impl PostStudyForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        scale(self.trustworthiness, "trustworthiness")?;
        scale(self.credibility, "credibility")?;
        scale(self.consistency, "consistency")?;
        require(&self.trust_direction, "trust change")?;
        free_text(&self.trust_reason, "trust change reason")?;
        scale(self.general_trust, "general trust")?;
        scale(self.ai_accuracy, "AI accuracy")?;
        require(&self.ai_vs_human, "AI versus human")?;
        require(&self.online_search_frequency, "online search frequency")?;
        scale(self.understanding_ability, "understanding ability")?;
        at_least_one(&self.trust_sources, "trusted sources")?;
        require(&self.preferred_style, "preferred answer style")?;
        scale(self.speed_importance, "speed importance")?;
        scale(self.accept_slower_for_accuracy, "accepting slower answers")?;
        scale(self.usability_frustration, "usability frustration")?;
        scale(self.ai_thinking, "AI thinking impression")?;
        scale(self.response_time_natural, "response-time naturalness")?;
        free_text(&self.open_feedback, "open feedback")?;
        Ok(())
    }

    #[must_use]
    pub fn to_section(&self) -> PostStudySection {
        PostStudySection {
            timestamp: None,
            ai_perception: AiPerception {
                trustworthiness: self.trustworthiness,
                credibility: self.credibility,
                consistency: self.consistency,
            },
            trust_change: TrustChange {
                direction: self.trust_direction.clone(),
                reason: self.trust_reason.clone(),
                general_trust: self.general_trust,
                ai_accuracy: self.ai_accuracy,
                ai_vs_human: self.ai_vs_human.clone(),
            },
            health_literacy: HealthLiteracy {
                online_search_frequency: self.online_search_frequency.clone(),
                understanding_ability: self.understanding_ability,
                trust_sources: self.trust_sources.clone(),
            },
            answer_preferences: AnswerPreferences {
                preferred_style: self.preferred_style.clone(),
                speed_importance: self.speed_importance,
                accept_slower_for_accuracy: self.accept_slower_for_accuracy,
            },
            user_experience: UserExperience {
                usability_frustration: self.usability_frustration,
                ai_thinking: self.ai_thinking,
                response_time_natural: self.response_time_natural,
            },
            open_feedback: self.open_feedback.clone(),
            completed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::{sample_post_study, sample_pre_study};

    fn filled_pre_study() -> PreStudyForm {
        sample_pre_study()
    }

    fn filled_post_study() -> PostStudyForm {
        sample_post_study()
    }

    #[test]
    fn filled_forms_validate() {
        assert_eq!(filled_pre_study().validate(), Ok(()));
        assert_eq!(filled_post_study().validate(), Ok(()));
    }

    #[test]
    fn age_bounds_are_enforced() {
        let mut form = filled_pre_study();
        form.age = Some(17);
        assert!(matches!(
            form.validate(),
            Err(ValidationError::OutOfRange { field: "age", .. })
        ));
        form.age = None;
        assert_eq!(form.validate(), Err(ValidationError::Missing("age")));
    }

    #[test]
    fn checkbox_groups_need_one_real_entry() {
        let mut form = filled_pre_study();
        form.trust_sources = vec!["   ".into()];
        assert_eq!(
            form.validate(),
            Err(ValidationError::EmptyChoiceGroup("trusted sources"))
        );
    }

    #[test]
    fn scales_reject_zero_and_six() {
        let mut form = filled_post_study();
        form.credibility = Some(6);
        assert!(matches!(
            form.validate(),
            Err(ValidationError::OutOfRange {
                field: "credibility",
                ..
            })
        ));
        form.credibility = Some(0);
        assert!(form.validate().is_err());
    }

    #[test]
    fn free_text_is_capped() {
        let mut form = filled_post_study();
        form.open_feedback = Some("x".repeat(FREE_TEXT_MAX + 1));
        assert!(matches!(
            form.validate(),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn matriculation_is_six_to_eight_digits() {
        assert_eq!(validate_matriculation("123456"), Ok("123456"));
        assert_eq!(validate_matriculation(" 12345678 "), Ok("12345678"));
        for bad in ["12345", "123456789", "12a456", "", "12 3456"] {
            assert_eq!(
                validate_matriculation(bad),
                Err(ValidationError::InvalidMatriculation),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn completed_is_set_by_shaping() {
        assert!(filled_pre_study().to_section().completed);
        assert!(filled_post_study().to_section().completed);
    }
}
