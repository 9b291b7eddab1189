//! Participant-facing strings
//!
//! Kept in one module so wording changes never touch controller logic.

pub const GENERIC_ERROR_TITLE: &str = "Something went wrong";
pub const GENERIC_ERROR_BODY: &str =
    "An unexpected error occurred. Please try again in a moment.";

pub const TOKEN_ERROR_TITLE: &str = "Participation code missing";
pub const TOKEN_ERROR_BODY: &str =
    "Your participation code could not be read. Please restart the study from the invitation link.";

pub const SIGN_IN_ERROR_TITLE: &str = "Connection problem";
pub const SIGN_IN_ERROR_BODY: &str =
    "We could not establish a session. Please check your connection and try again.";

pub const SAVE_ERROR_TITLE: &str = "Saving failed";
pub const SAVE_ERROR_BODY: &str =
    "Your answers could not be saved. Please try again.";

pub const SUBMIT_ERROR_TITLE: &str = "Submission failed";
pub const SUBMIT_ERROR_BODY: &str =
    "The study server did not accept the request. Please try again.";

pub const VALIDATION_ERROR_TITLE: &str = "Please check your input";

pub const ALREADY_CONSENTED_TITLE: &str = "Consent already recorded";
pub const ALREADY_CONSENTED_BODY: &str =
    "You have already given consent. Continuing with the study.";

pub const SAVE_LABEL: &str = "Save";
pub const UPDATE_LABEL: &str = "Update matriculation number";

pub const SAVED_CONFIRMATION: &str = "Your matriculation number has been saved.";
pub const UPDATED_CONFIRMATION: &str = "Your matriculation number has been updated.";

/// Label text that marks the scenario control as terminal on widget builds
/// that predate the completion marker
pub const COMPLETE_STUDY_LABEL: &str = "Complete study";
