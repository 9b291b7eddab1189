//! Participant-facing error reporting
//!
//! A [`FlowError`] is mapped to a category, the category to a title/body
//! pair, and the pair handed to whatever [`ErrorSurface`] the page wired
//! in. Controllers never render anything themselves.

use crate::error::FlowError;
use crate::texts;
use parking_lot::Mutex;
use sfk_store::ApiError;

/// Coarse failure classes, one message pair each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Token,
    SignIn,
    Store,
    Api,
    Validation,
}

impl ErrorCategory {
    #[must_use]
    pub fn of(err: &FlowError) -> Self {
        match err {
            FlowError::Token(_) => ErrorCategory::Token,
            FlowError::MissingIdentity | FlowError::Identity(_) => ErrorCategory::SignIn,
            FlowError::Store(_) => ErrorCategory::Store,
            FlowError::Api(_) => ErrorCategory::Api,
            FlowError::Validation(_) => ErrorCategory::Validation,
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::Token => texts::TOKEN_ERROR_TITLE,
            ErrorCategory::SignIn => texts::SIGN_IN_ERROR_TITLE,
            ErrorCategory::Store => texts::SAVE_ERROR_TITLE,
            ErrorCategory::Api => texts::SUBMIT_ERROR_TITLE,
            ErrorCategory::Validation => texts::VALIDATION_ERROR_TITLE,
        }
    }

    #[must_use]
    pub fn body(&self) -> &'static str {
        match self {
            ErrorCategory::Token => texts::TOKEN_ERROR_BODY,
            ErrorCategory::SignIn => texts::SIGN_IN_ERROR_BODY,
            ErrorCategory::Store => texts::SAVE_ERROR_BODY,
            ErrorCategory::Api => texts::SUBMIT_ERROR_BODY,
            ErrorCategory::Validation => texts::GENERIC_ERROR_BODY,
        }
    }
}

/// Where participant-facing messages go (a modal in the deployed flow)
pub trait ErrorSurface: Send + Sync + std::fmt::Debug {
    fn show(&self, title: &str, message: &str);
}

/// Classify, log and report one error
pub fn surface_error(surface: &dyn ErrorSurface, err: &FlowError) {
    let category = ErrorCategory::of(err);
    tracing::warn!(%err, ?category, "surfacing flow error");
    match err {
        // Validation messages are specific enough to show verbatim.
        FlowError::Validation(validation) => {
            surface.show(category.title(), &validation.to_string());
        }
        // A refused endpoint explains itself in the response body.
        FlowError::Api(ApiError::Status { body, .. }) if !body.is_empty() => {
            surface.show(category.title(), body);
        }
        _ => surface.show(category.title(), category.body()),
    }
}

/// Surface that records instead of rendering
#[derive(Debug, Default)]
pub struct RecordingSurface {
    shown: Mutex<Vec<(String, String)>>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything shown so far, oldest first
    #[must_use]
    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().clone()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.shown.lock().len()
    }

    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.shown.lock().is_empty()
    }
}

impl ErrorSurface for RecordingSurface {
    fn show(&self, title: &str, message: &str) {
        self.shown
            .lock()
            .push((title.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfk_record::TokenError;

    #[test]
    fn token_errors_use_the_token_message() {
        let surface = RecordingSurface::new();
        surface_error(&surface, &FlowError::Token(TokenError::Missing));
        let shown = surface.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, texts::TOKEN_ERROR_TITLE);
    }

    #[test]
    fn validation_messages_pass_through_verbatim() {
        let surface = RecordingSurface::new();
        let err = FlowError::Validation(crate::forms::ValidationError::InvalidMatriculation);
        surface_error(&surface, &err);
        assert!(surface.shown()[0].1.contains("6 to 8 digits"));
    }
}
