//! Consent page

use crate::controllers::Outcome;
use crate::error::FlowError;
use crate::forms::ValidationError;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use crate::texts;
use sfk_gate::Page;
use sfk_record::{fields, UpdateValue};
use sfk_session::{CookieAttributes, StageFlag};
use std::sync::Arc;

/// Controller for the consent page
///
/// Consent is idempotent: once `consentGiven` is true, another submit
/// moves the participant forward without touching `consentTimestamp`.
#[derive(Debug)]
pub struct ConsentController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
}

impl ConsentController {
    #[must_use]
    pub fn new(services: Arc<Services>, surface: Arc<dyn ErrorSurface>) -> Self {
        Self { services, surface }
    }

    pub async fn submit(&self, accepted: bool) -> Outcome {
        if !accepted {
            surface_error(
                &*self.surface,
                &FlowError::Validation(ValidationError::ConsentRequired),
            );
            return Outcome::Stay;
        }
        match self.record_consent().await {
            Ok(page) => Outcome::Navigate(page),
            Err(err) => {
                surface_error(&*self.surface, &err);
                Outcome::Stay
            }
        }
    }

    async fn record_consent(&self) -> Result<Page, FlowError> {
        let (_, token) = self.services.identified()?;

        let already = self
            .services
            .fetch_record(token)
            .await?
            .map(|record| record.consent_given)
            .unwrap_or(false);

        if already {
            tracing::info!(%token, "consent already recorded, skipping write");
            self.surface
                .show(texts::ALREADY_CONSENTED_TITLE, texts::ALREADY_CONSENTED_BODY);
        } else {
            self.services
                .update_record(
                    token,
                    &[
                        (fields::consent_given(), UpdateValue::set(true)),
                        (fields::consent_timestamp(), UpdateValue::ServerTimestamp),
                        (fields::last_stage(), UpdateValue::set("consent")),
                        (fields::last_active_at(), UpdateValue::ServerTimestamp),
                    ],
                )
                .await?;
        }

        self.services
            .session
            .set_flag(StageFlag::ConsentGiven, CookieAttributes::session());
        Ok(Page::PreStudy)
    }
}
