//! Pre-study questionnaire page

use crate::controllers::Outcome;
use crate::error::FlowError;
use crate::forms::PreStudyForm;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use sfk_gate::Page;
use sfk_record::{fields, UpdateValue};
use sfk_session::{CookieAttributes, StageFlag};
use sfk_store::StoreError;
use std::sync::Arc;

/// Controller for the pre-study questionnaire
#[derive(Debug)]
pub struct PreStudyController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
}

impl PreStudyController {
    #[must_use]
    pub fn new(services: Arc<Services>, surface: Arc<dyn ErrorSurface>) -> Self {
        Self { services, surface }
    }

    pub async fn submit(&self, form: &PreStudyForm) -> Outcome {
        // Validation happens before any remote call.
        if let Err(err) = form.validate() {
            surface_error(&*self.surface, &FlowError::Validation(err));
            return Outcome::Stay;
        }
        match self.save(form).await {
            Ok(page) => Outcome::Navigate(page),
            Err(err) => {
                surface_error(&*self.surface, &err);
                Outcome::Stay
            }
        }
    }

    async fn save(&self, form: &PreStudyForm) -> Result<Page, FlowError> {
        let (_, token) = self.services.identified()?;

        let completed = self
            .services
            .fetch_record(token)
            .await?
            .map(|record| record.pre_study_questionnaire.completed)
            .unwrap_or(false);

        if completed {
            // Answers are write-once; a replayed submit moves on silently.
            tracing::info!(%token, "pre-study already completed, skipping write");
        } else {
            let section = serde_json::to_value(form.to_section())
                .map_err(|err| StoreError::Serialization(err.to_string()))?;
            self.services
                .update_record(
                    token,
                    &[
                        (fields::pre_study(), UpdateValue::Set(section)),
                        (
                            fields::pre_study().child("timestamp"),
                            UpdateValue::ServerTimestamp,
                        ),
                        (fields::last_stage(), UpdateValue::set("pre-study")),
                        (fields::last_active_at(), UpdateValue::ServerTimestamp),
                    ],
                )
                .await?;
        }

        self.services
            .session
            .set_flag(StageFlag::PreStudyCompleted, CookieAttributes::session());
        Ok(Page::TokenPage)
    }
}
