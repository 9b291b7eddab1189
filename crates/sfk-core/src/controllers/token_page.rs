//! Token page: shows the participation code for safekeeping

use crate::controllers::Outcome;
use crate::error::FlowError;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use sfk_gate::Page;
use sfk_record::{fields, UpdateValue};
use sfk_session::{CookieAttributes, StageFlag};
use std::sync::Arc;

/// Controller for the token page
#[derive(Debug)]
pub struct TokenPageController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
}

impl TokenPageController {
    #[must_use]
    pub fn new(services: Arc<Services>, surface: Arc<dyn ErrorSurface>) -> Self {
        Self { services, surface }
    }

    /// The code shown to the participant, straight from the cookie
    #[must_use]
    pub fn token_display(&self) -> Option<String> {
        self.services.session.study_token()
    }

    pub async fn acknowledge(&self) -> Outcome {
        match self.mark_seen().await {
            Ok(page) => Outcome::Navigate(page),
            Err(err) => {
                surface_error(&*self.surface, &err);
                Outcome::Stay
            }
        }
    }

    async fn mark_seen(&self) -> Result<Page, FlowError> {
        let (_, token) = self.services.identified()?;
        self.services
            .update_record(
                token,
                &[
                    (fields::last_stage(), UpdateValue::set("token")),
                    (fields::last_active_at(), UpdateValue::ServerTimestamp),
                ],
            )
            .await?;
        self.services
            .session
            .set_flag(StageFlag::TokenPageCompleted, CookieAttributes::session());
        Ok(Page::StudyExplanation)
    }
}
