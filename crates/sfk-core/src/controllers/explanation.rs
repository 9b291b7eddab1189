//! Study-explanation page

use crate::controllers::Outcome;
use crate::error::FlowError;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use sfk_gate::Page;
use sfk_record::{fields, UpdateValue};
use sfk_session::{CookieAttributes, StageFlag};
use std::sync::Arc;

/// Controller for the study-explanation page
#[derive(Debug)]
pub struct ExplanationController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
}

impl ExplanationController {
    #[must_use]
    pub fn new(services: Arc<Services>, surface: Arc<dyn ErrorSurface>) -> Self {
        Self { services, surface }
    }

    /// The code is shown once more next to the instructions
    #[must_use]
    pub fn token_display(&self) -> Option<String> {
        self.services.session.study_token()
    }

    pub async fn begin_study(&self) -> Outcome {
        match self.mark_ready().await {
            Ok(page) => Outcome::Navigate(page),
            Err(err) => {
                surface_error(&*self.surface, &err);
                Outcome::Stay
            }
        }
    }

    async fn mark_ready(&self) -> Result<Page, FlowError> {
        let (_, token) = self.services.identified()?;
        self.services
            .update_record(
                token,
                &[
                    (fields::last_stage(), UpdateValue::set("study-explanation")),
                    (fields::last_active_at(), UpdateValue::ServerTimestamp),
                ],
            )
            .await?;
        self.services.session.set_flag(
            StageFlag::StudyExplanationCompleted,
            CookieAttributes::session(),
        );
        Ok(Page::Study)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use sfk_session::SessionStore;
    use sfk_test_utils::TestServices;

    #[tokio::test]
    async fn beginning_the_study_sets_flag_and_stage() {
        let ts = TestServices::new();
        let token = ts.issue_token();
        ts.seed_record(token).await;
        ts.sign_in_with_token(token).await;
        let services = Arc::new(Services::new(
            ts.store.clone(),
            ts.identity.clone(),
            ts.api.clone(),
            ts.cookies.clone(),
            ts.clock.clone(),
        ));
        let controller =
            ExplanationController::new(services, Arc::new(RecordingSurface::new()));

        assert_eq!(controller.begin_study().await, Outcome::Navigate(Page::Study));
        assert!(ts.cookies.flag(StageFlag::StudyExplanationCompleted));
        assert_eq!(
            ts.document(token).await["lastStage"],
            serde_json::json!("study-explanation")
        );
    }

    #[tokio::test]
    async fn signed_out_session_is_surfaced() {
        let ts = TestServices::new();
        ts.issue_token();
        let services = Arc::new(Services::new(
            ts.store.clone(),
            ts.identity.clone(),
            ts.api.clone(),
            ts.cookies.clone(),
            ts.clock.clone(),
        ));
        let surface = Arc::new(RecordingSurface::new());
        let controller = ExplanationController::new(services, surface.clone());

        assert_eq!(controller.begin_study().await, Outcome::Stay);
        assert_eq!(surface.count(), 1);
    }
}
