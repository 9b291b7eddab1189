//! Post-study questionnaire page

use crate::controllers::Outcome;
use crate::error::FlowError;
use crate::forms::PostStudyForm;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use sfk_gate::Page;
use sfk_record::{fields, UpdateValue};
use sfk_session::{CookieAttributes, StageFlag};
use sfk_store::StoreError;
use std::sync::Arc;

/// Controller for the post-study questionnaire
#[derive(Debug)]
pub struct PostStudyController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
}

impl PostStudyController {
    #[must_use]
    pub fn new(services: Arc<Services>, surface: Arc<dyn ErrorSurface>) -> Self {
        Self { services, surface }
    }

    pub async fn submit(&self, form: &PostStudyForm) -> Outcome {
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

    async fn save(&self, form: &PostStudyForm) -> Result<Page, FlowError> {
        let (_, token) = self.services.identified()?;

        let completed = self
            .services
            .fetch_record(token)
            .await?
            .map(|record| record.post_study_questionnaire.completed)
            .unwrap_or(false);

        if completed {
            tracing::info!(%token, "post-study already completed, skipping write");
        } else {
            let section = serde_json::to_value(form.to_section())
                .map_err(|err| StoreError::Serialization(err.to_string()))?;
            self.services
                .update_record(
                    token,
                    &[
                        (fields::post_study(), UpdateValue::Set(section)),
                        (
                            fields::post_study().child("timestamp"),
                            UpdateValue::ServerTimestamp,
                        ),
                        (fields::last_stage(), UpdateValue::set("post-study")),
                        (fields::last_active_at(), UpdateValue::ServerTimestamp),
                    ],
                )
                .await?;
        }

        self.services
            .session
            .set_flag(StageFlag::PostStudyCompleted, CookieAttributes::session());
        Ok(Page::Finish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use crate::test_harness::sample_post_study;
    use sfk_session::SessionStore;
    use sfk_test_utils::TestServices;

    async fn signed_in() -> (TestServices, PostStudyController, Arc<RecordingSurface>) {
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
        let surface = Arc::new(RecordingSurface::new());
        let controller = PostStudyController::new(services, surface.clone());
        (ts, controller, surface)
    }

    #[tokio::test]
    async fn valid_answers_complete_the_section() {
        let (ts, controller, surface) = signed_in().await;
        let token: sfk_record::StudyToken =
            ts.cookies.study_token().unwrap().parse().unwrap();

        let outcome = controller.submit(&sample_post_study()).await;
        assert_eq!(outcome, Outcome::Navigate(Page::Finish));
        assert!(surface.is_quiet());
        assert!(ts.cookies.flag(StageFlag::PostStudyCompleted));

        let section = &ts.document(token).await["postStudyQuestionnaire"];
        assert_eq!(section["completed"], serde_json::json!(true));
        assert_eq!(
            section["trustChange"]["direction"],
            serde_json::json!("increased")
        );
        assert!(section["timestamp"].as_i64().is_some());
    }

    #[tokio::test]
    async fn missing_scale_answer_is_rejected_locally() {
        let (ts, controller, surface) = signed_in().await;
        let token: sfk_record::StudyToken =
            ts.cookies.study_token().unwrap().parse().unwrap();

        let mut form = sample_post_study();
        form.consistency = None;
        assert_eq!(controller.submit(&form).await, Outcome::Stay);
        assert_eq!(surface.count(), 1);
        assert_eq!(
            ts.document(token).await["postStudyQuestionnaire"]["completed"],
            serde_json::json!(false)
        );
    }
}
