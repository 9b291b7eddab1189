//! Study page: the embedded scenario widget
//!
//! The controller owns the progression counter and the timing
//! instrument. Widget observations are enqueued as they arrive and
//! applied by [`StudyController::pump`]; timing writes are best-effort
//! and never interrupt the participant.

use crate::config::FlowConfig;
use crate::controllers::Outcome;
use crate::error::FlowError;
use crate::progression::{CompletionSignal, NextControl, ScenarioProgression};
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use crate::timing::{TimingEffect, TimingInstrument, WidgetEvent};
use sfk_gate::Page;
use sfk_record::{fields, ScenarioStage, UpdateValue};
use sfk_session::{CookieAttributes, StageFlag};
use std::sync::Arc;

/// Controller for the study page
#[derive(Debug)]
pub struct StudyController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
    config: FlowConfig,
    progression: ScenarioProgression,
    timing: TimingInstrument,
}

impl StudyController {
    /// Build the controller, resuming the scenario stage persisted on a
    /// previous visit. Any failure reading the record falls back to the
    /// first scenario rather than blocking the page.
    pub async fn resume(
        services: Arc<Services>,
        surface: Arc<dyn ErrorSurface>,
        config: FlowConfig,
    ) -> Self {
        let last = match services.identified() {
            Ok((_, token)) => match services.fetch_record(token).await {
                Ok(record) => record.and_then(|r| r.main_study.last_scenario_stage),
                Err(err) => {
                    tracing::warn!(%err, "could not read progression, starting at stage 1");
                    None
                }
            },
            Err(err) => {
                tracing::warn!(%err, "no identified session, starting at stage 1");
                None
            }
        };
        let progression = ScenarioProgression::resume(last);
        let timing = TimingInstrument::new(progression.stage(), config.observer_timeout_ms);
        Self {
            services,
            surface,
            config,
            progression,
            timing,
        }
    }

    #[inline]
    #[must_use]
    pub fn scenario_stage(&self) -> ScenarioStage {
        self.progression.stage()
    }

    #[inline]
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.progression.progress_percent(&self.config)
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progression.is_finished()
    }

    /// The participant submitted a question to the widget
    pub fn submit_clicked(&mut self) {
        self.timing.push(WidgetEvent::SubmitClicked);
    }

    /// Raw widget observation (node churn, response text, ticks)
    pub fn widget_event(&mut self, event: WidgetEvent) {
        self.timing.push(event);
    }

    /// Apply queued observations and persist whatever they produced
    ///
    /// Timing writes are fire-and-forget: a failure is logged and the
    /// measurement for that stage is simply missing from the record.
    pub async fn pump(&mut self) {
        let now_ms = self.services.clock.now_ms();
        for effect in self.timing.drain(now_ms) {
            self.persist_effect(&effect).await;
        }
    }

    async fn persist_effect(&self, effect: &TimingEffect) {
        let token = match self.services.identified() {
            Ok((_, token)) => token,
            Err(err) => {
                tracing::warn!(%err, "timing measurement dropped, no identified session");
                return;
            }
        };
        let update = match *effect {
            TimingEffect::RecordAppearLatency { stage, elapsed_ms } => {
                (fields::appear_latency(stage), UpdateValue::set(elapsed_ms))
            }
            TimingEffect::RecordResponseLatency { stage, elapsed_ms } => (
                fields::response_latency(stage),
                UpdateValue::set(elapsed_ms),
            ),
            TimingEffect::RecordTimeout { stage, at_ms } => {
                (fields::observer_timeout(stage), UpdateValue::set(at_ms))
            }
        };
        if let Err(err) = self.services.update_record(token, &[update]).await {
            tracing::warn!(%err, ?effect, "timing write failed");
        }
    }

    /// One click on the widget's next-scenario control
    pub async fn next_scenario(&mut self, control: &NextControl) -> Outcome {
        let Some(signal) = self.progression.observe_next(control) else {
            return Outcome::Stay;
        };
        let outcome = match signal {
            CompletionSignal::Advance(stage) => {
                self.timing.begin_stage(stage);
                if let Err(err) = self.persist_advance(stage).await {
                    // The in-memory stage moved on; only the record lags.
                    surface_error(&*self.surface, &err);
                }
                Outcome::Stay
            }
            CompletionSignal::Complete => match self.complete().await {
                Ok(page) => Outcome::Navigate(page),
                Err(err) => {
                    surface_error(&*self.surface, &err);
                    self.progression.reopen();
                    Outcome::Stay
                }
            },
        };
        self.progression.settle();
        outcome
    }

    async fn persist_advance(&self, stage: ScenarioStage) -> Result<(), FlowError> {
        let (_, token) = self.services.identified()?;
        self.services
            .update_record(
                token,
                &[
                    (
                        fields::last_scenario_stage(),
                        UpdateValue::set(stage.get()),
                    ),
                    (fields::last_stage(), UpdateValue::set("study")),
                    (fields::last_active_at(), UpdateValue::ServerTimestamp),
                ],
            )
            .await
    }

    async fn complete(&self) -> Result<Page, FlowError> {
        let (_, token) = self.services.identified()?;
        self.services
            .update_record(
                token,
                &[
                    (fields::gradio_app_finished(), UpdateValue::set(true)),
                    (
                        fields::last_scenario_stage(),
                        UpdateValue::set(ScenarioStage::MAX.get()),
                    ),
                    (fields::study_status(), UpdateValue::set("completed")),
                    (fields::last_stage(), UpdateValue::set("study")),
                    (fields::last_active_at(), UpdateValue::ServerTimestamp),
                ],
            )
            .await?;

        // Completion must never strand the participant here; a refused
        // submission is logged and the flow moves on.
        if let Err(err) = self.services.api.submit_study().await {
            tracing::warn!(%err, "completion submission refused");
        }

        self.services
            .session
            .set_flag(StageFlag::MainStudyCompleted, CookieAttributes::session());
        Ok(Page::PostStudy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use crate::timing::NodeKind;
    use sfk_session::SessionStore;
    use sfk_store::{Clock as _, DocumentStore};
    use sfk_test_utils::TestServices;

    async fn study_page() -> (TestServices, StudyController, Arc<RecordingSurface>) {
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
        let controller =
            StudyController::resume(services, surface.clone(), FlowConfig::default()).await;
        (ts, controller, surface)
    }

    async fn answer_scenario(ts: &TestServices, controller: &mut StudyController) {
        controller.submit_clicked();
        controller.pump().await;
        ts.clock.advance_ms(500);
        controller.widget_event(WidgetEvent::NodeInserted(NodeKind::LoadingIndicator));
        controller.pump().await;
        ts.clock.advance_ms(1_300);
        controller.widget_event(WidgetEvent::NodeRemoved(NodeKind::LoadingIndicator));
        controller.widget_event(WidgetEvent::ResponseText("Stay hydrated.".into()));
        controller.pump().await;
    }

    #[tokio::test]
    async fn latencies_land_under_the_stage_key() {
        let (ts, mut controller, surface) = study_page().await;
        let token: sfk_record::StudyToken =
            ts.cookies.study_token().unwrap().parse().unwrap();

        answer_scenario(&ts, &mut controller).await;

        let main = &ts.document(token).await["mainStudy"];
        assert_eq!(
            main["submit_vs_loading_appear_time_difference"]["stage_1"],
            serde_json::json!(500)
        );
        assert_eq!(
            main["loading_to_response_time_difference"]["stage_1"],
            serde_json::json!(1_300)
        );
        assert!(main["observer_timeouts"]
            .as_object()
            .unwrap()
            .is_empty());
        assert!(surface.is_quiet());
    }

    #[tokio::test]
    async fn timed_out_stage_gets_a_marker_and_no_latency() {
        let (ts, mut controller, _surface) = study_page().await;
        let token: sfk_record::StudyToken =
            ts.cookies.study_token().unwrap().parse().unwrap();

        controller.submit_clicked();
        controller.pump().await;
        ts.clock.advance_ms(30_000);
        controller.widget_event(WidgetEvent::Tick);
        controller.pump().await;

        let main = &ts.document(token).await["mainStudy"];
        assert_eq!(
            main["observer_timeouts"]["stage_1"],
            serde_json::json!(ts.clock.now_ms())
        );
        assert!(main["loading_to_response_time_difference"]
            .as_object()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn advancing_persists_the_stage_and_resets_timing() {
        let (ts, mut controller, _surface) = study_page().await;
        let token: sfk_record::StudyToken =
            ts.cookies.study_token().unwrap().parse().unwrap();

        answer_scenario(&ts, &mut controller).await;
        assert_eq!(
            controller.next_scenario(&NextControl::advance()).await,
            Outcome::Stay
        );
        assert_eq!(controller.scenario_stage().get(), 2);
        assert_eq!(controller.progress_percent(), 50);
        assert_eq!(
            ts.document(token).await["mainStudy"]["last_scenario_stage"],
            serde_json::json!(2)
        );

        // The second stage measures under its own key.
        answer_scenario(&ts, &mut controller).await;
        let main = &ts.document(token).await["mainStudy"];
        assert_eq!(
            main["submit_vs_loading_appear_time_difference"]["stage_2"],
            serde_json::json!(500)
        );
    }

    #[tokio::test]
    async fn terminal_control_completes_exactly_once() {
        let (ts, mut controller, _surface) = study_page().await;
        let token: sfk_record::StudyToken =
            ts.cookies.study_token().unwrap().parse().unwrap();

        for _ in 0..3 {
            answer_scenario(&ts, &mut controller).await;
            controller.next_scenario(&NextControl::advance()).await;
        }
        answer_scenario(&ts, &mut controller).await;
        assert_eq!(controller.scenario_stage().get(), 4);

        let outcome = controller.next_scenario(&NextControl::terminal()).await;
        assert_eq!(outcome, Outcome::Navigate(Page::PostStudy));
        assert!(controller.is_finished());
        assert!(ts.cookies.flag(StageFlag::MainStudyCompleted));
        assert_eq!(ts.api.submissions(), 1);

        let doc = ts.document(token).await;
        assert_eq!(doc["mainStudy"]["gradio_app_finished"], serde_json::json!(true));
        assert_eq!(doc["studyStatus"], serde_json::json!("completed"));

        // A replayed click is inert.
        assert_eq!(
            controller.next_scenario(&NextControl::terminal()).await,
            Outcome::Stay
        );
        assert_eq!(ts.api.submissions(), 1);
    }

    #[tokio::test]
    async fn refused_submission_still_navigates() {
        let (ts, mut controller, surface) = study_page().await;
        ts.api.fail_submit(500, "lock release failed");

        for _ in 0..3 {
            controller.next_scenario(&NextControl::advance()).await;
        }
        let outcome = controller.next_scenario(&NextControl::terminal()).await;
        assert_eq!(outcome, Outcome::Navigate(Page::PostStudy));
        assert!(surface.is_quiet());
    }

    #[tokio::test]
    async fn failed_completion_write_can_be_retried() {
        let (ts, mut controller, surface) = study_page().await;
        ts.store.fail_with("permission denied");

        let outcome = controller.next_scenario(&NextControl::terminal()).await;
        assert_eq!(outcome, Outcome::Stay);
        assert_eq!(surface.count(), 1);
        assert!(!controller.is_finished());

        ts.store.heal();
        let outcome = controller.next_scenario(&NextControl::terminal()).await;
        assert_eq!(outcome, Outcome::Navigate(Page::PostStudy));
    }

    #[tokio::test]
    async fn resume_picks_up_the_persisted_stage() {
        let ts = TestServices::new();
        let token = ts.issue_token();
        ts.seed_record(token).await;
        ts.sign_in_with_token(token).await;
        ts.store
            .update(
                sfk_store::COLLECTION_USERS,
                &token.to_string(),
                &[(fields::last_scenario_stage(), UpdateValue::set(3))],
            )
            .await
            .unwrap();

        let services = Arc::new(Services::new(
            ts.store.clone(),
            ts.identity.clone(),
            ts.api.clone(),
            ts.cookies.clone(),
            ts.clock.clone(),
        ));
        let controller = StudyController::resume(
            services,
            Arc::new(RecordingSurface::new()),
            FlowConfig::default(),
        )
        .await;
        assert_eq!(controller.scenario_stage().get(), 3);
        assert_eq!(controller.progress_percent(), 60);
    }
}
