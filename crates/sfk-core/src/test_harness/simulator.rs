//! Seeded end-to-end flow simulator
//!
//! Each participant gets a fresh set of in-memory services and is driven
//! through every page: registration, consent, both questionnaires, the
//! four scenarios with randomized widget latencies (and the occasional
//! injected timeout), and the finish page. After the run the produced
//! document is checked against the flow invariants.

use crate::config::FlowConfig;
use crate::controllers::{
    ConsentController, DeviceProfile, ExplanationController, FinishController, Outcome,
    PostStudyController, PreStudyController, RegistrationController, StudyController,
    TokenPageController,
};
use crate::progression::NextControl;
use crate::services::Services;
use crate::surface::RecordingSurface;
use crate::test_harness::{sample_post_study, sample_pre_study};
use crate::texts;
use crate::timing::{NodeKind, WidgetEvent};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sfk_gate::{quick_check, GateDecision, Page};
use sfk_record::{ScenarioStage, StudyToken};
use sfk_session::{CookieAttributes, CookieJar, SessionStore, STUDY_TOKEN_COOKIE};
use sfk_store::{
    Clock, DocumentStore, ManualClock, MemoryIdentity, MemoryStore, MemoryStudyApi,
    COLLECTION_USERS,
};
use std::sync::Arc;

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Participants to drive through the full flow
    pub participants: u64,
    /// Stop on the first violation instead of collecting them all
    pub stop_on_first_violation: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            participants: 100,
            stop_on_first_violation: true,
        }
    }
}

/// A flow invariant broken during simulation
#[derive(Debug, Clone)]
pub enum Violation {
    /// A handler navigated somewhere unexpected (or failed to)
    UnexpectedNavigation { step: &'static str, detail: String },
    /// The gate admitted or refused the wrong page
    GateMismatch { page: Page, detail: String },
    /// The produced document contradicts the flow invariants
    DocumentInconsistent { detail: String },
    /// A participant-facing error appeared during a clean run
    ErrorSurfaced { title: String, message: String },
}

/// Counters accumulated across participants
#[derive(Debug, Clone, Default)]
pub struct SimulatorStats {
    pub participants_run: u64,
    pub scenarios_measured: u64,
    pub timeouts_injected: u64,
    pub mid_study_resumes: u64,
    pub completions: u64,
}

/// Final report from the simulator
#[derive(Debug, Clone)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: SimulatorStats,
    pub violations: Vec<Violation>,
}

impl SimulatorReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable summary
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Study Flow Simulator Report ===\n\n");
        report.push_str(&format!("Seed: {}\n", self.config.seed));
        report.push_str(&format!("Participants: {}\n", self.stats.participants_run));
        report.push_str(&format!(
            "Scenarios Measured: {}\n",
            self.stats.scenarios_measured
        ));
        report.push_str(&format!(
            "Timeouts Injected: {}\n",
            self.stats.timeouts_injected
        ));
        report.push_str(&format!(
            "Mid-Study Resumes: {}\n",
            self.stats.mid_study_resumes
        ));
        report.push_str(&format!("Completions: {}\n", self.stats.completions));
        report.push_str(&format!("Violations: {}\n", self.violations.len()));

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, violation) in self.violations.iter().enumerate() {
                report.push_str(&format!("{}. {:?}\n", i + 1, violation));
            }
        }

        report.push_str(&format!(
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        ));
        report
    }
}

/// One participant's wired-up world
struct World {
    clock: Arc<ManualClock>,
    store: Arc<MemoryStore>,
    api: Arc<MemoryStudyApi>,
    cookies: Arc<CookieJar>,
    services: Arc<Services>,
    surface: Arc<RecordingSurface>,
    token: StudyToken,
}

impl World {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::fixed());
        let shared: Arc<dyn Clock> = clock.clone();
        let store = Arc::new(MemoryStore::new(shared));
        let identity = Arc::new(MemoryIdentity::new());
        let api = Arc::new(MemoryStudyApi::new());
        let cookies = Arc::new(CookieJar::new());
        let services = Arc::new(Services::new(
            store.clone(),
            identity.clone(),
            api.clone(),
            cookies.clone(),
            clock.clone(),
        ));

        let token = StudyToken::generate();
        cookies.set(
            STUDY_TOKEN_COOKIE,
            &token.to_string(),
            CookieAttributes::session(),
        );

        Self {
            clock,
            store,
            api,
            cookies,
            services,
            surface: Arc::new(RecordingSurface::new()),
            token,
        }
    }
}

/// Run the simulator
pub async fn run_simulator(config: SimulatorConfig) -> SimulatorReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = SimulatorStats::default();
    let mut violations = Vec::new();

    for _ in 0..config.participants {
        run_participant(&mut rng, &mut stats, &mut violations).await;
        stats.participants_run += 1;
        if config.stop_on_first_violation && !violations.is_empty() {
            break;
        }
    }

    SimulatorReport {
        config,
        stats,
        violations,
    }
}

/// Single traced participant, for eyeballing the flow
pub async fn run_walkthrough(seed: u64) -> SimulatorReport {
    run_simulator(SimulatorConfig {
        seed,
        participants: 1,
        stop_on_first_violation: true,
    })
    .await
}

async fn run_participant(
    rng: &mut StdRng,
    stats: &mut SimulatorStats,
    violations: &mut Vec<Violation>,
) {
    let world = World::new();
    let config = FlowConfig::default().with_auth_wait_ms(20);

    // Before anything happened, deep links must bounce.
    expect_gate(
        &world,
        Page::Study,
        GateDecision::Redirect(Page::StudyExplanation),
        violations,
    );

    // Introduction.
    let registration = RegistrationController::new(
        world.services.clone(),
        world.surface.clone(),
        DeviceProfile {
            user_agent: "sfk-simulator".into(),
            screen_resolution: "1920x1080".into(),
        },
    );
    expect_navigation(
        "registration",
        registration.continue_to_consent().await,
        Page::Consent,
        violations,
    );

    // Consent.
    expect_gate(&world, Page::Consent, GateDecision::Allow, violations);
    expect_gate(
        &world,
        Page::PreStudy,
        GateDecision::Redirect(Page::Consent),
        violations,
    );
    let consent = ConsentController::new(world.services.clone(), world.surface.clone());
    expect_navigation(
        "consent",
        consent.submit(true).await,
        Page::PreStudy,
        violations,
    );

    // Pre-study questionnaire.
    expect_gate(&world, Page::PreStudy, GateDecision::Allow, violations);
    let pre_study = PreStudyController::new(world.services.clone(), world.surface.clone());
    expect_navigation(
        "pre-study",
        pre_study.submit(&sample_pre_study()).await,
        Page::TokenPage,
        violations,
    );

    // Token page and explanation.
    expect_gate(&world, Page::TokenPage, GateDecision::Allow, violations);
    let token_page = TokenPageController::new(world.services.clone(), world.surface.clone());
    expect_navigation(
        "token page",
        token_page.acknowledge().await,
        Page::StudyExplanation,
        violations,
    );
    let explanation = ExplanationController::new(world.services.clone(), world.surface.clone());
    expect_navigation(
        "explanation",
        explanation.begin_study().await,
        Page::Study,
        violations,
    );

    // The four scenarios.
    expect_gate(&world, Page::Study, GateDecision::Allow, violations);
    let mut study = StudyController::resume(
        world.services.clone(),
        world.surface.clone(),
        config.clone(),
    )
    .await;
    let mut timed_out_stages = Vec::new();

    for ordinal in 1..=ScenarioStage::MAX.get() {
        let stage = ScenarioStage::new(ordinal).expect("ordinal is in range");
        let inject_timeout = rng.gen_bool(0.05);
        if inject_timeout {
            stats.timeouts_injected += 1;
            timed_out_stages.push(stage);
            study.submit_clicked();
            study.pump().await;
            world
                .clock
                .advance_ms(config.observer_timeout_ms as i64 + 1);
            study.widget_event(WidgetEvent::Tick);
            study.pump().await;
        } else {
            stats.scenarios_measured += 1;
            study.submit_clicked();
            study.pump().await;
            world.clock.advance_ms(rng.gen_range(100..2_000));
            study.widget_event(WidgetEvent::NodeInserted(NodeKind::LoadingIndicator));
            study.pump().await;
            world.clock.advance_ms(rng.gen_range(200..5_000));
            study.widget_event(WidgetEvent::NodeRemoved(NodeKind::LoadingIndicator));
            study.widget_event(WidgetEvent::ResponseText("Simulated answer.".into()));
            study.pump().await;
        }

        if stage.is_last() {
            expect_navigation(
                "study completion",
                study.next_scenario(&NextControl::terminal()).await,
                Page::PostStudy,
                violations,
            );
        } else {
            if study.next_scenario(&NextControl::advance()).await != Outcome::Stay {
                violations.push(Violation::UnexpectedNavigation {
                    step: "scenario advance",
                    detail: "advance navigated away from the study page".into(),
                });
            }
            // A reload mid-study must resume at the persisted stage.
            if rng.gen_bool(0.3) {
                stats.mid_study_resumes += 1;
                let resumed = StudyController::resume(
                    world.services.clone(),
                    world.surface.clone(),
                    config.clone(),
                )
                .await;
                if resumed.scenario_stage() != study.scenario_stage() {
                    violations.push(Violation::DocumentInconsistent {
                        detail: format!(
                            "resume landed on stage {} instead of {}",
                            resumed.scenario_stage(),
                            study.scenario_stage()
                        ),
                    });
                }
                study = resumed;
            }
        }
    }

    // Post-study questionnaire.
    expect_gate(&world, Page::PostStudy, GateDecision::Allow, violations);
    let post_study = PostStudyController::new(world.services.clone(), world.surface.clone());
    expect_navigation(
        "post-study",
        post_study.submit(&sample_post_study()).await,
        Page::Finish,
        violations,
    );

    // Finish page and compensation.
    expect_gate(&world, Page::Finish, GateDecision::Allow, violations);
    let finish = FinishController::new(world.services.clone(), world.surface.clone(), config);
    let view = finish.arrive().await;
    if view.button_label != texts::SAVE_LABEL {
        violations.push(Violation::UnexpectedNavigation {
            step: "finish arrival",
            detail: format!("fresh form offered {:?}", view.button_label),
        });
    }
    let digits: String = (0..rng.gen_range(6..=8))
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    if finish.submit_matriculation(&digits).await.is_none() {
        violations.push(Violation::UnexpectedNavigation {
            step: "matriculation",
            detail: format!("{digits:?} was rejected"),
        });
    }
    let view = finish.compensation_form().await;
    if view.prefilled.as_deref() != Some(digits.as_str())
        || view.button_label != texts::UPDATE_LABEL
    {
        violations.push(Violation::DocumentInconsistent {
            detail: "saved matriculation number did not round-trip".into(),
        });
    }

    // Completed participants are parked everywhere except finish.
    expect_gate(
        &world,
        Page::Consent,
        GateDecision::Redirect(Page::AlreadyCompleted),
        violations,
    );
    expect_gate(&world, Page::Finish, GateDecision::Allow, violations);

    stats.completions += 1;
    if world.api.submissions() != 1 {
        violations.push(Violation::DocumentInconsistent {
            detail: format!("expected 1 completion submission, saw {}", world.api.submissions()),
        });
    }

    verify_document(&world, &timed_out_stages, &digits, violations).await;

    for (title, message) in world.surface.shown() {
        violations.push(Violation::ErrorSurfaced { title, message });
    }
}

fn expect_navigation(
    step: &'static str,
    outcome: Outcome,
    expected: Page,
    violations: &mut Vec<Violation>,
) {
    if outcome != Outcome::Navigate(expected) {
        violations.push(Violation::UnexpectedNavigation {
            step,
            detail: format!("expected {expected}, got {outcome:?}"),
        });
    }
}

fn expect_gate(
    world: &World,
    page: Page,
    expected: GateDecision,
    violations: &mut Vec<Violation>,
) {
    let actual = quick_check(page, &*world.cookies);
    if actual != expected {
        violations.push(Violation::GateMismatch {
            page,
            detail: format!("expected {expected:?}, got {actual:?}"),
        });
    }
}

async fn verify_document(
    world: &World,
    timed_out_stages: &[ScenarioStage],
    digits: &str,
    violations: &mut Vec<Violation>,
) {
    let doc = match world
        .store
        .get(COLLECTION_USERS, &world.token.to_string())
        .await
    {
        Ok(Some(doc)) => doc,
        other => {
            violations.push(Violation::DocumentInconsistent {
                detail: format!("participant document unreadable: {other:?}"),
            });
            return;
        }
    };

    let mut check = |condition: bool, detail: &str| {
        if !condition {
            violations.push(Violation::DocumentInconsistent {
                detail: detail.to_string(),
            });
        }
    };

    check(
        doc["consentGiven"] == serde_json::json!(true),
        "consent not recorded",
    );
    check(
        doc["consentTimestamp"].as_i64().is_some(),
        "consent timestamp missing",
    );
    check(
        doc["studyStatus"] == serde_json::json!("completed"),
        "study status not completed",
    );
    check(
        doc["mainStudy"]["gradio_app_finished"] == serde_json::json!(true),
        "widget completion not recorded",
    );
    check(
        doc["mainStudy"]["last_scenario_stage"] == serde_json::json!(4),
        "final scenario stage not recorded",
    );
    check(
        doc["preStudyQuestionnaire"]["completed"] == serde_json::json!(true),
        "pre-study not completed",
    );
    check(
        doc["postStudyQuestionnaire"]["completed"] == serde_json::json!(true),
        "post-study not completed",
    );
    check(
        doc["studyCompensation"]["matriculationNumber"] == serde_json::json!(digits),
        "matriculation number not stored",
    );

    // Each stage has either both latencies or a timeout marker, never a mix.
    for ordinal in 1..=ScenarioStage::MAX.get() {
        let stage = ScenarioStage::new(ordinal).expect("ordinal is in range");
        let key = stage.timing_key();
        let timed_out = timed_out_stages.contains(&stage);
        let appear = &doc["mainStudy"]["submit_vs_loading_appear_time_difference"][&key];
        let response = &doc["mainStudy"]["loading_to_response_time_difference"][&key];
        let timeout = &doc["mainStudy"]["observer_timeouts"][&key];

        if timed_out {
            check(timeout.as_i64().is_some(), &format!("{key}: timeout marker missing"));
            check(
                appear.is_null() && response.is_null(),
                &format!("{key}: fabricated latency on a timed-out stage"),
            );
        } else {
            check(
                appear.as_u64().is_some_and(|ms| (100..2_000).contains(&ms)),
                &format!("{key}: appear latency missing or out of range"),
            );
            check(
                response.as_u64().is_some_and(|ms| (200..5_000).contains(&ms)),
                &format!("{key}: response latency missing or out of range"),
            );
            check(timeout.is_null(), &format!("{key}: spurious timeout marker"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_run_passes_cleanly() {
        let report = run_simulator(SimulatorConfig {
            seed: 7,
            participants: 25,
            stop_on_first_violation: true,
        })
        .await;
        assert!(report.passed(), "{}", report.generate_text());
        assert_eq!(report.stats.participants_run, 25);
        assert_eq!(report.stats.completions, 25);
    }

    #[tokio::test]
    async fn walkthrough_is_a_single_participant() {
        let report = run_walkthrough(42).await;
        assert!(report.passed(), "{}", report.generate_text());
        assert_eq!(report.stats.participants_run, 1);
    }
}
