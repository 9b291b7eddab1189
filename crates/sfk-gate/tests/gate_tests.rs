//! Gate behaviour across whole cookie states

use proptest::prelude::*;
use sfk_gate::{authoritative_check, quick_check, required_flag, GateDecision, Page};
use sfk_record::{FieldPath, StudyToken, UpdateValue};
use sfk_session::{CookieAttributes, CookieJar, SessionStore, StageFlag, STUDY_TOKEN_COOKIE};
use sfk_store::DocumentStore;
use sfk_test_utils::TestServices;
use std::str::FromStr;
use std::time::Duration;

fn jar_with_token() -> CookieJar {
    let jar = CookieJar::new();
    jar.set(
        STUDY_TOKEN_COOKIE,
        &StudyToken::generate().to_string(),
        CookieAttributes::session(),
    );
    jar
}

/// Flags in stage order, without the final completed marker
fn progress_flags() -> [StageFlag; 6] {
    [
        StageFlag::ConsentGiven,
        StageFlag::PreStudyCompleted,
        StageFlag::TokenPageCompleted,
        StageFlag::StudyExplanationCompleted,
        StageFlag::MainStudyCompleted,
        StageFlag::PostStudyCompleted,
    ]
}

#[test]
fn each_prefix_of_progress_admits_exactly_one_more_page() {
    let flow = Page::flow_order();
    for done in 0..=progress_flags().len() {
        let jar = jar_with_token();
        for flag in progress_flags().iter().take(done) {
            jar.set_flag(*flag, CookieAttributes::session());
        }

        // Pages up to and including the next unfinished one are served.
        for (index, page) in flow.iter().enumerate() {
            let decision = quick_check(*page, &jar);
            if index <= done + 1 {
                assert_eq!(decision, GateDecision::Allow, "{page} with {done} flags");
            } else {
                let (_, entry) = required_flag(*page).expect("later pages have prerequisites");
                assert_eq!(
                    decision,
                    GateDecision::Redirect(entry),
                    "{page} with {done} flags"
                );
            }
        }
    }
}

#[test]
fn error_pages_are_served_without_a_token() {
    let jar = CookieJar::new();
    assert_eq!(quick_check(Page::TokenExpired, &jar), GateDecision::Allow);
    assert_eq!(
        quick_check(Page::AlreadyCompleted, &jar),
        GateDecision::Allow
    );
}

proptest! {
    /// Whatever the flag combination, three rules always hold: completed
    /// participants only reach the exempt pages, admission of a gated page
    /// implies its prerequisite flag, and redirects always target an
    /// earlier page of the flow.
    #[test]
    fn gate_rules_hold_for_arbitrary_flag_states(bits in proptest::array::uniform7(any::<bool>())) {
        let jar = jar_with_token();
        for (flag, set) in StageFlag::all().into_iter().zip(bits) {
            if set {
                jar.set_flag(flag, CookieAttributes::session());
            }
        }
        let completed = jar.flag(StageFlag::StudyCompleted);

        for page in Page::flow_order() {
            let decision = quick_check(page, &jar);

            if completed && !page.exempt_from_completed_redirect() {
                prop_assert_eq!(decision, GateDecision::Redirect(Page::AlreadyCompleted));
                continue;
            }
            match decision {
                GateDecision::Allow => {
                    if let Some((flag, _)) = required_flag(page) {
                        prop_assert!(jar.flag(flag), "{} admitted without {}", page, flag);
                    }
                }
                GateDecision::Redirect(target) => {
                    let order = Page::flow_order();
                    let from = order.iter().position(|p| *p == page);
                    let to = order.iter().position(|p| *p == target);
                    if let (Some(from), Some(to)) = (from, to) {
                        prop_assert!(to < from, "{} redirected forward to {}", page, target);
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn remote_consent_skips_the_consent_page() {
    let ts = TestServices::new();
    let token = ts.issue_token();
    ts.seed_record(token).await;
    ts.sign_in_with_token(token).await;
    ts.store
        .update(
            sfk_store::COLLECTION_USERS,
            &token.to_string(),
            &[(
                FieldPath::from_str("consentGiven").unwrap(),
                UpdateValue::set(true),
            )],
        )
        .await
        .unwrap();

    let skip = authoritative_check(
        Page::Consent,
        &*ts.identity,
        &*ts.store,
        Duration::from_millis(50),
    )
    .await;
    assert_eq!(skip, Some(Page::PreStudy));

    // The questionnaire itself is not completed, no skip there.
    let skip = authoritative_check(
        Page::PreStudy,
        &*ts.identity,
        &*ts.store,
        Duration::from_millis(50),
    )
    .await;
    assert_eq!(skip, None);
}

#[tokio::test]
async fn remote_questionnaire_completion_skips_ahead() {
    let ts = TestServices::new();
    let token = ts.issue_token();
    ts.seed_record(token).await;
    ts.sign_in_with_token(token).await;
    ts.store
        .update(
            sfk_store::COLLECTION_USERS,
            &token.to_string(),
            &[(
                FieldPath::from_str("postStudyQuestionnaire.completed").unwrap(),
                UpdateValue::set(true),
            )],
        )
        .await
        .unwrap();

    let skip = authoritative_check(
        Page::PostStudy,
        &*ts.identity,
        &*ts.store,
        Duration::from_millis(50),
    )
    .await;
    assert_eq!(skip, Some(Page::Finish));
}

#[tokio::test]
async fn check_degrades_to_not_completed_on_any_failure() {
    let ts = TestServices::new();
    let token = ts.issue_token();
    ts.sign_in_with_token(token).await;

    // Absent document.
    assert_eq!(
        authoritative_check(
            Page::Consent,
            &*ts.identity,
            &*ts.store,
            Duration::from_millis(50)
        )
        .await,
        None
    );

    // Store failure.
    ts.seed_record(token).await;
    ts.store.fail_with("permission denied");
    assert_eq!(
        authoritative_check(
            Page::Consent,
            &*ts.identity,
            &*ts.store,
            Duration::from_millis(50)
        )
        .await,
        None
    );
}

#[tokio::test]
async fn no_session_within_the_wait_means_no_skip() {
    let ts = TestServices::new();
    let token = ts.issue_token();
    ts.seed_record(token).await;
    // Nobody signs in.
    let skip = authoritative_check(
        Page::Consent,
        &*ts.identity,
        &*ts.store,
        Duration::from_millis(20),
    )
    .await;
    assert_eq!(skip, None);
}

#[tokio::test]
async fn pages_without_a_probe_never_skip() {
    let ts = TestServices::new();
    let token = ts.issue_token();
    ts.seed_record(token).await;
    ts.sign_in_with_token(token).await;
    for page in [Page::Introduction, Page::Study, Page::Finish] {
        assert_eq!(
            authoritative_check(page, &*ts.identity, &*ts.store, Duration::from_millis(50)).await,
            None,
            "{page}"
        );
    }
}
