//! Gate decisions

use crate::page::Page;
use sfk_record::StudyToken;
use sfk_session::{SessionStore, StageFlag};
use sfk_store::{await_session, DocumentStore, Identity, COLLECTION_USERS};
use std::str::FromStr;
use std::time::Duration;

/// Outcome of a gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Serve the page; controllers may initialize
    Allow,
    /// Redirect without running any page initialization
    Redirect(Page),
}

/// Prerequisite flag for a page, with the entry page to bounce to when the
/// flag is absent
#[inline]
#[must_use]
pub fn required_flag(page: Page) -> Option<(StageFlag, Page)> {
    match page {
        Page::PreStudy => Some((StageFlag::ConsentGiven, Page::Consent)),
        Page::TokenPage => Some((StageFlag::PreStudyCompleted, Page::PreStudy)),
        Page::StudyExplanation => Some((StageFlag::TokenPageCompleted, Page::TokenPage)),
        Page::Study => Some((StageFlag::StudyExplanationCompleted, Page::StudyExplanation)),
        Page::PostStudy => Some((StageFlag::MainStudyCompleted, Page::Study)),
        Page::Finish => Some((StageFlag::PostStudyCompleted, Page::PostStudy)),
        Page::Introduction | Page::Consent | Page::AlreadyCompleted | Page::TokenExpired => None,
    }
}

/// Synchronous cookie-level gate, run before anything else on page load
#[must_use]
pub fn quick_check(page: Page, session: &dyn SessionStore) -> GateDecision {
    // Completed participants are parked on the already-completed page.
    if session.flag(StageFlag::StudyCompleted) && !page.exempt_from_completed_redirect() {
        tracing::info!(%page, "completed participant redirected");
        return GateDecision::Redirect(Page::AlreadyCompleted);
    }

    if page.is_error_page() || page == Page::Introduction {
        return GateDecision::Allow;
    }

    // Everything past the introduction needs a well-formed study token.
    let token = match session.study_token() {
        Some(token) => token,
        None => {
            tracing::warn!(%page, "missing study token");
            return GateDecision::Redirect(Page::TokenExpired);
        }
    };
    if StudyToken::from_str(&token).is_err() {
        // A malformed token is replaced by revisiting the introduction.
        tracing::warn!(%page, "malformed study token");
        return GateDecision::Redirect(Page::Introduction);
    }

    if let Some((flag, entry)) = required_flag(page) {
        if !session.flag(flag) {
            tracing::info!(%page, missing = flag.cookie_name(), "prerequisite flag absent");
            return GateDecision::Redirect(entry);
        }
    }

    GateDecision::Allow
}

/// Remote field that marks a page's work as already done, with the page to
/// skip ahead to
fn completion_probe(page: Page) -> Option<(&'static [&'static str], Page)> {
    match page {
        Page::Consent => Some((&["consentGiven"], Page::PreStudy)),
        Page::PreStudy => Some((&["preStudyQuestionnaire", "completed"], Page::TokenPage)),
        Page::PostStudy => Some((&["postStudyQuestionnaire", "completed"], Page::Finish)),
        _ => None,
    }
}

/// Authoritative remote completion check
///
/// Runs in the background after [`quick_check`] allowed the page. Returns
/// the skip-ahead target if the record already shows this page's work as
/// complete. Any failure along the way (no session inside `auth_wait`, no
/// token on the session, store error, absent document) degrades to `None`
/// ("not completed") so the participant is never blocked indefinitely.
pub async fn authoritative_check(
    page: Page,
    identity: &dyn Identity,
    store: &dyn DocumentStore,
    auth_wait: Duration,
) -> Option<Page> {
    let (probe, target) = completion_probe(page)?;

    let session = match await_session(identity, auth_wait).await {
        Some(session) => session,
        None => {
            tracing::info!(%page, "no session within auth wait, showing form");
            return None;
        }
    };
    let token = session.study_token()?.to_string();

    let doc = match store.get(COLLECTION_USERS, &token).await {
        Ok(Some(doc)) => doc,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(%page, %err, "authoritative check failed, treating as not completed");
            return None;
        }
    };

    let mut field = &doc;
    for segment in probe {
        field = field.get(*segment)?;
    }
    if field.as_bool() == Some(true) {
        tracing::info!(%page, skip_to = %target, "already completed, skipping ahead");
        Some(target)
    } else {
        None
    }
}
