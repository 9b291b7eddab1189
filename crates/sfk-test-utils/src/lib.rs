//! Testing utilities for the SFK workspace
//!
//! Shared fixtures: a manually advanced clock, pre-wired in-memory service
//! bundles and participant-record seeds.

#![allow(missing_docs)]

use sfk_record::{ParticipantRecord, StudyToken};
use sfk_session::{CookieAttributes, CookieJar, SessionStore, StageFlag, STUDY_TOKEN_COOKIE};
use sfk_store::{
    Clock, DocumentStore, Identity, MemoryIdentity, MemoryStore, MemoryStudyApi, COLLECTION_USERS,
};
use std::sync::Arc;

pub use sfk_store::ManualClock;

/// Everything a controller test needs, wired to one manual clock
#[derive(Debug)]
pub struct TestServices {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<MemoryIdentity>,
    pub api: Arc<MemoryStudyApi>,
    pub cookies: Arc<CookieJar>,
}

impl TestServices {
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::fixed());
        let shared: Arc<dyn Clock> = clock.clone();
        Self {
            store: Arc::new(MemoryStore::new(shared)),
            identity: Arc::new(MemoryIdentity::new()),
            api: Arc::new(MemoryStudyApi::new()),
            cookies: Arc::new(CookieJar::new()),
            clock,
        }
    }

    /// Issue a token cookie, as the server does on the first page hit
    pub fn issue_token(&self) -> StudyToken {
        let token = StudyToken::generate();
        self.cookies.set(
            STUDY_TOKEN_COOKIE,
            &token.to_string(),
            CookieAttributes::session(),
        );
        token
    }

    /// Put a specific token back into the jar, as a revisit would
    pub fn reissue_token(&self, token: StudyToken) {
        self.cookies.set(
            STUDY_TOKEN_COOKIE,
            &token.to_string(),
            CookieAttributes::session(),
        );
    }

    /// Seed the store with a fresh record for `token` and return it
    pub async fn seed_record(&self, token: StudyToken) -> ParticipantRecord {
        let record = ParticipantRecord::new(token);
        self.store
            .set(
                COLLECTION_USERS,
                &token.to_string(),
                record.to_document().expect("record serializes"),
            )
            .await
            .expect("memory store accepts seed");
        record
    }

    /// Sign in and carry `token` in the display name, as registration does
    pub async fn sign_in_with_token(&self, token: StudyToken) {
        self.identity
            .sign_in_anonymously()
            .await
            .expect("memory identity signs in");
        self.identity
            .set_display_name(&token.to_string())
            .await
            .expect("session exists");
    }

    /// Mark every flag up to and including `upto` as completed
    pub fn set_flags_through(&self, upto: StageFlag) {
        for flag in StageFlag::all() {
            self.cookies.set_flag(flag, CookieAttributes::session());
            if flag == upto {
                break;
            }
        }
    }

    /// Fetch the stored document for `token`
    pub async fn document(&self, token: StudyToken) -> serde_json::Value {
        self.store
            .get(COLLECTION_USERS, &token.to_string())
            .await
            .expect("memory store reads")
            .expect("document exists")
    }
}

impl Default for TestServices {
    fn default() -> Self {
        Self::new()
    }
}
