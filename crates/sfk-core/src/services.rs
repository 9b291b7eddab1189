//! Shared service bundle
//!
//! Controllers hold an `Arc<Services>` instead of reaching for globals;
//! swapping in the in-memory implementations is what makes the simulator
//! and the controller tests deterministic.

use crate::error::FlowError;
use sfk_record::{FieldPath, ParticipantRecord, StudyToken, TokenError, UpdateValue};
use sfk_session::SessionStore;
use sfk_store::{Clock, DocumentStore, Identity, Session, StoreError, StudyApi, COLLECTION_USERS};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Services {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn Identity>,
    pub api: Arc<dyn StudyApi>,
    pub session: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn Identity>,
        api: Arc<dyn StudyApi>,
        session: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            identity,
            api,
            session,
            clock,
        }
    }

    /// Current session plus the token it carries
    ///
    /// Every write to the participant document starts here: no session or
    /// no token means nothing to address the document with.
    pub(crate) fn identified(&self) -> Result<(Session, StudyToken), FlowError> {
        let session = self.identity.current().ok_or(FlowError::MissingIdentity)?;
        let token = session
            .study_token()
            .ok_or(TokenError::Missing)?
            .parse::<StudyToken>()?;
        Ok((session, token))
    }

    /// Partial update of the participant document
    pub(crate) async fn update_record(
        &self,
        token: StudyToken,
        updates: &[(FieldPath, UpdateValue)],
    ) -> Result<(), FlowError> {
        self.store
            .update(COLLECTION_USERS, &token.to_string(), updates)
            .await?;
        Ok(())
    }

    /// Fetch and deserialize the participant document, `None` if absent
    pub(crate) async fn fetch_record(
        &self,
        token: StudyToken,
    ) -> Result<Option<ParticipantRecord>, FlowError> {
        let doc = self.store.get(COLLECTION_USERS, &token.to_string()).await?;
        match doc {
            None => Ok(None),
            Some(doc) => ParticipantRecord::from_document(doc)
                .map(Some)
                .map_err(|err| StoreError::Serialization(err.to_string()).into()),
        }
    }
}
