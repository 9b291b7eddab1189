//! Introduction page: session bootstrap and document creation

use crate::controllers::Outcome;
use crate::error::FlowError;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use sfk_gate::Page;
use sfk_record::{fields, DeviceInfo, ParticipantRecord, StudyToken, TokenError, UpdateValue};
use sfk_store::{StoreError, COLLECTION_USERS};
use std::sync::Arc;

/// Client environment captured once per visit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    pub user_agent: String,
    pub screen_resolution: String,
}

/// Controller for the introduction page
///
/// The continue click is where a participant becomes real: anonymous
/// sign-in, token attached to the session, and the full document
/// skeleton written (or activity refreshed for a returning participant).
#[derive(Debug)]
pub struct RegistrationController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
    device: DeviceProfile,
}

impl RegistrationController {
    #[must_use]
    pub fn new(
        services: Arc<Services>,
        surface: Arc<dyn ErrorSurface>,
        device: DeviceProfile,
    ) -> Self {
        Self {
            services,
            surface,
            device,
        }
    }

    pub async fn continue_to_consent(&self) -> Outcome {
        match self.register().await {
            Ok(page) => Outcome::Navigate(page),
            Err(err) => {
                surface_error(&*self.surface, &err);
                Outcome::Stay
            }
        }
    }

    async fn register(&self) -> Result<Page, FlowError> {
        let raw = self
            .services
            .session
            .study_token()
            .ok_or(TokenError::Missing)?;
        let token: StudyToken = raw.parse()?;

        let session = match self.services.identity.current() {
            Some(session) => session,
            None => self.services.identity.sign_in_anonymously().await?,
        };
        // The session carries the token so every later page can address
        // the document without re-reading the cookie.
        if session.study_token() != Some(raw.as_str()) {
            self.services.identity.set_display_name(&raw).await?;
        }

        let id = token.to_string();
        if self.services.store.get(COLLECTION_USERS, &id).await?.is_some() {
            tracing::info!(%token, "returning participant");
            self.services
                .update_record(
                    token,
                    &[
                        (fields::last_active_at(), UpdateValue::ServerTimestamp),
                        (
                            fields::device_user_agent(),
                            UpdateValue::set(self.device.user_agent.clone()),
                        ),
                        (
                            fields::device_screen_resolution(),
                            UpdateValue::set(self.device.screen_resolution.clone()),
                        ),
                    ],
                )
                .await?;
        } else {
            tracing::info!(%token, "registering new participant");
            let mut record = ParticipantRecord::new(token);
            record.device_info = DeviceInfo {
                user_agent: Some(self.device.user_agent.clone()),
                screen_resolution: Some(self.device.screen_resolution.clone()),
            };
            let doc = record
                .to_document()
                .map_err(|err| StoreError::Serialization(err.to_string()))?;
            self.services.store.set(COLLECTION_USERS, &id, doc).await?;
            self.services
                .update_record(
                    token,
                    &[
                        (fields::created_at(), UpdateValue::ServerTimestamp),
                        (fields::last_active_at(), UpdateValue::ServerTimestamp),
                    ],
                )
                .await?;
        }

        Ok(Page::Consent)
    }
}
