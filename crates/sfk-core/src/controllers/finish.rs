//! Finish page: completion marker and compensation details

use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::forms::validate_matriculation;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use crate::texts;
use sfk_record::{fields, StudyStatus, UpdateValue};
use sfk_session::{CookieAttributes, StageFlag};
use sfk_store::await_session;
use std::sync::Arc;

/// What the compensation form renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationView {
    /// Previously saved matriculation number, if any
    pub prefilled: Option<String>,
    /// `Save` on first entry, the update label afterwards
    pub button_label: &'static str,
}

/// Controller for the finish page
#[derive(Debug)]
pub struct FinishController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
    config: FlowConfig,
}

impl FinishController {
    #[must_use]
    pub fn new(
        services: Arc<Services>,
        surface: Arc<dyn ErrorSurface>,
        config: FlowConfig,
    ) -> Self {
        Self {
            services,
            surface,
            config,
        }
    }

    /// Page load: park the participant as completed, then build the form
    ///
    /// The persistent marker is set before anything else so a reload or
    /// a fresh tab lands on the already-completed page even if the
    /// record write below fails.
    pub async fn arrive(&self) -> CompensationView {
        self.services.session.set_flag(
            StageFlag::StudyCompleted,
            CookieAttributes::persistent_days(
                self.config.persistent_cookie_days,
                self.services.clock.now(),
            ),
        );
        if let Err(err) = self.mark_completed().await {
            tracing::warn!(%err, "completion stamp failed, participant is still done");
        }
        self.compensation_form().await
    }

    async fn mark_completed(&self) -> Result<(), FlowError> {
        let (_, token) = self.services.identified()?;
        let already_completed = self
            .services
            .fetch_record(token)
            .await?
            .is_some_and(|record| record.study_status == StudyStatus::Completed);
        self.services
            .update_record(
                token,
                &[
                    (fields::study_status(), UpdateValue::set("completed")),
                    (
                        fields::completion_timestamp(),
                        UpdateValue::ServerTimestamp,
                    ),
                    (fields::last_stage(), UpdateValue::set("finish")),
                    (fields::last_active_at(), UpdateValue::ServerTimestamp),
                ],
            )
            .await?;

        // A resumed session can land here without the study-page
        // completion having run; release the server-side submission in
        // that case. The status check keeps it at one submission per
        // participant. A refused submission is logged, never blocking.
        if !already_completed {
            if let Err(err) = self.services.api.submit_study().await {
                tracing::warn!(%err, "completion submission refused");
            }
        }
        Ok(())
    }

    /// Build the form, waiting briefly for a restored session so a saved
    /// number can be prefilled. No session within the wait means an empty
    /// form, never a blocked page.
    pub async fn compensation_form(&self) -> CompensationView {
        let prefilled = match await_session(&*self.services.identity, self.config.auth_wait())
            .await
        {
            Some(session) => match session
                .study_token()
                .and_then(|raw| raw.parse::<sfk_record::StudyToken>().ok())
            {
                Some(token) => match self.services.fetch_record(token).await {
                    Ok(record) => {
                        record.and_then(|r| r.study_compensation.matriculation_number)
                    }
                    Err(err) => {
                        tracing::warn!(%err, "could not prefill matriculation number");
                        None
                    }
                },
                None => None,
            },
            None => {
                tracing::info!("no session within auth wait, rendering empty form");
                None
            }
        };
        let button_label = if prefilled.is_some() {
            texts::UPDATE_LABEL
        } else {
            texts::SAVE_LABEL
        };
        CompensationView {
            prefilled,
            button_label,
        }
    }

    /// Save or update the matriculation number
    ///
    /// Returns the confirmation text on success, `None` after a surfaced
    /// error. The section stays freely re-editable.
    pub async fn submit_matriculation(&self, input: &str) -> Option<&'static str> {
        let number = match validate_matriculation(input) {
            Ok(number) => number,
            Err(err) => {
                surface_error(&*self.surface, &FlowError::Validation(err));
                return None;
            }
        };
        match self.save_matriculation(number).await {
            Ok(updated) => Some(if updated {
                texts::UPDATED_CONFIRMATION
            } else {
                texts::SAVED_CONFIRMATION
            }),
            Err(err) => {
                surface_error(&*self.surface, &err);
                None
            }
        }
    }

    async fn save_matriculation(&self, number: &str) -> Result<bool, FlowError> {
        let (_, token) = self.services.identified()?;
        let had_one = self
            .services
            .fetch_record(token)
            .await?
            .and_then(|r| r.study_compensation.matriculation_number)
            .is_some();
        self.services
            .update_record(
                token,
                &[
                    (
                        fields::study_compensation().child("matriculationNumber"),
                        UpdateValue::set(number),
                    ),
                    (
                        fields::study_compensation().child("submittedAt"),
                        UpdateValue::ServerTimestamp,
                    ),
                ],
            )
            .await?;
        Ok(had_one)
    }
}
