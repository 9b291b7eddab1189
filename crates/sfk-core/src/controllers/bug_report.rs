//! Bug-report dialog, available from every page

use crate::error::FlowError;
use crate::forms::ValidationError;
use crate::services::Services;
use crate::surface::{surface_error, ErrorSurface};
use sfk_gate::Page;
use sfk_store::BugReport;
use std::sync::Arc;

const DESCRIPTION_MAX: usize = 1_000;

/// Controller for the bug-report dialog
#[derive(Debug)]
pub struct BugReportController {
    services: Arc<Services>,
    surface: Arc<dyn ErrorSurface>,
    user_agent: Option<String>,
}

impl BugReportController {
    #[must_use]
    pub fn new(
        services: Arc<Services>,
        surface: Arc<dyn ErrorSurface>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            services,
            surface,
            user_agent,
        }
    }

    /// Send one report; returns whether it was accepted
    pub async fn submit(&self, kind: &str, description: &str, page: Page) -> bool {
        match self.send(kind, description, page).await {
            Ok(()) => true,
            Err(err) => {
                surface_error(&*self.surface, &err);
                false
            }
        }
    }

    async fn send(&self, kind: &str, description: &str, page: Page) -> Result<(), FlowError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription.into());
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(ValidationError::TooLong {
                field: "description",
                max: DESCRIPTION_MAX,
            }
            .into());
        }

        let report = BugReport {
            kind: kind.to_string(),
            description: description.to_string(),
            page: page.route().to_string(),
            user_agent: self.user_agent.clone(),
            // The token rides along when the session has one; reports stay
            // usable without it.
            study_token: self.services.session.study_token(),
        };
        self.services.api.report_bug(&report).await?;
        tracing::info!(page = %page, "bug report sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use sfk_test_utils::TestServices;

    fn dialog(ts: &TestServices) -> (BugReportController, Arc<RecordingSurface>) {
        let services = Arc::new(Services::new(
            ts.store.clone(),
            ts.identity.clone(),
            ts.api.clone(),
            ts.cookies.clone(),
            ts.clock.clone(),
        ));
        let surface = Arc::new(RecordingSurface::new());
        let controller =
            BugReportController::new(services, surface.clone(), Some("test-agent".into()));
        (controller, surface)
    }

    #[tokio::test]
    async fn report_carries_page_token_and_agent() {
        let ts = TestServices::new();
        let token = ts.issue_token();
        let (controller, surface) = dialog(&ts);

        assert!(
            controller
                .submit("timing", "indicator never appeared", Page::Study)
                .await
        );
        assert!(surface.is_quiet());

        let reports = ts.api.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].page, "/study");
        assert_eq!(reports[0].study_token, Some(token.to_string()));
        assert_eq!(reports[0].user_agent.as_deref(), Some("test-agent"));
    }

    #[tokio::test]
    async fn empty_description_is_rejected() {
        let ts = TestServices::new();
        let (controller, surface) = dialog(&ts);

        assert!(!controller.submit("ui", "   ", Page::Consent).await);
        assert_eq!(surface.count(), 1);
        assert!(ts.api.reports().is_empty());
    }

    #[tokio::test]
    async fn refused_report_is_surfaced() {
        let ts = TestServices::new();
        ts.api.fail_report(500, "mailer down");
        let (controller, surface) = dialog(&ts);

        assert!(!controller.submit("ui", "button stuck", Page::Finish).await);
        let shown = surface.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].1, "mailer down");
    }
}
