//! Study API endpoints (completion submission, bug reports)

use crate::error::ApiError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Bug report payload for `POST /api/report-bug`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    /// Report category selected by the participant
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    /// Page the report was filed from
    pub page: String,
    pub user_agent: Option<String>,
    /// Included only with the participant's permission
    pub study_token: Option<String>,
}

/// Completion-submission and bug-report endpoints
///
/// `submit_study` takes no body; a 2xx means the server-side lock/resource
/// release succeeded. Callers log non-2xx and keep navigating; completion
/// must never strand a participant on the study page.
#[async_trait::async_trait]
pub trait StudyApi: Send + Sync + std::fmt::Debug {
    /// `POST /api/submit-study`
    async fn submit_study(&self) -> Result<(), ApiError>;

    /// `POST /api/report-bug`
    async fn report_bug(&self, report: &BugReport) -> Result<(), ApiError>;
}

/// Recording in-memory endpoint pair
#[derive(Debug, Default)]
pub struct MemoryStudyApi {
    submissions: Mutex<u32>,
    reports: Mutex<Vec<BugReport>>,
    fail_submit: Mutex<Option<(u16, String)>>,
    fail_report: Mutex<Option<(u16, String)>>,
}

impl MemoryStudyApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `submit_study` to answer with a non-2xx status
    pub fn fail_submit(&self, status: u16, body: impl Into<String>) {
        *self.fail_submit.lock() = Some((status, body.into()));
    }

    /// Script `report_bug` to answer with a non-2xx status
    pub fn fail_report(&self, status: u16, body: impl Into<String>) {
        *self.fail_report.lock() = Some((status, body.into()));
    }

    /// Number of successful `submit_study` calls
    #[must_use]
    pub fn submissions(&self) -> u32 {
        *self.submissions.lock()
    }

    /// Bug reports received so far
    #[must_use]
    pub fn reports(&self) -> Vec<BugReport> {
        self.reports.lock().clone()
    }
}

#[async_trait::async_trait]
impl StudyApi for MemoryStudyApi {
    async fn submit_study(&self) -> Result<(), ApiError> {
        if let Some((status, body)) = self.fail_submit.lock().clone() {
            return Err(ApiError::Status {
                endpoint: "/api/submit-study",
                status,
                body,
            });
        }
        *self.submissions.lock() += 1;
        Ok(())
    }

    async fn report_bug(&self, report: &BugReport) -> Result<(), ApiError> {
        if let Some((status, body)) = self.fail_report.lock().clone() {
            return Err(ApiError::Status {
                endpoint: "/api/report-bug",
                status,
                body,
            });
        }
        self.reports.lock().push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_submissions_and_reports() {
        let api = MemoryStudyApi::new();
        api.submit_study().await.unwrap();
        api.report_bug(&BugReport {
            kind: "ui".into(),
            description: "button stuck".into(),
            page: "study".into(),
            user_agent: None,
            study_token: None,
        })
        .await
        .unwrap();

        assert_eq!(api.submissions(), 1);
        assert_eq!(api.reports().len(), 1);
    }

    #[tokio::test]
    async fn scripted_failures_carry_status_and_body() {
        let api = MemoryStudyApi::new();
        api.fail_submit(500, "lock release failed");
        let err = api.submit_study().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(api.submissions(), 0);
    }

    #[test]
    fn bug_report_wire_shape() {
        let report = BugReport {
            kind: "timing".into(),
            description: "indicator never appeared".into(),
            page: "study".into(),
            user_agent: Some("test-agent".into()),
            study_token: Some("t".into()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "timing");
        assert_eq!(json["userAgent"], "test-agent");
        assert_eq!(json["studyToken"], "t");
    }
}
