//! Pages of the study flow

use std::fmt::{self, Display, Formatter};

/// Every routable page, including the two error pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Introduction,
    Consent,
    PreStudy,
    TokenPage,
    StudyExplanation,
    Study,
    PostStudy,
    Finish,
    AlreadyCompleted,
    TokenExpired,
}

impl Page {
    /// Route the page is served under
    #[inline]
    #[must_use]
    pub fn route(&self) -> &'static str {
        match self {
            Page::Introduction => "/",
            Page::Consent => "/consent",
            Page::PreStudy => "/pre-study",
            Page::TokenPage => "/token",
            Page::StudyExplanation => "/study-explanation",
            Page::Study => "/study",
            Page::PostStudy => "/post-study",
            Page::Finish => "/finish",
            Page::AlreadyCompleted => "/already-completed",
            Page::TokenExpired => "/token-expired",
        }
    }

    /// Error pages are served without any token or flag checks
    #[inline]
    #[must_use]
    pub fn is_error_page(&self) -> bool {
        matches!(self, Page::AlreadyCompleted | Page::TokenExpired)
    }

    /// Pages a fully completed participant may still visit
    #[inline]
    #[must_use]
    pub fn exempt_from_completed_redirect(&self) -> bool {
        matches!(self, Page::Finish | Page::AlreadyCompleted)
    }

    /// The eight sequential flow pages, in order
    #[inline]
    #[must_use]
    pub fn flow_order() -> [Page; 8] {
        [
            Page::Introduction,
            Page::Consent,
            Page::PreStudy,
            Page::TokenPage,
            Page::StudyExplanation,
            Page::Study,
            Page::PostStudy,
            Page::Finish,
        ]
    }
}

impl Display for Page {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.route())
    }
}
