//! Page controllers
//!
//! One controller per page of the flow. Each owns its page state, talks
//! to the backends through [`crate::services::Services`] and reports
//! failures through [`crate::surface::ErrorSurface`]; navigation is a
//! return value, never a side effect.

mod bug_report;
mod consent;
mod explanation;
mod finish;
mod post_study;
mod pre_study;
mod registration;
mod study;
mod token_page;

pub use bug_report::BugReportController;
pub use consent::ConsentController;
pub use explanation::ExplanationController;
pub use finish::{CompensationView, FinishController};
pub use post_study::PostStudyController;
pub use pre_study::PreStudyController;
pub use registration::{DeviceProfile, RegistrationController};
pub use study::StudyController;
pub use token_page::TokenPageController;

use sfk_gate::Page;

/// What a handler asks the page shell to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Remain on the page; any error was already surfaced
    Stay,
    /// Navigate to the given page
    Navigate(Page),
}

impl Outcome {
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<Page> {
        match self {
            Outcome::Stay => None,
            Outcome::Navigate(page) => Some(*page),
        }
    }
}
