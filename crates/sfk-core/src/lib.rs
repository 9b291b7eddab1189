//! SFK Core - Study Flow Controllers
//!
//! The core crate owns everything that happens after the gate admits a
//! page:
//!
//! - [`controllers`]: one controller per page, each owning its own state
//!   (no ambient globals) and speaking to the backends through the
//!   [`services::Services`] bundle
//! - [`progression`]: the monotone 1..=4 scenario counter with its busy
//!   guard and the terminal-control detection
//! - [`timing`]: the explicit latency state machine fed by widget events
//!   through an event queue
//! - [`forms`]: questionnaire inputs and their validation rules
//! - [`test_harness`]: a seeded end-to-end simulator over the in-memory
//!   services
//!
//! Errors never escape a controller's public surface: every failure is
//! classified, logged and reported through [`surface::ErrorSurface`], and
//! the participant is left on a page they can retry from.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod controllers;
pub mod error;
pub mod forms;
pub mod progression;
pub mod services;
pub mod surface;
pub mod test_harness;
pub mod texts;
pub mod timing;

pub use config::FlowConfig;
pub use controllers::{
    BugReportController, CompensationView, ConsentController, DeviceProfile,
    ExplanationController, FinishController, Outcome, PostStudyController, PreStudyController,
    RegistrationController, StudyController, TokenPageController,
};
pub use error::FlowError;
pub use forms::{PostStudyForm, PreStudyForm, ValidationError};
pub use progression::{CompletionSignal, NextControl, ScenarioProgression};
pub use services::Services;
pub use surface::{surface_error, ErrorCategory, ErrorSurface, RecordingSurface};
pub use timing::{NodeKind, TimingEffect, TimingInstrument, TimingPhase, WidgetEvent};
