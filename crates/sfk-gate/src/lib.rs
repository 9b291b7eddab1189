//! SFK Gate - Stage Gating
//!
//! On every page load the gate runs first; page-specific controllers only
//! activate if it allows the view. Two layers:
//!
//! 1. [`quick_check`]: synchronous, over the cookie flags. Missing
//!    prerequisite flag → redirect to that stage's entry page, and stage
//!    initialization must not run.
//! 2. [`authoritative_check`]: asynchronous, against the remote record,
//!    for the stages whose completion the server can verify (consent,
//!    pre-study, post-study). The page renders its form optimistically
//!    while this runs; if the record already shows completion the gate
//!    redirects *forward* (skip-ahead) instead of allowing re-submission.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod gate;
mod page;

pub use gate::{authoritative_check, quick_check, required_flag, GateDecision};
pub use page::Page;
