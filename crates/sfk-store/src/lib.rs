//! SFK Store - Remote Service Contracts
//!
//! The study flow treats its backends as opaque remote services reached
//! through three minimal contracts:
//!
//! - [`DocumentStore`]: keyed document get/set/update with dotted partial
//!   field paths and the server-time / array-union sentinels
//! - [`Identity`]: anonymous sign-in, a mutable display-name carrying the
//!   study token, and an auth-state-changed subscription
//! - [`StudyApi`]: the completion-submission and bug-report endpoints
//!
//! Each contract ships a deterministic in-memory implementation used by the
//! tests and the simulator. Time is injected through [`Clock`] so latency
//! measurements and server timestamps are reproducible.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod api;
mod clock;
mod document;
mod error;
mod identity;

pub use api::{BugReport, MemoryStudyApi, StudyApi};
pub use clock::{Clock, ManualClock, SystemClock};
pub use document::{DocumentStore, MemoryStore, COLLECTION_USERS};
pub use error::{ApiError, IdentityError, StoreError};
pub use identity::{await_session, AuthState, Identity, MemoryIdentity, Session};
