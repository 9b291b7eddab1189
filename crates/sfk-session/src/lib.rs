//! SFK Session - Cookie-Backed Stage Flags
//!
//! The session token store holds a small set of named flags in client-side
//! cookies: one boolean per completed stage plus the study token itself.
//! The flags are a *cache* of remote completion state. The remote record
//! stays authoritative for completion guards, the cookies are authoritative
//! for the gate quick check, so the two may legitimately desynchronize.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod jar;

pub use jar::{CookieAttributes, CookieJar, SessionStore, StageFlag, STUDY_TOKEN_COOKIE};
