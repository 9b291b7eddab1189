//! Named session flags with explicit path and optional expiry

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Name of the cookie carrying the externally issued study token
pub const STUDY_TOKEN_COOKIE: &str = "study_token";

/// Completion flags, one per stage
///
/// Each is set to `"true"` exactly when its stage finishes. No flag name
/// collides in meaning with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageFlag {
    ConsentGiven,
    PreStudyCompleted,
    TokenPageCompleted,
    StudyExplanationCompleted,
    MainStudyCompleted,
    PostStudyCompleted,
    StudyCompleted,
}

impl StageFlag {
    /// Cookie name on the wire
    #[inline]
    #[must_use]
    pub fn cookie_name(&self) -> &'static str {
        match self {
            StageFlag::ConsentGiven => "consent-given",
            StageFlag::PreStudyCompleted => "pre-study-completed",
            StageFlag::TokenPageCompleted => "token-page-completed",
            StageFlag::StudyExplanationCompleted => "study-explanation-completed",
            StageFlag::MainStudyCompleted => "gradio-main-study-completed",
            StageFlag::PostStudyCompleted => "post-study-completed",
            StageFlag::StudyCompleted => "study-completed",
        }
    }

    /// All flags, in stage order
    #[inline]
    #[must_use]
    pub fn all() -> [StageFlag; 7] {
        [
            StageFlag::ConsentGiven,
            StageFlag::PreStudyCompleted,
            StageFlag::TokenPageCompleted,
            StageFlag::StudyExplanationCompleted,
            StageFlag::MainStudyCompleted,
            StageFlag::PostStudyCompleted,
            StageFlag::StudyCompleted,
        ]
    }
}

impl Display for StageFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cookie_name())
    }
}

/// Attributes attached when setting a cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Path scope, `/` for the whole study
    pub path: String,
    /// Absolute expiry; session-lifetime when absent
    pub expires: Option<DateTime<Utc>>,
}

impl CookieAttributes {
    /// Session-lifetime cookie scoped to the study root
    #[inline]
    #[must_use]
    pub fn session() -> Self {
        Self {
            path: "/".to_string(),
            expires: None,
        }
    }

    /// Persistent cookie expiring after the given number of days
    #[inline]
    #[must_use]
    pub fn persistent_days(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            path: "/".to_string(),
            expires: Some(now + Duration::days(days)),
        }
    }
}

/// Session token store contract
///
/// Removal is idempotent: removing a flag that was never set succeeds.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Raw cookie read
    fn get(&self, name: &str) -> Option<String>;

    /// Raw cookie write
    fn set(&self, name: &str, value: &str, attrs: CookieAttributes);

    /// Raw cookie removal; must not fail if the cookie was never set
    fn remove(&self, name: &str);

    /// Stage flag check: present and literally `"true"`
    fn flag(&self, flag: StageFlag) -> bool {
        self.get(flag.cookie_name()).as_deref() == Some("true")
    }

    /// Mark a stage complete
    fn set_flag(&self, flag: StageFlag, attrs: CookieAttributes) {
        tracing::debug!(cookie = flag.cookie_name(), "setting stage flag");
        self.set(flag.cookie_name(), "true", attrs);
    }

    /// Study token cookie, if present
    fn study_token(&self) -> Option<String> {
        self.get(STUDY_TOKEN_COOKIE).filter(|v| !v.is_empty())
    }

    /// Remove every stage flag and the token; idempotent
    fn clear_all(&self) {
        for flag in StageFlag::all() {
            self.remove(flag.cookie_name());
        }
        self.remove(STUDY_TOKEN_COOKIE);
    }
}

/// In-memory cookie jar
///
/// Stands in for the browser's cookie store; expiry is checked lazily
/// against the timestamp passed to reads via [`CookieJar::expire_before`].
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<HashMap<String, (String, CookieAttributes)>>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop cookies whose expiry lies before `now`
    pub fn expire_before(&self, now: DateTime<Utc>) {
        self.cookies
            .write()
            .retain(|_, (_, attrs)| attrs.expires.map_or(true, |expiry| expiry > now));
    }

    /// Number of live cookies
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.read().is_empty()
    }
}

impl SessionStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.read().get(name).map(|(value, _)| value.clone())
    }

    fn set(&self, name: &str, value: &str, attrs: CookieAttributes) {
        self.cookies
            .write()
            .insert(name.to_string(), (value.to_string(), attrs));
    }

    fn remove(&self, name: &str) {
        self.cookies.write().remove(name);
    }
}
