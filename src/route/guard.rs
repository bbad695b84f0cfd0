use std::sync::LazyLock;

use regex::RegexSet;

use crate::session::{SessionBackend, SessionStore};

use super::screen::{Screen, normalize_path};

/// Path prefixes that never pass through the guard: API routes and static assets.
pub const DEFAULT_BYPASS_PATTERNS: &[&str] = &[
    r"^/api",
    r"^/_next/static",
    r"^/_next/image",
    r"^/favicon\.ico",
];

static DEFAULT_BYPASS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(DEFAULT_BYPASS_PATTERNS).expect("invalid default bypass patterns")
});

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested screen unchanged.
    Proceed,
    /// The path is on the bypass list and skips the gate entirely.
    Bypass,
    Redirect(Screen),
}

/// Gate evaluated before any screen logic runs.
///
/// | session         | entry screen       | any other path     |
/// |-----------------|--------------------|--------------------|
/// | none            | proceed            | redirect to entry  |
/// | authenticated   | redirect to home   | proceed            |
#[derive(Debug, Clone)]
pub struct RouteGuard {
    patterns: Vec<String>,
    bypass: RegexSet,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_BYPASS_PATTERNS
                .iter()
                .map(|pattern| pattern.to_string())
                .collect(),
            bypass: DEFAULT_BYPASS.clone(),
        }
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a regular expression matched against the request path; matching
    /// paths bypass the gate.
    pub fn with_bypass(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let mut patterns = self.patterns.clone();
        patterns.push(pattern.to_string());
        self.bypass = RegexSet::new(&patterns)?;
        self.patterns = patterns;
        Ok(self)
    }

    pub fn bypass_patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn check(&self, path: &str, authenticated: bool) -> Navigation {
        let path = normalize_path(path);
        if self.bypass.is_match(path) {
            return Navigation::Bypass;
        }
        let is_entry = path == Screen::ENTRY.path();
        match (authenticated, is_entry) {
            (false, false) => Navigation::Redirect(Screen::ENTRY),
            (true, true) => Navigation::Redirect(Screen::HOME),
            (false, true) | (true, false) => Navigation::Proceed,
        }
    }

    /// [`check`](Self::check) with the authenticated flag read from `session`.
    pub fn check_session<B: SessionBackend>(
        &self,
        path: &str,
        session: &SessionStore<B>,
    ) -> Navigation {
        self.check(path, session.is_authenticated())
    }
}
