//! Route patterns restricting when a loader applies.

use globset::{
    Glob,
    GlobMatcher,
};
use regex::Regex;

use crate::logger;

/// A route restriction.
///
/// Literal routes compare the whole route string, query and hash included.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    Literal(String),
    Regex(Regex),
    Glob(GlobMatcher),
    /// A pattern that failed to compile. Never matches.
    Invalid { pattern: String, reason: String },
}

impl RoutePattern {
    #[must_use]
    pub fn literal(route: impl Into<String>) -> Self {
        Self::Literal(route.into())
    }

    /// Compiles a regular expression pattern.
    ///
    /// A malformed pattern is kept as [`RoutePattern::Invalid`] and reported
    /// each time it is tested.
    #[must_use]
    pub fn regex(pattern: &str) -> Self {
        Regex::new(pattern).map_or_else(
            |e| Self::Invalid { pattern: pattern.to_string(), reason: e.to_string() },
            Self::Regex,
        )
    }

    /// Compiles a glob pattern (`/docs/**`).
    #[must_use]
    pub fn glob(pattern: &str) -> Self {
        Glob::new(pattern).map_or_else(
            |e| Self::Invalid { pattern: pattern.to_string(), reason: e.to_string() },
            |glob| Self::Glob(glob.compile_matcher()),
        )
    }

    /// Tests the pattern against a route.
    #[must_use]
    pub fn matches(&self, route: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == route,
            Self::Regex(regex) => regex.is_match(route),
            Self::Glob(matcher) => matcher.is_match(route),
            Self::Invalid { pattern, reason } => {
                logger::current().error(format!("Invalid route config! '{pattern}': {reason}"));
                false
            }
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(route: &str) -> Self {
        Self::literal(route)
    }
}

impl From<String> for RoutePattern {
    fn from(route: String) -> Self {
        Self::Literal(route)
    }
}

impl From<Regex> for RoutePattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

/// Returns true if a loader restricted to `routes` applies to `route`.
///
/// No restriction, or an empty one, applies everywhere.
#[must_use]
pub fn route_applies(routes: Option<&[RoutePattern]>, route: &str) -> bool {
    routes.is_none_or(|patterns| {
        patterns.is_empty() || patterns.iter().any(|pattern| pattern.matches(route))
    })
}
