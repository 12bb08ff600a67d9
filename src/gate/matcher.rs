//! Path classification for the access gate.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("route pattern must start with '/': {0}")]
    Relative(String),
    #[error("route pattern has an unnamed parameter: {0}")]
    UnnamedParam(String),
    #[error("invalid route pattern {pattern}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Matches request paths against a list of route patterns.
///
/// Pattern syntax:
/// - literal text matches itself, the whole path must match;
/// - `(.*)` matches any remainder, including nothing;
/// - `:name` matches exactly one non-empty path segment.
///
/// Matching ignores letter case and a single trailing slash on the request path.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl RouteMatcher {
    /// # Errors
    /// Returns an error if any pattern is relative or does not compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, compiled })
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.compiled.iter().any(|regex| regex.is_match(path))
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn compile(pattern: &str) -> Result<Regex, PatternError> {
    if !pattern.starts_with('/') {
        return Err(PatternError::Relative(pattern.to_string()));
    }

    let mut expr = String::from("(?i)^");
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(ch) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("(.*)") {
            expr.push_str(&regex::escape(&literal));
            literal.clear();
            expr.push_str(".*");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(':') {
            let end = tail
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(tail.len());
            if end == 0 {
                return Err(PatternError::UnnamedParam(pattern.to_string()));
            }
            expr.push_str(&regex::escape(&literal));
            literal.clear();
            expr.push_str("[^/]+");
            rest = &tail[end..];
        } else {
            literal.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    // `/auth/` in a pattern means the same as `/auth`; the optional slash is
    // appended below.
    let literal = literal.strip_suffix('/').unwrap_or(&literal);
    expr.push_str(&regex::escape(literal));
    expr.push_str("/?$");

    Regex::new(&expr).map_err(|source| PatternError::Regex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Decides which request paths the gate runs for.
///
/// - `/` is always in scope;
/// - paths under an always-gated prefix (`/api`, `/trpc`) are in scope even when
///   they look like files;
/// - other paths containing a `.` are static assets and are skipped;
/// - paths under an internal prefix are skipped.
#[derive(Debug, Clone)]
pub struct PathScope {
    always_gated: Vec<String>,
    internal: Vec<String>,
}

impl PathScope {
    #[must_use]
    pub fn new(always_gated: Vec<String>, internal: Vec<String>) -> Self {
        Self {
            always_gated,
            internal,
        }
    }

    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        if path == "/" {
            return true;
        }
        if self
            .always_gated
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return true;
        }

        let rest = path.strip_prefix('/').unwrap_or(path);
        if rest.contains('.') {
            return false;
        }
        !self
            .internal
            .iter()
            .map(|prefix| prefix.trim_start_matches('/'))
            .any(|prefix| rest.starts_with(prefix))
    }
}

impl Default for PathScope {
    fn default() -> Self {
        Self::new(
            vec!["/api".to_string(), "/trpc".to_string()],
            vec!["_internal".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn literal_pattern_matches_exact_path() -> Result<()> {
        let matcher = RouteMatcher::new(["/auth"])?;
        assert!(matcher.matches("/auth"));
        assert!(matcher.matches("/auth/"));
        assert!(!matcher.matches("/auth/signin"));
        assert!(!matcher.matches("/authors"));
        assert!(!matcher.matches("/"));
        Ok(())
    }

    #[test]
    fn patterns_ignore_case() -> Result<()> {
        let matcher = RouteMatcher::new(["/auth", "/auth/oauth/:provider"])?;
        assert!(matcher.matches("/AUTH"));
        assert!(matcher.matches("/Auth/"));
        assert!(matcher.matches("/auth/OAuth/Google"));
        assert!(!matcher.matches("/AUTHORS"));
        Ok(())
    }

    #[test]
    fn wildcard_pattern_matches_remainder() -> Result<()> {
        let matcher = RouteMatcher::new(["/docs(.*)"])?;
        assert!(matcher.matches("/docs"));
        assert!(matcher.matches("/docs/intro"));
        assert!(matcher.matches("/docs-v2"));
        assert!(!matcher.matches("/doc"));
        Ok(())
    }

    #[test]
    fn named_param_matches_one_segment() -> Result<()> {
        let matcher = RouteMatcher::new(["/auth/oauth/:provider"])?;
        assert!(matcher.matches("/auth/oauth/google"));
        assert!(!matcher.matches("/auth/oauth/"));
        assert!(!matcher.matches("/auth/oauth/google/extra"));
        Ok(())
    }

    #[test]
    fn regex_metacharacters_are_literal() -> Result<()> {
        let matcher = RouteMatcher::new(["/a.b"])?;
        assert!(matcher.matches("/a.b"));
        assert!(!matcher.matches("/axb"));
        Ok(())
    }

    #[test]
    fn root_pattern_matches_only_root() -> Result<()> {
        let matcher = RouteMatcher::new(["/"])?;
        assert!(matcher.matches("/"));
        assert!(!matcher.matches("/dashboard"));
        Ok(())
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(matches!(
            RouteMatcher::new(["auth"]),
            Err(PatternError::Relative(_))
        ));
        assert!(matches!(
            RouteMatcher::new(["/users/:"]),
            Err(PatternError::UnnamedParam(_))
        ));
    }

    #[test]
    fn scope_skips_static_assets_and_internal_routes() {
        let scope = PathScope::default();
        assert!(scope.applies_to("/"));
        assert!(scope.applies_to("/dashboard"));
        assert!(scope.applies_to("/auth"));
        assert!(!scope.applies_to("/favicon.ico"));
        assert!(!scope.applies_to("/assets/app.js"));
        assert!(!scope.applies_to("/_internal/chunks"));
    }

    #[test]
    fn scope_always_gates_api_routes() {
        let scope = PathScope::default();
        assert!(scope.applies_to("/api/users"));
        assert!(scope.applies_to("/api/export.csv"));
        assert!(scope.applies_to("/trpc/user.get"));
    }
}
