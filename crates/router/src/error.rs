//! Registration-time errors.
//!
//! Everything in here describes a structurally inconsistent router tree. The panicking
//! registration methods of [`Router`](crate::Router) turn these into a startup abort, the
//! `try_*` methods hand them back to the caller. Dispatch never produces an error: not found,
//! method not allowed and redirects are plain responses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("all middlewares must be defined before routes on the router mounted at '{prefix}'")]
    MiddlewareAfterRoute { prefix: String },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("pattern '{pattern}' conflicts with pattern '{existing}'")]
    Conflict { pattern: String, existing: String },

    #[error("pattern '{pattern}' rejected by the path matcher: {source}")]
    Unroutable {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },
}

impl RouterError {
    pub fn middleware_after_route<S: ToString>(prefix: S) -> Self {
        Self::MiddlewareAfterRoute { prefix: prefix.to_string() }
    }

    pub fn invalid_pattern<S: ToString>(pattern: S, source: PatternError) -> Self {
        Self::InvalidPattern { pattern: pattern.to_string(), source }
    }

    pub fn unroutable<S: ToString>(pattern: S, source: matchit::InsertError) -> Self {
        Self::Unroutable { pattern: pattern.to_string(), source }
    }

    pub fn conflict<S1: ToString, S2: ToString>(pattern: S1, existing: S2) -> Self {
        Self::Conflict { pattern: pattern.to_string(), existing: existing.to_string() }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,

    #[error("invalid method '{0}'")]
    InvalidMethod(String),

    #[error("host/path missing /")]
    MissingSlash,

    #[error("host contains '{{' (missing initial '/'?)")]
    BraceInHost,

    #[error("bad wildcard segment '{0}' (must be a whole segment wrapped in '{{}}')")]
    BadWildcard(String),

    #[error("empty wildcard")]
    EmptyWildcard,

    #[error("bad wildcard name '{0}'")]
    InvalidWildcardName(String),

    #[error("duplicate wildcard name '{0}'")]
    DuplicateWildcard(String),

    #[error("{{...}} wildcard not at end")]
    RestNotAtEnd,

    #[error("{{$}} not at end")]
    EndNotAtEnd,
}

#[cfg(test)]
mod tests {
    use super::{PatternError, RouterError};

    #[test]
    fn test_display_names_the_pattern() {
        let error = RouterError::invalid_pattern("/a/{b", PatternError::BadWildcard("{b".into()));
        assert_eq!(
            error.to_string(),
            "invalid pattern '/a/{b': bad wildcard segment '{b' (must be a whole segment wrapped in '{}')"
        );

        let error = RouterError::conflict("GET /a/{id}", "/a/b");
        assert_eq!(error.to_string(), "pattern 'GET /a/{id}' conflicts with pattern '/a/b'");
    }

    #[test]
    fn test_display_escapes_braces() {
        assert_eq!(PatternError::RestNotAtEnd.to_string(), "{...} wildcard not at end");
        assert_eq!(PatternError::EndNotAtEnd.to_string(), "{$} not at end");
        assert_eq!(PatternError::BraceInHost.to_string(), "host contains '{' (missing initial '/'?)");
    }
}
