//! Registration patterns.
//!
//! A pattern has the shape `[METHOD ][HOST]/[PATH]`. This module splits and re-joins the method
//! token, parses the full grammar into a [`Pattern`] and decides which of two patterns is more
//! specific. Request paths are matched by the [`ServeMux`](crate::ServeMux).
//!
//! Path segments:
//! - a literal segment matches itself
//! - `{name}` matches exactly one non-empty segment
//! - `{name...}` matches the remainder of the path and must be last
//! - `{$}` matches only a trailing separator and must be last
//! - a trailing `/` turns the pattern into a subtree, it matches the prefix and everything below

use crate::error::PatternError;
use http::Method;
use std::collections::HashSet;
use std::fmt;

const SEPARATORS: &[char] = &[' ', '\t'];

/// Splits a raw pattern into its method token and the remaining host/path pattern.
///
/// Any run of spaces or tabs after the method is skipped. When there is no whitespace at all
/// the method is empty and the whole input is the host/path pattern.
pub fn split_method_and_pattern(pattern: &str) -> (&str, &str) {
    match pattern.find(SEPARATORS) {
        Some(index) => (&pattern[..index], pattern[index + 1..].trim_start_matches(SEPARATORS)),
        None => ("", pattern),
    }
}

/// Inverse of [`split_method_and_pattern`].
pub fn join_method_and_pattern(method: &str, pattern: &str) -> String {
    if method.is_empty() { pattern.to_string() } else { format!("{method} {pattern}") }
}

/// One parsed path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    /// `{name}`
    Single(String),
    /// `{name...}`, or an anonymous one from a trailing `/`
    Rest(Option<String>),
    /// `{$}`
    End,
}

/// How two patterns relate in terms of the requests they match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relationship {
    Equivalent,
    MoreGeneral,
    MoreSpecific,
    Disjoint,
    Overlaps,
}

impl Relationship {
    fn inverse(self) -> Self {
        match self {
            Relationship::MoreGeneral => Relationship::MoreSpecific,
            Relationship::MoreSpecific => Relationship::MoreGeneral,
            other => other,
        }
    }

    fn combine(self, other: Relationship) -> Relationship {
        match self {
            Relationship::Equivalent => other,
            Relationship::Disjoint => Relationship::Disjoint,
            Relationship::Overlaps => {
                if other == Relationship::Disjoint {
                    Relationship::Disjoint
                } else {
                    Relationship::Overlaps
                }
            }
            Relationship::MoreGeneral | Relationship::MoreSpecific => {
                if other == Relationship::Equivalent {
                    self
                } else if other == self.inverse() {
                    Relationship::Overlaps
                } else {
                    other
                }
            }
        }
    }
}

/// A parsed registration pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    method: Option<Method>,
    host: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }

        let (method, rest) = split_method_and_pattern(raw);
        let method = if method.is_empty() {
            None
        } else {
            Some(Method::from_bytes(method.as_bytes()).map_err(|_e| PatternError::InvalidMethod(method.to_string()))?)
        };

        let slash = rest.find('/').ok_or(PatternError::MissingSlash)?;
        let (host, mut rest) = rest.split_at(slash);
        if host.contains('{') {
            return Err(PatternError::BraceInHost);
        }

        let mut segments = Vec::new();
        let mut seen_names = HashSet::new();

        while let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
            if rest.is_empty() {
                segments.push(Segment::Rest(None));
                break;
            }

            let end = rest.find('/').unwrap_or(rest.len());
            let (segment, tail) = rest.split_at(end);
            rest = tail;

            let Some(brace) = segment.find('{') else {
                segments.push(Segment::Literal(segment.to_string()));
                continue;
            };

            if brace != 0 || !segment.ends_with('}') {
                return Err(PatternError::BadWildcard(segment.to_string()));
            }

            let name = &segment[1..segment.len() - 1];
            if name == "$" {
                if !rest.is_empty() {
                    return Err(PatternError::EndNotAtEnd);
                }
                segments.push(Segment::End);
                break;
            }

            let (name, rest_wildcard) = match name.strip_suffix("...") {
                Some(name) => (name, true),
                None => (name, false),
            };
            if rest_wildcard && !rest.is_empty() {
                return Err(PatternError::RestNotAtEnd);
            }
            if name.is_empty() {
                return Err(PatternError::EmptyWildcard);
            }
            if !is_valid_wildcard_name(name) {
                return Err(PatternError::InvalidWildcardName(name.to_string()));
            }
            if !seen_names.insert(name) {
                return Err(PatternError::DuplicateWildcard(name.to_string()));
            }

            if rest_wildcard {
                segments.push(Segment::Rest(Some(name.to_string())));
            } else {
                segments.push(Segment::Single(name.to_string()));
            }
        }

        Ok(Self { raw: raw.to_string(), method, host: host.to_string(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// True when the pattern ends in a rest-of-path wildcard, i.e. it matches a whole subtree.
    pub fn is_subtree(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Rest(_)))
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Two patterns on the same host conflict when neither takes precedence over the other.
    pub(crate) fn conflicts_with(&self, other: &Pattern) -> bool {
        if self.host != other.host {
            return false;
        }
        matches!(self.compare_methods_and_paths(other), Relationship::Equivalent | Relationship::Overlaps)
    }

    pub(crate) fn compare_methods_and_paths(&self, other: &Pattern) -> Relationship {
        let methods = self.compare_methods(other);
        if methods == Relationship::Disjoint {
            return Relationship::Disjoint;
        }
        methods.combine(self.compare_paths(other))
    }

    fn compare_methods(&self, other: &Pattern) -> Relationship {
        match (&self.method, &other.method) {
            (a, b) if a == b => Relationship::Equivalent,
            (None, _) => Relationship::MoreGeneral,
            (_, None) => Relationship::MoreSpecific,
            (Some(a), Some(b)) if *a == Method::GET && *b == Method::HEAD => Relationship::MoreGeneral,
            (Some(a), Some(b)) if *a == Method::HEAD && *b == Method::GET => Relationship::MoreSpecific,
            _ => Relationship::Disjoint,
        }
    }

    pub(crate) fn compare_paths(&self, other: &Pattern) -> Relationship {
        // without a trailing rest wildcard a pattern only matches paths with its own segment count
        if self.segments.len() != other.segments.len() && !self.is_subtree() && !other.is_subtree() {
            return Relationship::Disjoint;
        }

        let mut relationship = Relationship::Equivalent;
        for (a, b) in self.segments.iter().zip(&other.segments) {
            relationship = relationship.combine(compare_segments(a, b));
            if relationship == Relationship::Disjoint {
                return relationship;
            }
        }

        match self.segments.len().cmp(&other.segments.len()) {
            std::cmp::Ordering::Equal => relationship,
            std::cmp::Ordering::Less if self.is_subtree() => relationship.combine(Relationship::MoreGeneral),
            std::cmp::Ordering::Greater if other.is_subtree() => relationship.combine(Relationship::MoreSpecific),
            _ => Relationship::Disjoint,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn compare_segments(a: &Segment, b: &Segment) -> Relationship {
    match (a, b) {
        (Segment::Rest(_), Segment::Rest(_)) | (Segment::Single(_), Segment::Single(_)) | (Segment::End, Segment::End) => {
            Relationship::Equivalent
        }
        (Segment::Rest(_), _) => Relationship::MoreGeneral,
        (_, Segment::Rest(_)) => Relationship::MoreSpecific,
        // a single wildcard never matches the trailing separator
        (Segment::Single(_), Segment::End) | (Segment::End, Segment::Single(_)) => Relationship::Disjoint,
        (Segment::Single(_), Segment::Literal(_)) => Relationship::MoreGeneral,
        (Segment::Literal(_), Segment::Single(_)) => Relationship::MoreSpecific,
        (Segment::Literal(a), Segment::Literal(b)) if a == b => Relationship::Equivalent,
        _ => Relationship::Disjoint,
    }
}

fn is_valid_wildcard_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
