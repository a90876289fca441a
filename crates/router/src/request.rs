//! Request-scoped routing data.
//!
//! When the mux selects a handler it stores two extensions on the request:
//! - [`PathParams`]: the values captured by the wildcards of the matched pattern
//! - [`MatchedPattern`]: the text of the matched pattern
//!
//! A nested router replaces both with its own match, so a handler always sees the values of the
//! innermost pattern, which carries the full path including the prefixes of its parents.

use crate::handler::Request;

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// For example, matching "/users/{id}" against "/users/42" yields the parameter `id = 42`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl From<Vec<(String, String)>> for PathParams {
    fn from(params: Vec<(String, String)>) -> Self {
        Self { params }
    }
}

/// The registration pattern that selected the current handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPattern(pub String);

impl MatchedPattern {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Accessors for the routing extensions of a [`Request`].
pub trait RequestExt {
    /// Returns the value of the wildcard `name` of the matched pattern.
    fn path_value(&self, name: &str) -> Option<&str>;

    /// Returns all captured wildcard values, empty before a pattern has matched.
    fn path_params(&self) -> &PathParams;

    /// Returns the matched pattern, if any pattern has matched yet.
    fn matched_pattern(&self) -> Option<&str>;
}

static EMPTY_PARAMS: PathParams = PathParams { params: Vec::new() };

impl RequestExt for Request {
    fn path_value(&self, name: &str) -> Option<&str> {
        self.path_params().get(name)
    }

    fn path_params(&self) -> &PathParams {
        self.extensions().get::<PathParams>().unwrap_or(&EMPTY_PARAMS)
    }

    fn matched_pattern(&self) -> Option<&str> {
        self.extensions().get::<MatchedPattern>().map(MatchedPattern::as_str)
    }
}
