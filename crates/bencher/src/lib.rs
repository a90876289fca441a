#[derive(Debug, Copy, Clone)]
pub struct DispatchCase {
    name: &'static str,
    group: CaseGroup,
    method: &'static str,
    uri: &'static str,
}

impl DispatchCase {
    pub const fn new(name: &'static str, group: CaseGroup, method: &'static str, uri: &'static str) -> Self {
        Self { name, group, method, uri }
    }

    pub const fn matched(name: &'static str, method: &'static str, uri: &'static str) -> Self {
        Self::new(name, CaseGroup::Matched, method, uri)
    }

    pub const fn unmatched(name: &'static str, method: &'static str, uri: &'static str) -> Self {
        Self::new(name, CaseGroup::Unmatched, method, uri)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> CaseGroup {
        self.group
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn uri(&self) -> &'static str {
        self.uri
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseGroup {
    /// a handler is selected
    Matched,
    /// answered by the router itself: redirect, not found or method not allowed
    Unmatched,
}

impl CaseGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseGroup::Matched => "matched",
            CaseGroup::Unmatched => "unmatched",
        }
    }
}
