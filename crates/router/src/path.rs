//! Path helpers shared by registration and dispatch.

/// Concatenates a router prefix with a child pattern and collapses doubled separators.
///
/// The collapse is a single left-to-right pass, so three consecutive separators become two.
pub fn join_prefix_and_pattern(prefix: &str, pattern: &str) -> String {
    let full_path = format!("{prefix}{pattern}");
    full_path.replace("//", "/")
}

/// Returns the canonical form of a request path.
///
/// `.` and `..` elements are resolved, repeated separators are collapsed and a trailing
/// separator is preserved. An empty path cleans to `/`.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".into();
    }

    let mut stack: Vec<&str> = Vec::new();
    for element in path.split('/') {
        match element {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            element => stack.push(element),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for element in &stack {
        cleaned.push('/');
        cleaned.push_str(element);
    }

    if cleaned.is_empty() || path.ends_with('/') {
        cleaned.push('/');
    }
    cleaned
}

/// Removes the `:port` suffix of a request host, unwrapping bracketed IPv6 literals.
pub fn strip_host_port(host: &str) -> &str {
    if !host.contains(':') {
        return host;
    }

    if let Some(bracketed) = host.strip_prefix('[') {
        return bracketed.split_once(']').map_or(host, |(address, _)| address);
    }

    host.rsplit_once(':').map_or(host, |(name, _)| name)
}
