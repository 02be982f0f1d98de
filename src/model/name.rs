//! Package-name validity rules.
//!
//! A name must survive URL component encoding unchanged, must not be
//! mistaken for a hidden file or a reserved path, and must begin with an
//! ASCII letter or digit. Names are trimmed before checking.

/// Characters that are never allowed anywhere in a package name.
const FORBIDDEN: &[char] = &[
    '/', '(', ')', '&', '?', '#', '|', '<', '>', '@', ':', '%', '\\', '*', '\'', '"', '!', '~',
    '`',
];

/// Names that collide with paths the registry serves itself.
const RESERVED: &[&str] = &["node_modules", "favicon.ico"];

/// Returns `true` if `name` is an acceptable package name.
#[must_use]
pub fn is_valid_package_name(name: &str) -> bool {
    let n = name.trim();

    let Some(first) = n.chars().next() else {
        return false;
    };
    if first == '.' || !first.is_ascii_alphanumeric() {
        return false;
    }
    if n.chars().any(|c| c.is_whitespace() || FORBIDDEN.contains(&c)) {
        return false;
    }
    if RESERVED.iter().any(|r| n.eq_ignore_ascii_case(r)) {
        return false;
    }
    n.chars().all(is_uri_component_safe)
}

/// Characters `encodeURIComponent` leaves untouched.
const fn is_uri_component_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
}
