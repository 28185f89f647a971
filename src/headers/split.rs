/// Headers whose value carries commas that are not list separators.
const NOSPLIT: [&str; 5] = [
    "WWW-Authenticate",
    "Proxy-Authorization",
    "Content-Type",
    "Date",
    "Set-Cookie",
];

/// Returns `true` if the value of `key` must not be split on commas.
pub fn is_nosplit(key: &str) -> bool {
    NOSPLIT.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Trim leading and trailing SP and HTAB.
pub fn trim(value: &str) -> &str {
    value.trim_matches([' ', '\t'])
}

/// Split a comma separated header value into trimmed, non-empty elements.
///
/// An empty or all-separator value yields a single empty element, so a header line always
/// produces at least one logical occurrence.
pub fn split_value(value: &str) -> impl Iterator<Item = &str> {
    let mut parts = value.split(',').map(trim).filter(|s| !s.is_empty()).peekable();
    let empty = parts.peek().is_none();
    empty.then_some("").into_iter().chain(parts)
}
