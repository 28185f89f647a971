//! Query string and percent coding.
use std::borrow::Cow;

use crate::headers::HeaderSet;

/// Parse a query string into a multi-value set.
///
/// Pairs are `&` separated, a key without `=` gets an empty value, keys and values are percent
/// decoded with `+` as space. Pairs with an empty key are skipped.
pub fn parse_query(query: &str) -> HeaderSet {
    let mut args = HeaderSet::new();
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }
        args.insert(&percent_decode(key, true), percent_decode(value, true));
    }
    args
}

/// Append `params` to `uri` as an encoded query string.
///
/// Spaces become `+` when `use_plus` is set, `%20` otherwise. Parameters with an empty value are
/// left out. `uri` may be empty to build only the `?...` part.
pub fn add_query_string(uri: &str, params: &HeaderSet, use_plus: bool) -> String {
    let mut out = String::from(uri);
    let mut sep = if uri.contains('?') { '&' } else { '?' };

    for (key, value) in params.pairs() {
        if value.is_empty() {
            continue;
        }
        out.push(sep);
        out.push_str(&percent_encode(key, use_plus));
        out.push('=');
        out.push_str(&percent_encode(value, use_plus));
        sep = '&';
    }
    out
}

/// Decode `%XX` sequences, and `+` as space when `plus_space` is set.
///
/// Invalid or truncated escapes are kept as-is.
pub fn percent_decode(s: &str, plus_space: bool) -> Cow<'_, str> {
    if !s.contains('%') && !(plus_space && s.contains('+')) {
        return Cow::Borrowed(s);
    }

    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        result.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        result.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_space => {
                result.push(b' ');
                i += 1;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    Cow::Owned(String::from_utf8_lossy(&result).into_owned())
}

/// Encode everything but unreserved characters (`A-Z a-z 0-9 - . _ ~`).
pub fn percent_encode(s: &str, use_plus: bool) -> Cow<'_, str> {
    if s.bytes().all(is_unreserved) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        match b {
            b' ' if use_plus => out.push('+'),
            b if is_unreserved(b) => out.push(b as char),
            b => push_escaped(&mut out, b),
        }
    }
    Cow::Owned(out)
}

/// Encode spaces, control characters, and non-ASCII bytes of a request target, leaving its
/// delimiters intact.
pub fn encode_uri(uri: &str) -> Cow<'_, str> {
    if uri.bytes().all(|b| b.is_ascii_graphic()) {
        return Cow::Borrowed(uri);
    }

    let mut out = String::with_capacity(uri.len() * 3);
    for b in uri.bytes() {
        if b.is_ascii_graphic() {
            out.push(b as char);
        } else {
            push_escaped(&mut out, b);
        }
    }
    Cow::Owned(out)
}

fn push_escaped(out: &mut String, b: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.push('%');
    out.push(HEX[(b >> 4) as usize] as char);
    out.push(HEX[(b & 0xf) as usize] as char);
}

const fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_query() {
        let args = parse_query("a=1&b=2&a=3&flag&=skipped&name=John+Doe&x=%2F");
        assert_eq!(args.get_all("a").collect::<Vec<_>>(), ["1", "3"]);
        assert_eq!(args.get("b"), Some("2"));
        assert_eq!(args.get("flag"), Some(""));
        assert_eq!(args.get("name"), Some("John Doe"));
        assert_eq!(args.get("x"), Some("/"));
        assert_eq!(args.len(), 5);
    }

    #[test]
    fn test_percent_decode() {
        assert!(matches!(percent_decode("hello", true), Cow::Borrowed(_)));
        assert_eq!(percent_decode("hello%20world", false), "hello world");
        assert_eq!(percent_decode("a+b", true), "a b");
        assert_eq!(percent_decode("a+b", false), "a+b");
        assert_eq!(percent_decode("%ZZ", true), "%ZZ");
        assert_eq!(percent_decode("%2", true), "%2");
        assert_eq!(percent_decode("%C3%A9", true), "é");
    }

    #[test]
    fn test_add_query_string() {
        macro_rules! test {
            ($uri:literal, $plus:literal => $expected:literal) => {
                let params: HeaderSet = [
                    ("field 1", "value 1_1"),
                    ("field 1", "value 1_2"),
                    ("f2", "v2"),
                    ("f3", "v3"),
                    ("f4", ""),
                ]
                .into_iter()
                .collect();
                assert_eq!(add_query_string($uri, &params, $plus), $expected);
            };
        }

        test!("", false => "?field%201=value%201_1&field%201=value%201_2&f2=v2&f3=v3");
        test!("", true => "?field+1=value+1_1&field+1=value+1_2&f2=v2&f3=v3");
        test!("/cgi-bin/some_app", false
            => "/cgi-bin/some_app?field%201=value%201_1&field%201=value%201_2&f2=v2&f3=v3");
        test!("/cgi-bin/some_app", true
            => "/cgi-bin/some_app?field+1=value+1_1&field+1=value+1_2&f2=v2&f3=v3");

        assert_eq!(add_query_string("/cgi-bin/some_app", &HeaderSet::new(), true), "/cgi-bin/some_app");
        let params: HeaderSet = [("b", "2")].into_iter().collect();
        assert_eq!(add_query_string("/p?a=1", &params, true), "/p?a=1&b=2");
    }

    #[test]
    fn test_encode_uri() {
        assert!(matches!(encode_uri("/a/b?c=d"), Cow::Borrowed(_)));
        assert_eq!(encode_uri("/my file?q=a b"), "/my%20file?q=a%20b");
        assert_eq!(encode_uri("/caf\u{e9}"), "/caf%C3%A9");
    }
}
