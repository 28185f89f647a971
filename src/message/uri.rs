use crate::error::Error;

/// Request target split into the parts the message model keeps.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UriParts<'a> {
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub path: Option<&'a str>,
    pub query: Option<&'a str>,
}

impl<'a> UriParts<'a> {
    /// Split a request target.
    ///
    /// Accepts origin form (`/path?query`), absolute form (`scheme://host[:port]/path?query`),
    /// authority form (`host:port`), and asterisk form (`*`). Fragments are dropped.
    pub fn parse(uri: &'a str) -> Result<UriParts<'a>, Error> {
        if uri.is_empty() || !uri.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(Error::UriInvalid);
        }

        let uri = uri.split_once('#').map_or(uri, |(u, _)| u);

        if uri == "*" {
            return Ok(UriParts { path: Some(uri), ..Default::default() });
        }

        if uri.starts_with('/') {
            return Ok(Self::path_and_query(uri));
        }

        match uri.split_once("://") {
            Some((scheme, rest)) => {
                if scheme.is_empty() {
                    return Err(Error::UriInvalid);
                }
                let end = rest.find(['/', '?']).unwrap_or(rest.len());
                let (authority, rest) = rest.split_at(end);
                let (host, port) = parse_authority(authority)?;
                let mut parts = Self::path_and_query(rest);
                parts.host = Some(host);
                parts.port = port;
                if parts.path.is_some_and(str::is_empty) {
                    parts.path = Some("/");
                }
                Ok(parts)
            }
            None => {
                let (host, port) = parse_authority(uri)?;
                Ok(UriParts { host: Some(host), port, ..Default::default() })
            }
        }
    }

    fn path_and_query(s: &'a str) -> UriParts<'a> {
        let (path, query) = match s.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (s, None),
        };
        UriParts { path: Some(path), query, ..Default::default() }
    }
}

/// Split `[userinfo@]host[:port]`.
fn parse_authority(authority: &str) -> Result<(&str, Option<u16>), Error> {
    let authority = authority.rsplit_once('@').map_or(authority, |(_, a)| a);
    let (host, port) = split_host_port(authority);
    if host.is_empty() {
        return Err(Error::UriInvalid);
    }
    match port {
        Some(port) => match port.parse() {
            Ok(port) => Ok((host, Some(port))),
            Err(_) => Err(Error::UriInvalid),
        },
        None => Ok((host, None)),
    }
}

fn split_host_port(s: &str) -> (&str, Option<&str>) {
    // bracketed IPv6 literal
    if s.starts_with('[') {
        if let Some(end) = s.find(']') {
            let (host, rest) = s.split_at(end + 1);
            return (host, rest.strip_prefix(':'));
        }
    }
    match s.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (s, None),
    }
}

/// Parse a `Host` header value, tolerating a `scheme://` prefix.
///
/// A port that is not a valid number is dropped while the host is kept.
pub fn parse_host(value: &str) -> Option<(&str, Option<u16>)> {
    let value = value.split_once("://").map_or(value, |(_, rest)| rest);
    let value = value.split(['/', '?']).next().unwrap_or(value);
    if value.is_empty() {
        return None;
    }
    let (host, port) = split_host_port(value);
    Some((host, port.and_then(|p| p.parse().ok())))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_uri_parts() {
        macro_rules! test {
            ($uri:literal => $host:expr, $port:expr, $path:expr, $query:expr) => {
                assert_eq!(
                    UriParts::parse($uri),
                    Ok(UriParts { host: $host, port: $port, path: $path, query: $query }),
                    "{}", $uri
                );
            };
        }

        test!("/a" => None, None, Some("/a"), None);
        test!("/login?user=a&pw=b" => None, None, Some("/login"), Some("user=a&pw=b"));
        test!("https://www.google.com/index.html" => Some("www.google.com"), None, Some("/index.html"), None);
        test!("http://127.0.0.1:8080/x?y#frag" => Some("127.0.0.1"), Some(8080), Some("/x"), Some("y"));
        test!("http://host" => Some("host"), None, Some("/"), None);
        test!("example.com:443" => Some("example.com"), Some(443), None, None);
        test!("http://[::1]:80/" => Some("[::1]"), Some(80), Some("/"), None);
        test!("*" => None, None, Some("*"), None);

        assert_eq!(UriParts::parse(""), Err(Error::UriInvalid));
        assert_eq!(UriParts::parse("/a b"), Err(Error::UriInvalid));
        assert_eq!(UriParts::parse("http://host:port/"), Err(Error::UriInvalid));
        assert_eq!(UriParts::parse("://x"), Err(Error::UriInvalid));
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(parse_host("127.0.0.1"), Some(("127.0.0.1", None)));
        assert_eq!(parse_host("example.com:8443"), Some(("example.com", Some(8443))));
        assert_eq!(parse_host("https://example.com:x"), Some(("example.com", None)));
        assert_eq!(parse_host(""), None);
    }
}
