/// HTTP Version.
///
/// [httpwg](https://httpwg.org/specs/rfc9112.html#http.version)
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub enum Version {
    /// `HTTP/1.0`
    Http10,
    /// `HTTP/1.1`
    Http11,
}

impl Version {
    /// Parse the `major.minor` part after `HTTP/`.
    pub const fn from_digits(src: &[u8]) -> Option<Version> {
        match src {
            b"1.0" => Some(Self::Http10),
            b"1.1" => Some(Self::Http11),
            _ => None,
        }
    }

    /// Returns string representation of HTTP version, e.g: `HTTP/1.1`
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Version {
        Version::Http11
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}
