/// HTTP request method.
///
/// The nine methods of [RFC9110] plus PATCH from [RFC5789]. A request line carrying any other
/// token is rejected by the reader.
///
/// [RFC5789]: https://www.rfc-editor.org/rfc/rfc5789
/// [RFC9110]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-methods>
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

methods! {
    Get = b"GET", no_body;
    Head = b"HEAD", no_body;
    Post = b"POST", ;
    Put = b"PUT", ;
    Delete = b"DELETE", no_body;
    Connect = b"CONNECT", ;
    Options = b"OPTIONS", ;
    Trace = b"TRACE", no_body;
    Patch = b"PATCH", ;
}

impl std::str::FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes()).ok_or(UnknownMethod)
    }
}

impl std::fmt::Debug for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Error =====

/// Method token is not one of the supported methods.
#[derive(Debug)]
pub struct UnknownMethod;

impl std::error::Error for UnknownMethod { }

impl std::fmt::Display for UnknownMethod {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unknown method")
    }
}

// ===== Macros =====

macro_rules! methods {
    ($($name:ident = $val:literal, $($no_body:ident)?;)*) => {
        impl Method {
            /// Parse a method token, case-sensitive.
            pub const fn from_bytes(src: &[u8]) -> Option<Method> {
                match src {
                    $(
                        $val => Some(Self::$name),
                    )*
                    _ => None,
                }
            }

            /// Returns string representation of the method.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(
                        // SAFETY: method literals are ASCII
                        Self::$name => unsafe { str::from_utf8_unchecked($val) },
                    )*
                }
            }

            /// Returns `true` if a request with this method carries no body unless it declares
            /// one explicitly.
            pub const fn is_no_body(&self) -> bool {
                match self {
                    $(
                        Self::$name => no_body!($($no_body)?),
                    )*
                }
            }
        }
    };
}

macro_rules! no_body {
    (no_body) => { true };
    () => { false };
}

use {methods, no_body};

#[cfg(test)]
mod test {
    use super::Method;

    #[test]
    fn test_method() {
        assert_eq!(Method::from_bytes(b"GET"), Some(Method::Get));
        assert_eq!(Method::from_bytes(b"PATCH"), Some(Method::Patch));
        assert_eq!(Method::from_bytes(b"get"), None);
        assert_eq!(Method::from_bytes(b"PRI"), None);
        assert_eq!(Method::Options.as_str(), "OPTIONS");
        assert!(Method::Head.is_no_body());
        assert!(Method::Trace.is_no_body());
        assert!(!Method::Post.is_no_body());
        assert!("FOO".parse::<Method>().is_err());
    }
}
