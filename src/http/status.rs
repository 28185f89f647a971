macro_rules! reasons {
    ($($code:literal $msg:literal;)*) => {
        /// Standard reason phrase for `code`.
        ///
        /// Codes without a registered phrase fall back to a phrase naming their class, e.g.
        /// `299` gives `"Success"`.
        pub const fn reason_phrase(code: u32) -> &'static str {
            match code {
                $(
                    $code => $msg,
                )*
                100..=199 => "Informational",
                200..=299 => "Success",
                300..=399 => "Redirect",
                400..=499 => "Client Error",
                500..=599 => "Server Error",
                _ => "Unknown",
            }
        }
    };
}

reasons! {
    100 "Continue";
    101 "Switching Protocols";
    200 "OK";
    201 "Created";
    202 "Accepted";
    203 "Non-Authoritative Information";
    204 "No Content";
    205 "Reset Content";
    206 "Partial Content";
    300 "Multiple Choices";
    301 "Moved Permanently";
    302 "Found";
    303 "See Other";
    304 "Not Modified";
    305 "Use Proxy";
    307 "Temporary Redirect";
    308 "Permanent Redirect";
    400 "Bad Request";
    401 "Unauthorized";
    402 "Payment Required";
    403 "Forbidden";
    404 "Not Found";
    405 "Method Not Allowed";
    406 "Not Acceptable";
    407 "Proxy Authentication Required";
    408 "Request Timeout";
    409 "Conflict";
    410 "Gone";
    411 "Length Required";
    412 "Precondition Failed";
    413 "Content Too Large";
    414 "URI Too Long";
    415 "Unsupported Media Type";
    416 "Range Not Satisfiable";
    417 "Expectation Failed";
    421 "Misdirected Request";
    422 "Unprocessable Content";
    426 "Upgrade Required";
    428 "Precondition Required";
    429 "Too Many Requests";
    431 "Request Header Fields Too Large";
    500 "Internal Server Error";
    501 "Not Implemented";
    502 "Bad Gateway";
    503 "Service Unavailable";
    504 "Gateway Timeout";
    505 "HTTP Version Not Supported";
}

#[cfg(test)]
mod test {
    use super::reason_phrase;

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(299), "Success");
        assert_eq!(reason_phrase(42), "Unknown");
    }
}
