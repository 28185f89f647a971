//! In-memory HTTP message.
//!
//! [`HttpMessage`] owns copies of everything it holds. It is populated either by
//! [`MessageBuilder`][crate::simple::MessageBuilder] from reader events, or directly by a caller
//! preparing a message for [`write`][crate::write].
use bytes::BytesMut;

use crate::error::Error;
use crate::headers::{HeaderSet, trim};
use crate::http::{Method, Version};

mod codec;
mod query;
mod uri;

pub use codec::TextCodec;
pub use query::{add_query_string, encode_uri, parse_query, percent_decode, percent_encode};
pub use uri::{UriParts, parse_host};

/// Message kind, decided by the start line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MessageKind {
    #[default]
    Unknown,
    Request,
    Response,
}

/// One chunk of a chunked body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkRecord {
    body: BytesMut,
    body_length_declared: Option<u64>,
    body_length_seen: u64,
    extensions: HeaderSet,
}

impl ChunkRecord {
    pub fn new(declared: Option<u64>) -> Self {
        Self { body_length_declared: declared, ..Default::default() }
    }

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[inline]
    pub fn body_length_declared(&self) -> Option<u64> {
        self.body_length_declared
    }

    #[inline]
    pub fn set_body_length_declared(&mut self, len: Option<u64>) {
        self.body_length_declared = len;
    }

    #[inline]
    pub fn body_length_seen(&self) -> u64 {
        self.body_length_seen
    }

    #[inline]
    pub fn extensions(&self) -> &HeaderSet {
        &self.extensions
    }

    pub fn add_extension(&mut self, key: &str, value: &str) {
        self.extensions.insert(key, value);
    }

    pub fn body_append(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
        self.body_length_seen += data.len() as u64;
    }
}

/// Pending HTTP/2 upgrade request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upgrade {
    pub secure: bool,
    pub settings_payload: String,
}

/// HTTP request or response.
#[derive(Clone, Default)]
pub struct HttpMessage {
    kind: MessageKind,
    version: Option<Version>,

    // request line
    method: Option<Method>,
    uri: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    query_string: Option<String>,
    query_args: HeaderSet,

    // status line
    status_code: u32,
    reason_phrase: Option<String>,

    headers: HeaderSet,
    headers_complete: bool,
    set_cookies: Vec<String>,
    content_type: Option<String>,
    charset: Option<String>,
    text_codec: TextCodec,
    body_is_form_data: bool,
    trailers: HeaderSet,
    want_upgrade: Option<Upgrade>,

    body: BytesMut,
    body_form_data: Option<HeaderSet>,
    body_length_declared: Option<u64>,
    body_length_seen: u64,
    is_chunked: bool,
    chunks: Vec<ChunkRecord>,
}

impl HttpMessage {
    /// Create empty message of unknown kind.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty request.
    pub fn request(method: Method, uri: &str) -> Result<Self, Error> {
        let mut msg = Self::new();
        msg.kind = MessageKind::Request;
        msg.method = Some(method);
        msg.version = Some(Version::Http11);
        msg.set_uri(uri)?;
        Ok(msg)
    }

    /// Create an empty response.
    pub fn response(status_code: u32, reason: &str) -> Self {
        let mut msg = Self::new();
        msg.kind = MessageKind::Response;
        msg.version = Some(Version::Http11);
        msg.status_code = status_code;
        msg.set_reason_phrase(reason);
        msg
    }

    // ===== Start Line =====

    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    #[inline]
    pub fn set_kind(&mut self, kind: MessageKind) {
        self.kind = kind;
    }

    #[inline]
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    #[inline]
    pub fn set_version(&mut self, version: Version) {
        self.version = Some(version);
    }

    #[inline]
    pub fn method(&self) -> Option<Method> {
        self.method
    }

    #[inline]
    pub fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    #[inline]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Set the request target, deriving host, port, path, query string, and query args.
    ///
    /// On error the message is left unchanged.
    pub fn set_uri(&mut self, uri: &str) -> Result<(), Error> {
        let parts = UriParts::parse(uri)?;
        self.host = parts.host.map(str::to_owned);
        self.port = parts.port;
        self.path = parts.path.map(str::to_owned);
        self.query_string = parts.query.map(str::to_owned);
        self.query_args = parts.query.map(parse_query).unwrap_or_default();
        self.uri = Some(uri.to_owned());
        Ok(())
    }

    #[inline]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    #[inline]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[inline]
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    #[inline]
    pub fn query_args(&self) -> &HeaderSet {
        &self.query_args
    }

    /// Fill host and port from the `Host` header where the uri did not carry them.
    pub fn apply_host_header(&mut self) {
        if self.host.is_some() && self.port.is_some() {
            return;
        }
        let Some((host, port)) = self.headers.get("host").and_then(parse_host) else {
            return;
        };
        if self.host.is_none() {
            self.host = Some(host.to_owned());
        }
        if self.port.is_none() {
            self.port = port;
        }
    }

    #[inline]
    pub fn status_code(&self) -> u32 {
        self.status_code
    }

    #[inline]
    pub fn set_status_code(&mut self, code: u32) {
        self.status_code = code;
    }

    #[inline]
    pub fn reason_phrase(&self) -> Option<&str> {
        self.reason_phrase.as_deref()
    }

    pub fn set_reason_phrase(&mut self, reason: &str) {
        self.reason_phrase = (!reason.is_empty()).then(|| reason.to_owned());
    }

    // ===== Headers =====

    #[inline]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// All values of `key` joined with `", "`.
    pub fn header(&self, key: &str) -> Option<String> {
        self.headers.joined(key)
    }

    /// Replace `key` with a single `value`.
    ///
    /// `Set-Cookie` is appended to the cookie list instead.
    pub fn set_header(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("set-cookie") {
            self.set_cookies.push(value.to_owned());
            return;
        }
        self.headers.set(key, value);
        self.update_derived(key);
    }

    /// Append `value` to `key`.
    ///
    /// `Set-Cookie` is appended to the cookie list instead.
    pub fn add_header(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("set-cookie") {
            self.set_cookies.push(value.to_owned());
            return;
        }
        self.headers.insert(key, value);
        self.update_derived(key);
    }

    pub fn remove_header(&mut self, key: &str) -> bool {
        let removed = self.headers.remove(key);
        self.update_derived(key);
        removed
    }

    /// Take headers from `headers`.
    ///
    /// With `merge`, values are unioned into the current headers per key. Otherwise the current
    /// headers are replaced.
    pub fn set_headers(&mut self, headers: &HeaderSet, merge: bool) {
        if !merge {
            self.headers.clear();
            self.set_cookies.clear();
            self.reset_derived();
        }
        for (key, value) in headers.pairs() {
            if key.eq_ignore_ascii_case("set-cookie") {
                if !self.set_cookies.iter().any(|c| c == value) {
                    self.set_cookies.push(value.to_owned());
                }
                continue;
            }
            self.headers.insert_unique(key, value);
            self.update_derived(key);
        }
    }

    #[inline]
    pub fn headers_complete(&self) -> bool {
        self.headers_complete
    }

    #[inline]
    pub fn set_headers_complete(&mut self, complete: bool) {
        self.headers_complete = complete;
    }

    #[inline]
    pub fn set_cookie_values(&self) -> &[String] {
        &self.set_cookies
    }

    pub fn add_set_cookie(&mut self, value: &str) {
        self.set_cookies.push(value.to_owned());
    }

    pub fn remove_set_cookie(&mut self, idx: usize) -> Option<String> {
        (idx < self.set_cookies.len()).then(|| self.set_cookies.remove(idx))
    }

    #[inline]
    pub fn trailers(&self) -> &HeaderSet {
        &self.trailers
    }

    pub fn add_trailer(&mut self, key: &str, value: &str) {
        self.trailers.insert(key, value);
    }

    // ===== Derived Header State =====

    fn reset_derived(&mut self) {
        self.content_type = None;
        self.charset = None;
        self.text_codec = TextCodec::Unknown;
        self.body_is_form_data = false;
        self.body_length_declared = None;
        self.is_chunked = false;
    }

    fn update_derived(&mut self, key: &str) {
        if key.eq_ignore_ascii_case("content-type") {
            self.update_content_type();
        } else if key.eq_ignore_ascii_case("content-length") {
            self.body_length_declared = self
                .headers
                .get("content-length")
                .and_then(|v| trim(v).parse().ok());
        } else if key.eq_ignore_ascii_case("transfer-encoding") {
            self.is_chunked = self
                .headers
                .get_all("transfer-encoding")
                .any(|v| trim(v).to_ascii_lowercase().starts_with("chunked"));
        }
    }

    fn update_content_type(&mut self) {
        self.content_type = None;
        self.charset = None;
        self.text_codec = TextCodec::Unknown;
        self.body_is_form_data = false;

        let Some(value) = self.headers.get("content-type") else {
            return;
        };
        let mut params = value.split(';').map(trim);
        let media = params.next().unwrap_or_default();
        if !media.is_empty() {
            self.body_is_form_data = media.eq_ignore_ascii_case("application/x-www-form-urlencoded");
            self.content_type = Some(media.to_owned());
        }
        for param in params {
            if let Some((name, value)) = param.split_once('=') {
                if trim(name).eq_ignore_ascii_case("charset") {
                    let label = trim(value).trim_matches('"').to_ascii_lowercase();
                    self.text_codec = TextCodec::from_label(&label);
                    self.charset = Some(label);
                }
            }
        }
    }

    /// Media type of `Content-Type` without parameters.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[inline]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    #[inline]
    pub fn text_codec(&self) -> TextCodec {
        self.text_codec
    }

    #[inline]
    pub fn body_is_form_data(&self) -> bool {
        self.body_is_form_data
    }

    /// Set the media type, keeping the current charset.
    pub fn set_content_type(&mut self, media: &str) {
        self.rewrite_content_type(Some(media), self.charset.clone().as_deref());
    }

    /// Set the charset parameter of `Content-Type`, keeping the current media type.
    pub fn set_charset(&mut self, charset: &str) {
        self.rewrite_content_type(self.content_type.clone().as_deref(), Some(charset));
    }

    fn rewrite_content_type(&mut self, media: Option<&str>, charset: Option<&str>) {
        let value = match (media, charset) {
            (Some(media), Some(charset)) => format!("{media}; charset={charset}"),
            (Some(media), None) => media.to_owned(),
            (None, Some(charset)) => format!("charset={charset}"),
            (None, None) => {
                self.remove_header("content-type");
                return;
            }
        };
        self.set_header("Content-Type", &value);
    }

    /// Returns `true` if the connection stays open after this message.
    ///
    /// HTTP/1.1 is persistent unless `Connection: close`, HTTP/1.0 only with
    /// `Connection: keep-alive`.
    pub fn persistent_conn(&self) -> bool {
        let has = |token: &str| {
            self.headers
                .get_all("connection")
                .flat_map(|v| v.split(','))
                .any(|v| trim(v).eq_ignore_ascii_case(token))
        };
        match self.version {
            Some(Version::Http11) | None => !has("close"),
            Some(Version::Http10) => has("keep-alive"),
        }
    }

    /// Write or remove `Connection: keep-alive`.
    ///
    /// Ignored while an upgrade is requested.
    pub fn set_persistent_conn(&mut self, persist: bool) {
        if self.want_upgrade.is_some() {
            return;
        }
        self.headers.remove("connection");
        if persist {
            self.headers.insert("Connection", "keep-alive");
        }
    }

    #[inline]
    pub fn want_upgrade(&self) -> Option<&Upgrade> {
        self.want_upgrade.as_ref()
    }

    /// Request or cancel an HTTP/2 upgrade.
    ///
    /// Requesting an upgrade without a settings payload is ignored.
    pub fn set_want_upgrade(&mut self, want: bool, secure: bool, settings_payload: &str) {
        if want && settings_payload.is_empty() {
            return;
        }
        for key in ["Connection", "Upgrade", "HTTP2-Settings"] {
            self.headers.remove(key);
        }
        self.want_upgrade = None;
        if want {
            self.headers.insert("Connection", "Upgrade, HTTP2-Settings");
            self.headers.insert("Upgrade", if secure { "h2" } else { "h2c" });
            self.headers.insert("HTTP2-Settings", settings_payload);
            self.want_upgrade = Some(Upgrade {
                secure,
                settings_payload: settings_payload.to_owned(),
            });
        }
    }

    // ===== Body =====

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_append(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
        self.body_length_seen += data.len() as u64;
    }

    /// Replace the body, resetting the seen counter to the new length.
    pub fn set_body(&mut self, data: &[u8]) {
        self.body.clear();
        self.body.extend_from_slice(data);
        self.body_length_seen = data.len() as u64;
    }

    /// Form fields decoded from an `application/x-www-form-urlencoded` body.
    #[inline]
    pub fn body_form_data(&self) -> Option<&HeaderSet> {
        self.body_form_data.as_ref()
    }

    #[inline]
    pub fn set_body_form_data(&mut self, form: Option<HeaderSet>) {
        self.body_form_data = form;
    }

    #[inline]
    pub fn body_length_declared(&self) -> Option<u64> {
        self.body_length_declared
    }

    #[inline]
    pub fn body_length_seen(&self) -> u64 {
        self.body_length_seen
    }

    #[inline]
    pub fn is_chunked(&self) -> bool {
        self.is_chunked
    }

    #[inline]
    pub fn chunks(&self) -> &[ChunkRecord] {
        &self.chunks
    }

    /// Chunk record at `idx`, created with its predecessors if missing.
    pub fn chunk_mut(&mut self, idx: usize) -> &mut ChunkRecord {
        if self.chunks.len() <= idx {
            self.chunks.resize_with(idx + 1, ChunkRecord::default);
        }
        &mut self.chunks[idx]
    }
}

impl std::fmt::Debug for HttpMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut f = f.debug_struct("HttpMessage");
        f.field("kind", &self.kind);
        f.field("version", &self.version);
        match self.kind {
            MessageKind::Request => {
                f.field("method", &self.method);
                f.field("uri", &self.uri);
            }
            MessageKind::Response => {
                f.field("status_code", &self.status_code);
                f.field("reason_phrase", &self.reason_phrase);
            }
            MessageKind::Unknown => {}
        }
        f.field("headers", &self.headers);
        f.field("body_len", &self.body.len());
        f.finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_request_uri() {
        let msg = HttpMessage::request(Method::Get, "http://127.0.0.1:8080/index.html?a=1&a=2").unwrap();
        assert_eq!(msg.kind(), MessageKind::Request);
        assert_eq!(msg.host(), Some("127.0.0.1"));
        assert_eq!(msg.port(), Some(8080));
        assert_eq!(msg.path(), Some("/index.html"));
        assert_eq!(msg.query_string(), Some("a=1&a=2"));
        assert_eq!(msg.query_args().get_all("a").collect::<Vec<_>>(), ["1", "2"]);

        let mut msg = msg;
        assert_eq!(msg.set_uri(""), Err(Error::UriInvalid));
        assert_eq!(msg.path(), Some("/index.html"));
    }

    #[test]
    fn test_apply_host_header() {
        let mut msg = HttpMessage::request(Method::Get, "/").unwrap();
        msg.add_header("Host", "http://example.com:8080");
        msg.apply_host_header();
        assert_eq!(msg.host(), Some("example.com"));
        assert_eq!(msg.port(), Some(8080));

        let mut msg = HttpMessage::request(Method::Get, "http://origin/").unwrap();
        msg.add_header("Host", "other:81");
        msg.apply_host_header();
        assert_eq!(msg.host(), Some("origin"));
        assert_eq!(msg.port(), Some(81));

        let mut msg = HttpMessage::request(Method::Get, "/").unwrap();
        msg.add_header("Host", "example.com:port");
        msg.apply_host_header();
        assert_eq!(msg.host(), Some("example.com"));
        assert_eq!(msg.port(), None);
    }

    #[test]
    fn test_content_type() {
        let mut msg = HttpMessage::response(200, "OK");
        msg.set_header("Content-Type", "text/plain; charset=ISO-8859-1");
        assert_eq!(msg.content_type(), Some("text/plain"));
        assert_eq!(msg.charset(), Some("iso-8859-1"));
        assert_eq!(msg.text_codec(), TextCodec::Iso8859_1);
        assert!(!msg.body_is_form_data());

        msg.set_charset("utf-8");
        assert_eq!(msg.header("content-type").as_deref(), Some("text/plain; charset=utf-8"));
        assert_eq!(msg.text_codec(), TextCodec::Utf8);

        msg.set_header("content-type", "application/x-www-form-urlencoded");
        assert!(msg.body_is_form_data());
        assert_eq!(msg.charset(), None);
    }

    #[test]
    fn test_headers() {
        let mut msg = HttpMessage::response(200, "OK");
        msg.add_header("Accept", "text/html");
        msg.add_header("accept", "text/plain");
        msg.add_header("Set-Cookie", "a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT");
        msg.add_header("Content-Length", "12");
        msg.add_header("Transfer-Encoding", "chunked");

        assert_eq!(msg.header("ACCEPT").as_deref(), Some("text/html, text/plain"));
        assert!(!msg.headers().contains("set-cookie"));
        assert_eq!(msg.set_cookie_values(), ["a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT"]);
        assert_eq!(msg.body_length_declared(), Some(12));
        assert!(msg.is_chunked());

        let other: HeaderSet = [("Accept", "text/plain"), ("Accept", "*/*")].into_iter().collect();
        msg.set_headers(&other, true);
        assert_eq!(msg.header("accept").as_deref(), Some("text/html, text/plain, */*"));

        msg.set_headers(&other, false);
        assert_eq!(msg.headers().len(), 1);
        assert_eq!(msg.body_length_declared(), None);
        assert!(!msg.is_chunked());
        assert!(msg.set_cookie_values().is_empty());
    }

    #[test]
    fn test_persistent_conn() {
        let mut msg = HttpMessage::request(Method::Get, "/").unwrap();
        assert!(msg.persistent_conn());
        msg.add_header("Connection", "close");
        assert!(!msg.persistent_conn());

        msg.set_version(Version::Http10);
        msg.set_persistent_conn(true);
        assert!(msg.persistent_conn());
        assert_eq!(msg.header("connection").as_deref(), Some("keep-alive"));

        msg.set_want_upgrade(true, false, "AAMAAABkAAQAAP__");
        assert_eq!(msg.header("upgrade").as_deref(), Some("h2c"));
        assert_eq!(msg.header("connection").as_deref(), Some("Upgrade, HTTP2-Settings"));
        msg.set_persistent_conn(false);
        assert!(msg.want_upgrade().is_some());
        assert_eq!(msg.header("connection").as_deref(), Some("Upgrade, HTTP2-Settings"));

        msg.set_want_upgrade(false, false, "");
        assert!(msg.want_upgrade().is_none());
        assert!(!msg.headers().contains("upgrade"));
    }

    #[test]
    fn test_chunks() {
        let mut msg = HttpMessage::new();
        msg.chunk_mut(1).body_append(b"abc");
        assert_eq!(msg.chunks().len(), 2);
        assert_eq!(msg.chunks()[1].body(), b"abc");
        assert_eq!(msg.chunks()[1].body_length_seen(), 3);
    }
}
