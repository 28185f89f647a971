//! One-shot message reading.
//!
//! [`read`] parses a complete message held in memory into an [`HttpMessage`]. The
//! [`MessageBuilder`] it uses is a plain [`Handler`], so it can also be fed by an
//! [`HttpReader`] driven incrementally, followed by [`decode_body`].
use crate::error::Error;
use crate::message::{HttpMessage, MessageKind, TextCodec, parse_query};
use crate::reader::{DataFormat, Event, Handler, HttpReader, StartLine, Status};

/// Policy for [`read`] and [`MessageBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimpleFlags {
    /// Reject chunk extensions with [`Error::ChunkExtensionNotAllowed`].
    pub fail_extension: bool,
    /// Reject trailers with [`Error::TrailerNotAllowed`].
    pub fail_trailers: bool,
    /// Reject non-chunked messages without `Content-Length` with [`Error::LengthRequired`].
    pub length_required: bool,
    /// Keep the body as received.
    pub no_decode_body: bool,
}

/// Parse one message from `buf`.
///
/// Returns the message and the number of bytes it occupied. Bytes after the message, such as a
/// pipelined request, are left for the caller. A body without framing takes the rest of `buf`.
///
/// # Errors
///
/// Returns [`Error::MoreData`] when `buf` ends before the message does, and
/// [`Error::UnsupportedData`] for multipart bodies.
pub fn read(buf: &[u8], flags: SimpleFlags) -> Result<(HttpMessage, usize), Error> {
    let mut reader = HttpReader::new();
    let mut builder = MessageBuilder::new(flags);

    let progress = reader.read(buf, &mut builder)?;
    if progress.status == Status::MoreData {
        return Err(Error::MoreData);
    }

    let mut msg = builder.into_message();
    if !flags.no_decode_body {
        decode_body(&mut msg)?;
    }
    Ok((msg, progress.consumed))
}

/// Decode a complete body according to its content type.
///
/// Form bodies are parsed into [`body_form_data`][HttpMessage::body_form_data]. Bodies in a
/// known non-UTF-8 charset are transcoded to UTF-8, with the charset and `Content-Length`
/// updated to match. Other bodies are left alone.
///
/// # Errors
///
/// Returns [`Error::TextCodecFailure`] if the body is invalid in its charset.
pub fn decode_body(msg: &mut HttpMessage) -> Result<(), Error> {
    if msg.content_type().is_none() && msg.text_codec() == TextCodec::Unknown {
        return Ok(());
    }

    if msg.body_is_form_data() {
        let form = match msg.text_codec() {
            TextCodec::Unknown | TextCodec::Utf8 => {
                parse_query(&String::from_utf8_lossy(msg.body()))
            }
            codec => parse_query(&codec.decode(msg.body())?),
        };
        msg.set_body_form_data(Some(form));
        return Ok(());
    }

    if matches!(msg.text_codec(), TextCodec::Unknown | TextCodec::Utf8) {
        return Ok(());
    }

    let text = msg.text_codec().decode(msg.body())?;
    msg.set_body(text.as_bytes());
    msg.set_charset("utf-8");
    if !msg.is_chunked() {
        msg.set_header("Content-Length", itoa::Buffer::new().format(text.len()));
    }
    Ok(())
}

/// [`Handler`] that collects events into an [`HttpMessage`].
///
/// Header values are taken after comma splitting, and empty values are dropped. Chunk data is
/// appended to the message body and recorded per chunk.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    flags: SimpleFlags,
    msg: HttpMessage,
}

impl MessageBuilder {
    pub fn new(flags: SimpleFlags) -> MessageBuilder {
        MessageBuilder { flags, msg: HttpMessage::new() }
    }

    #[inline]
    pub fn message(&self) -> &HttpMessage {
        &self.msg
    }

    #[inline]
    pub fn into_message(self) -> HttpMessage {
        self.msg
    }

    fn start(&mut self, line: StartLine<'_>) -> Result<(), Error> {
        self.msg.set_kind(line.kind());
        self.msg.set_version(line.version());
        match line {
            StartLine::Request { method, uri, .. } => {
                self.msg.set_method(method);
                self.msg.set_uri(&uri)?;
            }
            StartLine::Response { status, reason, .. } => {
                self.msg.set_status_code(status);
                self.msg.set_reason_phrase(&reason);
            }
        }
        Ok(())
    }

    fn header_done(&mut self, format: DataFormat) -> Result<(), Error> {
        if format == DataFormat::Multipart {
            return Err(Error::UnsupportedData);
        }

        if self.msg.kind() == MessageKind::Request {
            self.msg.apply_host_header();
        }
        self.msg.set_headers_complete(true);

        let framed = format == DataFormat::Chunked || self.msg.headers().contains("content-length");
        if !framed && self.flags.length_required {
            return Err(Error::LengthRequired);
        }
        Ok(())
    }
}

impl Handler for MessageBuilder {
    fn on_event(&mut self, event: Event<'_>) -> Result<(), Error> {
        match event {
            Event::Start(line) => self.start(line)?,
            Event::Header { key, value } => {
                if !value.is_empty() {
                    self.msg.add_header(&key, &value);
                }
            }
            Event::HeaderDone(format) => self.header_done(format)?,
            Event::Body(data) => self.msg.body_append(&data),
            Event::ChunkExtension { key, value, index } => {
                if self.flags.fail_extension {
                    return Err(Error::ChunkExtensionNotAllowed);
                }
                let value = value.as_deref().unwrap_or_default();
                self.msg.chunk_mut(index).add_extension(&key, value);
            }
            Event::ChunkExtensionsDone(index) => {
                self.msg.chunk_mut(index);
            }
            Event::ChunkData { data, index } => {
                self.msg.body_append(&data);
                self.msg.chunk_mut(index).body_append(&data);
            }
            Event::ChunkDataDone(index) => {
                let chunk = self.msg.chunk_mut(index);
                chunk.set_body_length_declared(Some(chunk.body_length_seen()));
            }
            Event::Trailer { key, value } => {
                if self.flags.fail_trailers {
                    return Err(Error::TrailerNotAllowed);
                }
                self.msg.add_trailer(&key, &value);
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::{Method, Version};

    fn read_ok(input: &[u8]) -> HttpMessage {
        let (msg, consumed) = read(input, SimpleFlags::default()).unwrap();
        assert_eq!(consumed, input.len());
        msg
    }

    #[test]
    fn test_response() {
        let msg = read_ok(
            b"HTTP/1.1 200 OK\r\n\
            Date: Mon, 7 May 2018 01:02:03 GMT\r\n\
            Content-Length: 44\r\n\
            Connection: close\r\n\
            Content-Type: text/html\r\n\
            \r\n\
            <html><body><h1>It works!</h1></body></html>",
        );
        assert_eq!(msg.kind(), MessageKind::Response);
        assert_eq!(msg.version(), Some(Version::Http11));
        assert_eq!(msg.status_code(), 200);
        assert_eq!(msg.reason_phrase(), Some("OK"));
        assert_eq!(msg.header("date").as_deref(), Some("Mon, 7 May 2018 01:02:03 GMT"));
        assert_eq!(msg.content_type(), Some("text/html"));
        assert_eq!(msg.body_length_declared(), Some(44));
        assert_eq!(msg.body(), b"<html><body><h1>It works!</h1></body></html>");
        assert!(msg.headers_complete());
        assert!(!msg.persistent_conn());
    }

    #[test]
    fn test_list_headers() {
        let msg = read_ok(
            b"HTTP/1.1 200 OK\r\n\
            Accept: a, b,, c\r\n\
            Accept: d\r\n\
            Empty:\r\n\
            Set-Cookie: id=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT\r\n\
            \r\n\
            body",
        );
        assert_eq!(msg.headers().get_all("accept").collect::<Vec<_>>(), ["a", "b", "c", "d"]);
        assert!(!msg.headers().contains("empty"));
        assert_eq!(msg.set_cookie_values(), ["id=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT"]);
        assert_eq!(msg.body(), b"body");
    }

    #[test]
    fn test_request_host() {
        let msg = read_ok(b"GET http://www.example.com:8080/a?b=c HTTP/1.0\r\n\r\n");
        assert_eq!(msg.method(), Some(Method::Get));
        assert_eq!(msg.version(), Some(Version::Http10));
        assert_eq!(msg.host(), Some("www.example.com"));
        assert_eq!(msg.port(), Some(8080));
        assert_eq!(msg.path(), Some("/a"));
        assert_eq!(msg.query_args().get("b"), Some("c"));

        let msg = read_ok(b"HEAD /x HTTP/1.1\r\nHost: example.com:81\r\n\r\n");
        assert_eq!(msg.method(), Some(Method::Head));
        assert_eq!(msg.host(), Some("example.com"));
        assert_eq!(msg.port(), Some(81));
    }

    #[test]
    fn test_form_body() {
        let input = b"\r\n\
            POST /login HTTP/1.1\r\n\
            Host: 127.0.0.1\r\n\
            Content-Type: application/x-www-form-urlencoded\r\n\
            Content-Length: 37\r\n\
            \r\n\
            User=For+Meeee&pw=ABC123&action=login\
            \r\n";
        let (msg, consumed) = read(input, SimpleFlags::default()).unwrap();
        assert_eq!(consumed, input.len() - 2);
        assert!(msg.body_is_form_data());

        let form = msg.body_form_data().unwrap();
        assert_eq!(form.get("User"), Some("For Meeee"));
        assert_eq!(form.get("pw"), Some("ABC123"));
        assert_eq!(form.get("action"), Some("login"));

        let flags = SimpleFlags { no_decode_body: true, ..Default::default() };
        let (msg, _) = read(input, flags).unwrap();
        assert!(msg.body_form_data().is_none());
    }

    #[test]
    fn test_transcode_body() {
        let msg = read_ok(
            b"HTTP/1.1 200 OK\r\n\
            Content-Type: text/plain; charset=ISO-8859-1\r\n\
            Content-Length: 4\r\n\
            \r\n\
            caf\xe9",
        );
        assert_eq!(msg.body(), "café".as_bytes());
        assert_eq!(msg.charset(), Some("utf-8"));
        assert_eq!(msg.text_codec(), TextCodec::Utf8);
        assert_eq!(msg.header("content-length").as_deref(), Some("5"));
        assert_eq!(msg.header("content-type").as_deref(), Some("text/plain; charset=utf-8"));

        let input = b"HTTP/1.1 200 OK\r\n\
            Content-Type: text/plain; charset=us-ascii\r\n\
            Content-Length: 4\r\n\
            \r\n\
            caf\xe9";
        assert_eq!(read(input, SimpleFlags::default()).unwrap_err(), Error::TextCodecFailure);

        let flags = SimpleFlags { no_decode_body: true, ..Default::default() };
        let (msg, _) = read(input, flags).unwrap();
        assert_eq!(msg.body(), b"caf\xe9");
    }

    #[test]
    fn test_chunked() {
        let input = b"HTTP/1.1 200 OK\r\n\
            Transfer-Encoding: chunked\r\n\
            \r\n\
            4;ext1;ext2=abc\r\n\
            Wiki\r\n\
            5\r\n\
            pedia\r\n\
            0\r\n\
            Trailer 1: a\r\n\
            Trailer 2: b\r\n\
            \r\n";
        let msg = read_ok(input);
        assert!(msg.is_chunked());
        assert_eq!(msg.body(), b"Wikipedia");
        assert_eq!(msg.chunks().len(), 3);
        assert_eq!(msg.chunks()[0].body(), b"Wiki");
        assert_eq!(msg.chunks()[0].body_length_declared(), Some(4));
        assert_eq!(msg.chunks()[0].extensions().get("ext1"), Some(""));
        assert_eq!(msg.chunks()[0].extensions().get("ext2"), Some("abc"));
        assert_eq!(msg.chunks()[1].body(), b"pedia");
        assert!(msg.chunks()[2].body().is_empty());
        assert_eq!(msg.trailers().get("trailer 1"), Some("a"));
        assert_eq!(msg.trailers().get("trailer 2"), Some("b"));

        let flags = SimpleFlags { fail_extension: true, ..Default::default() };
        assert_eq!(read(input, flags).unwrap_err(), Error::ChunkExtensionNotAllowed);
        let flags = SimpleFlags { fail_trailers: true, ..Default::default() };
        assert_eq!(read(input, flags).unwrap_err(), Error::TrailerNotAllowed);
    }

    #[test]
    fn test_policy_errors() {
        let flags = SimpleFlags { length_required: true, ..Default::default() };
        assert_eq!(
            read(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", flags).unwrap_err(),
            Error::LengthRequired
        );
        assert!(read(b"GET / HTTP/1.1\r\nContent-Length: 0\r\n\r\n", flags).is_ok());

        let input = b"POST / HTTP/1.1\r\n\
            Content-Type: multipart/form-data; boundary=xyz\r\n\
            Content-Length: 14\r\n\
            \r\n\
            --xyz\r\n\r\n\r\n--xyz--";
        assert_eq!(read(input, SimpleFlags::default()).unwrap_err(), Error::UnsupportedData);
    }

    #[test]
    fn test_more_data() {
        assert_eq!(read(b"", SimpleFlags::default()).unwrap_err(), Error::MoreData);
        assert_eq!(read(b"GET / HTTP/1.1\r\nHost", SimpleFlags::default()).unwrap_err(), Error::MoreData);
        assert_eq!(
            read(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nab", SimpleFlags::default()).unwrap_err(),
            Error::MoreData
        );
        assert_eq!(read(b"GET / HTTP/2\r\n\r\n", SimpleFlags::default()).unwrap_err(), Error::UnknownVersion);
    }

    #[test]
    fn test_builder_incremental() {
        let mut reader = HttpReader::new();
        let mut builder = MessageBuilder::default();

        let input = b"HTTP/1.1 200 OK\r\n\r\nuntil close";
        let progress = reader.read(input, &mut builder).unwrap();
        assert_eq!(progress.status, Status::SuccessMoreDataPossible);
        reader.finish(&mut builder).unwrap();

        assert!(builder.message().headers_complete());
        assert_eq!(builder.into_message().body(), b"until close");
    }
}
