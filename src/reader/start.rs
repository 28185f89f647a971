use std::borrow::Cow;

use super::{Event, Handler, HttpReader, MAX_START_LINE, StartLine, Step, pending_line_len};
use crate::cursor::Cursor;
use crate::error::Error;
use crate::http::{Method, Version};

impl HttpReader {
    pub(super) fn read_start_line<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let line = match cur.consume_until(b"\r\n", true) {
            Some(line) => line,
            None if pending_line_len(cur) > MAX_START_LINE => return Err(Error::StartLineTooLong),
            None => return Ok(None),
        };

        let start = parse_start_line(line)?;

        self.kind = start.kind();
        match &start {
            StartLine::Request { method, .. } => self.no_body_method = method.is_no_body(),
            StartLine::Response { status, .. } => self.status_code = *status,
        }

        handler.on_event(Event::Start(start))?;
        self.step = Step::Header;
        Ok(Some(()))
    }
}

/// Parse a start line without its CRLF.
pub(super) fn parse_start_line(line: &[u8]) -> Result<StartLine<'_>, Error> {
    if line.len() > MAX_START_LINE {
        return Err(Error::StartLineTooLong);
    }
    if line.iter().any(|b| matches!(b, b'\r' | b'\n')) {
        return Err(Error::StartLineMalformed);
    }

    let parts = Cursor::new(line).split(b' ', 3);
    let [first, second, third] = parts.as_slice() else {
        return Err(Error::StartLineMalformed);
    };
    let (first, second, third) = (first.peek(), second.peek(), third.peek());

    match first.starts_with(b"HTTP/") {
        true => parse_status_line(first, second, third),
        false => parse_request_line(first, second, third),
    }
}

fn parse_request_line<'a>(
    method: &'a [u8],
    uri: &'a [u8],
    version: &'a [u8],
) -> Result<StartLine<'a>, Error> {
    if method.is_empty() || uri.is_empty() || version.contains(&b' ') {
        return Err(Error::StartLineMalformed);
    }

    let method = Method::from_bytes(method).ok_or(Error::RequestMethodUnrecognized)?;

    if !uri.iter().all(u8::is_ascii_graphic) {
        return Err(Error::UriInvalid);
    }
    let uri = str::from_utf8(uri).map_err(|_| Error::UriInvalid)?;

    let version = parse_version(version)?;

    Ok(StartLine::Request { method, uri: Cow::Borrowed(uri), version })
}

fn parse_status_line<'a>(
    version: &'a [u8],
    status: &'a [u8],
    reason: &'a [u8],
) -> Result<StartLine<'a>, Error> {
    let version = parse_version(version)?;

    let status = match status {
        [a, b, c] if [a, b, c].iter().all(|d| d.is_ascii_digit()) => {
            (a - b'0') as u32 * 100 + (b - b'0') as u32 * 10 + (c - b'0') as u32
        }
        _ => return Err(Error::StartLineMalformed),
    };

    if reason.is_empty() {
        return Err(Error::StartLineMalformed);
    }

    Ok(StartLine::Response {
        version,
        status,
        reason: String::from_utf8_lossy(reason),
    })
}

fn parse_version(src: &[u8]) -> Result<Version, Error> {
    let digits = src.strip_prefix(b"HTTP/").ok_or(Error::NotHttp)?;
    Version::from_digits(digits).ok_or(Error::UnknownVersion)
}
