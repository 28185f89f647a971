use std::borrow::Cow;

use super::{
    DataFormat, Event, Handler, HttpReader, MAX_BOUNDARY, MAX_HEADER_SIZE, Step, pending_line_len,
    tri,
};
use crate::cursor::Cursor;
use crate::error::Error;
use crate::headers::{is_nosplit, split_value, trim};
use crate::log::debug;
use crate::message::MessageKind;

/// Header-syntax section being parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Section {
    Header,
    Part,
    Trailer,
}

impl HttpReader {
    pub(super) fn read_header<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        if !tri!(self.header_line(cur, Section::Header, handler)) {
            return Ok(Some(()));
        }

        self.finalize_framing()?;
        debug!("http header done, body {:?}", self.data_format);
        handler.on_event(Event::HeaderDone(self.data_format))?;

        self.step = match self.data_format {
            DataFormat::None => Step::Done,
            DataFormat::Body => Step::Body,
            DataFormat::Chunked => Step::ChunkStart,
            DataFormat::Multipart => Step::MultipartPreamble,
        };
        Ok(Some(()))
    }

    pub(super) fn read_trailer<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        if tri!(self.header_line(cur, Section::Trailer, handler)) {
            handler.on_event(Event::TrailerDone)?;
            self.step = Step::Done;
        }
        Ok(Some(()))
    }

    /// Parse one line of a header section.
    ///
    /// Returns `true` on the empty line that ends the section.
    pub(super) fn header_line<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        section: Section,
        handler: &mut H,
    ) -> Result<Option<bool>, Error>
    where
        H: Handler + ?Sized,
    {
        let line = match cur.consume_until(b"\r\n", true) {
            Some(line) => line,
            None if self.header_bytes_seen + pending_line_len(cur) + 2 > MAX_HEADER_SIZE => {
                return Err(Error::HeaderTooLong);
            }
            None => return Ok(None),
        };

        self.header_bytes_seen += line.len() + 2;
        if self.header_bytes_seen > MAX_HEADER_SIZE {
            return Err(Error::HeaderTooLong);
        }

        if line.is_empty() {
            self.header_bytes_seen = 0;
            return Ok(Some(true));
        }

        let (key, value) = parse_header_line(line)?;

        if section == Section::Header {
            self.check_framing(&key, &value)?;
        }

        let index = self.part_index;
        let full = match section {
            Section::Header => Event::HeaderFull { key: key.clone(), value: value.clone() },
            Section::Part => Event::MultipartHeaderFull {
                key: key.clone(),
                value: value.clone(),
                index,
            },
            Section::Trailer => Event::TrailerFull { key: key.clone(), value: value.clone() },
        };
        handler.on_event(full)?;

        for value in split_cow(&key, &value) {
            let key = key.clone();
            let event = match section {
                Section::Header => Event::Header { key, value },
                Section::Part => Event::MultipartHeader { key, value, index },
                Section::Trailer => Event::Trailer { key, value },
            };
            handler.on_event(event)?;
        }

        Ok(Some(false))
    }

    /// Track body framing headers as they arrive.
    fn check_framing(&mut self, key: &str, value: &str) -> Result<(), Error> {
        if key.eq_ignore_ascii_case("content-length") {
            if self.data_format == DataFormat::Chunked || self.body_length_declared.is_some() {
                return Err(Error::HeaderDuplicateFraming);
            }
            let len = parse_content_length(value)?;
            self.body_length_declared = Some(len);
            if len == 0 {
                self.data_format = DataFormat::None;
            } else if self.data_format != DataFormat::Multipart {
                self.data_format = DataFormat::Body;
            }
        } else if key.eq_ignore_ascii_case("transfer-encoding") {
            let last = value.rsplit(',').next().map_or("", trim);
            let chunked = last
                .as_bytes()
                .get(..7)
                .is_some_and(|coding| coding.eq_ignore_ascii_case(b"chunked"));
            if chunked {
                if self.body_length_declared.is_some() {
                    return Err(Error::HeaderDuplicateFraming);
                }
                self.data_format = DataFormat::Chunked;
                self.body_length_declared = None;
            }
        } else if key.eq_ignore_ascii_case("content-type") {
            let Some(boundary) = multipart_boundary(value)? else {
                return Ok(());
            };
            self.boundary.clear();
            self.boundary.extend_from_slice(b"\r\n--");
            self.boundary.extend_from_slice(boundary.as_bytes());
            if self.data_format != DataFormat::Chunked && self.body_length_declared != Some(0) {
                self.data_format = DataFormat::Multipart;
            }
        }
        Ok(())
    }

    /// Decide the body framing once all headers are known.
    fn finalize_framing(&mut self) -> Result<(), Error> {
        if self.kind == MessageKind::Response && no_body_status(self.status_code) {
            self.data_format = DataFormat::None;
            return Ok(());
        }

        if self.data_format == DataFormat::Chunked || self.body_length_declared.is_some() {
            return Ok(());
        }

        match self.kind {
            MessageKind::Response => {
                if self.data_format != DataFormat::Multipart {
                    self.data_format = DataFormat::Body;
                }
            }
            MessageKind::Request | MessageKind::Unknown => {
                if self.data_format == DataFormat::Multipart && !self.no_body_method {
                    return Err(Error::MultipartInvalid);
                }
                self.data_format = DataFormat::None;
            }
        }
        Ok(())
    }
}

/// Split a header line into trimmed key and value.
pub(super) fn parse_header_line(line: &[u8]) -> Result<(Cow<'_, str>, Cow<'_, str>), Error> {
    if matches!(line.first(), Some(b' ' | b'\t')) {
        return Err(Error::HeaderFolded);
    }
    if line.iter().any(|&b| (b < 0x20 && b != b'\t') || b == 0x7f) {
        return Err(Error::HeaderInvalidSyntax);
    }

    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(Error::HeaderInvalidSyntax)?;
    let (key, value) = (&line[..colon], &line[colon + 1..]);

    // no whitespace between name and colon
    match key.last() {
        None | Some(b' ' | b'\t') => return Err(Error::HeaderInvalidSyntax),
        Some(_) => {}
    }

    Ok((String::from_utf8_lossy(key), String::from_utf8_lossy(value.trim_ascii())))
}

/// Comma separated elements of `value`, or `value` whole for headers that must not be split.
fn split_cow<'a>(key: &str, value: &Cow<'a, str>) -> Vec<Cow<'a, str>> {
    if is_nosplit(key) {
        return vec![value.clone()];
    }
    match value {
        Cow::Borrowed(value) => split_value(*value).map(Cow::Borrowed).collect(),
        Cow::Owned(value) => split_value(value).map(|v| Cow::Owned(v.to_owned())).collect(),
    }
}

fn parse_content_length(value: &str) -> Result<u64, Error> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::ContentLengthMalformed);
    }
    value.parse().map_err(|_| Error::ContentLengthMalformed)
}

/// Boundary parameter of a `multipart/*` content type.
///
/// Returns `None` for other media types.
fn multipart_boundary(value: &str) -> Result<Option<&str>, Error> {
    let mut params = value.split(';');
    let media = params.next().map_or("", trim);
    let multipart = media
        .as_bytes()
        .get(..10)
        .is_some_and(|m| m.eq_ignore_ascii_case(b"multipart/"));
    if !multipart {
        return Ok(None);
    }

    let boundary = params
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| trim(name).eq_ignore_ascii_case("boundary"))
        .map_or("", |(_, value)| trim(value).trim_matches('"'));

    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY {
        return Err(Error::MultipartNoBoundary);
    }
    Ok(Some(boundary))
}

/// Status codes that never carry a body.
const fn no_body_status(code: u32) -> bool {
    matches!(code, 100..=199 | 204 | 304)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_header_line() {
        macro_rules! ok {
            ($input:literal => $key:literal, $value:literal) => {
                let (key, value) = parse_header_line($input).unwrap();
                assert_eq!(key, $key);
                assert_eq!(value, $value);
            };
        }

        macro_rules! error {
            ($input:literal => $err:ident) => {
                assert_eq!(parse_header_line($input), Err(Error::$err));
            };
        }

        ok!(b"Host: x" => "Host", "x");
        ok!(b"Host:x" => "Host", "x");
        ok!(b"Empty:" => "Empty", "");
        ok!(b"Padded: \t a, b \t" => "Padded", "a, b");
        ok!(b"Trailer 1: value" => "Trailer 1", "value");
        ok!(b"Date: Mon, 7 May 2018 01:02:03 GMT" => "Date", "Mon, 7 May 2018 01:02:03 GMT");

        error!(b"X-Foo : bar" => HeaderInvalidSyntax);
        error!(b"X-Foo\t: bar" => HeaderInvalidSyntax);
        error!(b": bar" => HeaderInvalidSyntax);
        error!(b"no colon" => HeaderInvalidSyntax);
        error!(b"X-Foo: a\rb" => HeaderInvalidSyntax);
        error!(b" continued" => HeaderFolded);
        error!(b"\tcontinued" => HeaderFolded);
    }

    #[test]
    fn test_multipart_boundary() {
        assert_eq!(multipart_boundary("text/html"), Ok(None));
        assert_eq!(
            multipart_boundary("multipart/form-data; boundary=abc"),
            Ok(Some("abc"))
        );
        assert_eq!(
            multipart_boundary("Multipart/Mixed; charset=utf-8; Boundary=\"a b\""),
            Ok(Some("a b"))
        );
        assert_eq!(multipart_boundary("multipart/form-data"), Err(Error::MultipartNoBoundary));
        assert_eq!(
            multipart_boundary("multipart/form-data; boundary=\"\""),
            Err(Error::MultipartNoBoundary)
        );
        let long = format!("multipart/form-data; boundary={}", "x".repeat(MAX_BOUNDARY + 1));
        assert_eq!(multipart_boundary(&long), Err(Error::MultipartNoBoundary));
    }

    #[test]
    fn test_split_cow() {
        let value = Cow::Borrowed("1, 2,, 3");
        assert_eq!(split_cow("list", &value), ["1", "2", "3"]);
        let value = Cow::Borrowed("Mon, 7 May 2018 01:02:03 GMT");
        assert_eq!(split_cow("date", &value), ["Mon, 7 May 2018 01:02:03 GMT"]);
        let value = Cow::Borrowed("");
        assert_eq!(split_cow("empty", &value), [""]);
    }
}
