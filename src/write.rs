//! HTTP/1.x message serialization.
//!
//! Every function appends to a [`BytesMut`]. On error the buffer is truncated back to its length
//! before the call, so a failed write never leaves a partial message behind.
use bytes::BytesMut;

use crate::error::Error;
use crate::headers::{HeaderSet, trim};
use crate::http::{Method, Version, httpdate_now, reason_phrase};
use crate::message::{HttpMessage, MessageKind, encode_uri};

/// Write a request.
///
/// `uri` is expected to be encoded already. Spaces and non-ASCII characters are percent-encoded.
pub fn request(
    buf: &mut BytesMut,
    method: Method,
    uri: &str,
    version: Version,
    headers: &HeaderSet,
    body: &[u8],
) -> Result<(), Error> {
    transaction(buf, |buf| {
        write_request_line(buf, method, uri, version)?;
        write_fields(buf, headers, &[], None, body)
    })
}

/// Write a response.
///
/// An empty `reason` is replaced by the standard phrase for `code`.
pub fn response(
    buf: &mut BytesMut,
    version: Version,
    code: u32,
    reason: &str,
    headers: &HeaderSet,
    body: &[u8],
) -> Result<(), Error> {
    transaction(buf, |buf| {
        write_status_line(buf, version, code, reason);
        write_fields(buf, headers, &[], None, body)
    })
}

/// Write `msg` with its headers, cookies, and body.
///
/// The message must know its kind and version, and a request its method and uri.
pub fn message(buf: &mut BytesMut, msg: &HttpMessage) -> Result<(), Error> {
    let version = msg.version().ok_or(Error::InvalidUse)?;

    transaction(buf, |buf| {
        match msg.kind() {
            MessageKind::Request => {
                let method = msg.method().ok_or(Error::InvalidUse)?;
                let uri = msg.uri().ok_or(Error::InvalidUse)?;
                write_request_line(buf, method, uri, version)?;
            }
            MessageKind::Response => {
                if msg.status_code() == 0 {
                    return Err(Error::InvalidUse);
                }
                let reason = msg.reason_phrase().unwrap_or_default();
                write_status_line(buf, version, msg.status_code(), reason);
            }
            MessageKind::Unknown => return Err(Error::InvalidUse),
        }
        write_fields(buf, msg.headers(), msg.set_cookie_values(), msg.charset(), msg.body())
    })
}

fn transaction<F>(buf: &mut BytesMut, f: F) -> Result<(), Error>
where
    F: FnOnce(&mut BytesMut) -> Result<(), Error>,
{
    let start = buf.len();
    let result = f(buf);
    if result.is_err() {
        buf.truncate(start);
    }
    result
}

fn write_request_line(
    buf: &mut BytesMut,
    method: Method,
    uri: &str,
    version: Version,
) -> Result<(), Error> {
    if uri.is_empty() {
        return Err(Error::InvalidUse);
    }

    buf.reserve(128);
    buf.extend_from_slice(method.as_str().as_bytes());
    buf.extend_from_slice(b" ");
    buf.extend_from_slice(encode_uri(uri).as_bytes());
    buf.extend_from_slice(b" ");
    buf.extend_from_slice(version.as_str().as_bytes());
    buf.extend_from_slice(b"\r\n");
    Ok(())
}

fn write_status_line(buf: &mut BytesMut, version: Version, code: u32, reason: &str) {
    let reason = match reason {
        "" => reason_phrase(code),
        reason => reason,
    };

    buf.reserve(128);
    buf.extend_from_slice(version.as_str().as_bytes());
    buf.extend_from_slice(b" ");
    buf.extend_from_slice(itoa::Buffer::new().format(code).as_bytes());
    buf.extend_from_slice(b" ");
    buf.extend_from_slice(reason.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Header section and body.
///
/// Each distinct key gets one line with its values joined, except `Set-Cookie` which gets one
/// line per value.
fn write_fields(
    buf: &mut BytesMut,
    headers: &HeaderSet,
    cookies: &[String],
    charset: Option<&str>,
    body: &[u8],
) -> Result<(), Error> {
    let chunked = headers.contains("transfer-encoding");
    if chunked && !body.is_empty() {
        return Err(Error::InvalidUse);
    }

    if let Some(len) = headers.get("content-length") {
        match trim(len).parse::<u64>() {
            Ok(len) if len == body.len() as u64 => {}
            _ => return Err(Error::InvalidUse),
        }
    }

    for (key, values) in headers.iter() {
        if key.eq_ignore_ascii_case("set-cookie") {
            for value in values {
                write_field(buf, key, value);
            }
        } else if key.eq_ignore_ascii_case("content-type") {
            write_field(buf, key, &content_type(&values.join(", "), charset));
        } else {
            write_field(buf, key, &values.join(", "));
        }
    }

    for cookie in cookies {
        write_field(buf, "Set-Cookie", cookie);
    }

    if !chunked && !headers.contains("content-length") {
        buf.extend_from_slice(b"Content-Length: ");
        buf.extend_from_slice(itoa::Buffer::new().format(body.len()).as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    if !headers.contains("date") {
        buf.extend_from_slice(b"Date: ");
        buf.extend_from_slice(&httpdate_now()[..]);
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(body);
    Ok(())
}

fn write_field(buf: &mut BytesMut, key: &str, value: &str) {
    buf.reserve(key.len() + value.len() + 4);
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// `Content-Type` value with the charset parameter added if it lacks one.
fn content_type(value: &str, charset: Option<&str>) -> String {
    let has_charset = value
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .any(|(name, _)| trim(name).eq_ignore_ascii_case("charset"));

    match charset {
        Some(charset) if !has_charset => format!("{value}; charset={charset}"),
        _ => value.to_owned(),
    }
}
