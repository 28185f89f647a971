use std::borrow::Cow;

use super::{Event, Handler, HttpReader, MAX_CHUNK_LINE, Step, clamp_len, pending_line_len};
use crate::cursor::Cursor;
use crate::error::Error;

impl HttpReader {
    /// Chunk size line, `<hex>[;name[=value]]*`.
    pub(super) fn read_chunk_start<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let line = match cur.consume_until(b"\r\n", true) {
            Some(line) => line,
            None if pending_line_len(cur) > MAX_CHUNK_LINE => return Err(Error::ChunkStartTooLong),
            None => return Ok(None),
        };
        if line.len() > MAX_CHUNK_LINE {
            return Err(Error::ChunkStartTooLong);
        }

        let mut line = Cursor::new(line);
        let len = line.read_uint(16).ok_or(Error::ChunkLengthInvalid)?;
        line.consume_whitespace();

        let index = self.part_index;

        match line.read_byte() {
            None => {}
            Some(b';') => {
                for ext in split_extensions(line.peek()) {
                    let (key, value) = parse_extension(ext)?;
                    handler.on_event(Event::ChunkExtension { key, value, index })?;
                }
            }
            Some(_) => return Err(Error::ChunkMalformed),
        }
        handler.on_event(Event::ChunkExtensionsDone(index))?;

        if len == 0 {
            handler.on_event(Event::ChunkDataFinished)?;
            self.header_bytes_seen = 0;
            self.step = Step::Trailer;
        } else {
            self.chunk_remaining = len;
            self.step = Step::ChunkData;
        }
        Ok(Some(()))
    }

    /// Chunk payload followed by CRLF.
    pub(super) fn read_chunk_data<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let index = self.part_index;

        if self.chunk_remaining != 0 {
            let data = cur.take(clamp_len(self.chunk_remaining));
            if data.is_empty() {
                return Ok(None);
            }

            self.chunk_remaining -= data.len() as u64;
            self.body_length_seen += data.len() as u64;
            handler.on_event(Event::ChunkData { data: Cow::Borrowed(data), index })?;

            if self.chunk_remaining != 0 {
                return Ok(None);
            }
        }

        match cur.peek() {
            [b'\r', b'\n', ..] => cur.consume(2),
            [] | [b'\r'] => return Ok(None),
            _ => return Err(Error::ChunkDataMalformed),
        }

        handler.on_event(Event::ChunkDataDone(index))?;
        self.part_index += 1;
        self.step = Step::ChunkStart;
        Ok(Some(()))
    }
}

/// Split the extension list on `;` outside quoted values.
fn split_extensions(line: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, &b) in line.iter().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b';' if !quoted => {
                out.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&line[start..]);
    out
}

type Extension<'a> = (Cow<'a, str>, Option<Cow<'a, str>>);

/// Parse one `name[=value]` chunk extension, stripping quotes from the value.
fn parse_extension(ext: &[u8]) -> Result<Extension<'_>, Error> {
    let ext = ext.trim_ascii();
    let (name, value) = match ext.iter().position(|&b| b == b'=') {
        Some(eq) => (&ext[..eq], Some(&ext[eq + 1..])),
        None => (ext, None),
    };

    let name = name.trim_ascii();
    if name.is_empty() {
        return Err(Error::ChunkExtensionMalformed);
    }

    let value = match value.map(<[u8]>::trim_ascii) {
        None => None,
        Some([]) => return Err(Error::ChunkExtensionMalformed),
        Some([b'"', quoted @ .., b'"']) => Some(quoted),
        Some([b'"', ..]) => return Err(Error::ChunkExtensionMalformed),
        Some(value) => Some(value),
    };

    Ok((String::from_utf8_lossy(name), value.map(String::from_utf8_lossy)))
}
