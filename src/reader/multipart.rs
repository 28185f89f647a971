use std::borrow::Cow;

use super::header::Section;
use super::{Event, Handler, HttpReader, Step, clamp_len, tri};
use crate::cursor::Cursor;
use crate::error::Error;

impl HttpReader {
    /// Run one multipart state over the part of `cur` that belongs to the body.
    ///
    /// Bytes past a declared body length are never scanned. When the body is exhausted while a
    /// state still waits for input, the part or the final boundary is missing.
    pub(super) fn read_multipart<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let remaining = self.body_remaining();
        let mut body = match remaining {
            Some(remaining) => cur.limit(clamp_len(remaining)),
            None => cur.clone(),
        };
        let available = body.len();

        let result = match self.step {
            Step::MultipartPreamble => self.multipart_preamble(&mut body, handler),
            Step::MultipartHeader => self.multipart_header(&mut body, handler),
            Step::MultipartData => self.multipart_data(&mut body, handler),
            Step::MultipartCheckEnd => self.multipart_check_end(&mut body, handler),
            _ => self.multipart_epilogue(&mut body, handler),
        };

        let used = body.position() - cur.position();
        cur.consume(used);
        self.body_length_seen += used as u64;

        let exhausted = remaining.is_some_and(|remaining| available as u64 >= remaining);
        match result {
            Ok(None) if exhausted && !self.have_end => {
                Err(match self.have_part {
                    false => Error::MultipartMissingPart,
                    true => Error::MultipartMissingFinalBoundary,
                })
            }
            result => result,
        }
    }

    /// Data before the first boundary, which may open the body without a leading CRLF.
    fn multipart_preamble<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let opener = &self.boundary[2..];
        let at_start = self.body_length_seen == 0;

        let before = if at_start && cur.len() < opener.len() && opener.starts_with(cur.peek()) {
            return Ok(None);
        } else if at_start && cur.starts_with(opener) {
            let before = cur.mark();
            cur.consume(opener.len());
            before
        } else {
            let (data, found) = cur.consume_boundary(&self.boundary, false);
            if !data.is_empty() {
                handler.on_event(Event::MultipartPreamble(Cow::Borrowed(data)))?;
            }
            if !found {
                return Ok(None);
            }
            let before = cur.mark();
            cur.consume(self.boundary.len());
            before
        };

        match cur.peek() {
            [b'\r', b'\n', ..] => cur.consume(2),
            [b'-', b'-', ..] => return Err(Error::MultipartMissingPart),
            [] | [b'\r'] | [b'-'] => {
                cur.rewind(before);
                return Ok(None);
            }
            _ => return Err(Error::MultipartInvalidFraming),
        }

        handler.on_event(Event::MultipartPreambleDone)?;
        self.have_part = true;
        self.step = Step::MultipartHeader;
        Ok(Some(()))
    }

    fn multipart_header<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        if tri!(self.header_line(cur, Section::Part, handler)) {
            handler.on_event(Event::MultipartHeaderDone(self.part_index))?;
            self.step = Step::MultipartData;
        }
        Ok(Some(()))
    }

    fn multipart_data<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let index = self.part_index;
        let (data, found) = cur.consume_boundary(&self.boundary, true);

        if !data.is_empty() {
            handler.on_event(Event::MultipartData { data: Cow::Borrowed(data), index })?;
        }
        if !found {
            return Ok(None);
        }

        handler.on_event(Event::MultipartDataDone(index))?;
        self.part_index += 1;
        self.step = Step::MultipartCheckEnd;
        Ok(Some(()))
    }

    /// After a boundary, `--` closes the body and CRLF opens another part.
    fn multipart_check_end<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        match cur.peek() {
            [b'-', b'-', ..] => {
                cur.consume(2);
                self.have_end = true;
                handler.on_event(Event::MultipartDataFinished)?;
                self.step = Step::MultipartEpilogue;
            }
            [b'\r', b'\n', ..] => {
                cur.consume(2);
                self.step = Step::MultipartHeader;
            }
            [] | [b'-'] | [b'\r'] => return Ok(None),
            _ => return Err(Error::MultipartInvalidFraming),
        }
        Ok(Some(()))
    }

    /// Everything after the final boundary line.
    fn multipart_epilogue<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let remaining = self.body_remaining();
        let start = cur.mark();

        if !self.have_epilogue {
            let more = remaining.is_none_or(|remaining| clamp_len(remaining) > cur.len());
            match cur.peek() {
                [b'\r', b'\n', ..] => cur.consume(2),
                [] | [b'\r'] if more => return Ok(None),
                _ => {}
            }
            self.have_epilogue = true;
        }

        let data = cur.take(cur.len());
        if !data.is_empty() {
            handler.on_event(Event::MultipartEpilogue(Cow::Borrowed(data)))?;
        }

        let left = remaining.map(|remaining| remaining - cur.mark_len(start) as u64);
        if left != Some(0) {
            return Ok(None);
        }

        handler.on_event(Event::MultipartEpilogueDone)?;
        self.step = Step::Done;
        Ok(Some(()))
    }
}
