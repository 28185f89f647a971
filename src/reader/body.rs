use std::borrow::Cow;

use super::{Event, Handler, HttpReader, Step, clamp_len};
use crate::cursor::Cursor;
use crate::error::Error;

impl HttpReader {
    /// Raw body, bounded by `Content-Length` or by connection close.
    pub(super) fn read_body<'a, H>(
        &mut self,
        cur: &mut Cursor<'a>,
        handler: &mut H,
    ) -> Result<Option<()>, Error>
    where
        H: Handler + ?Sized,
    {
        let remaining = self.body_remaining();

        let data = match remaining {
            Some(remaining) => cur.take(clamp_len(remaining)),
            None => cur.take(cur.len()),
        };

        if !data.is_empty() {
            self.body_length_seen += data.len() as u64;
            handler.on_event(Event::Body(Cow::Borrowed(data)))?;
        }

        if self.body_remaining() != Some(0) {
            return Ok(None);
        }

        handler.on_event(Event::BodyDone)?;
        self.step = Step::Done;
        Ok(Some(()))
    }
}
