//! Incremental HTTP/1.x message reader.
//!
//! [`HttpReader`] is a resumable state machine. Each call to [`read`][HttpReader::read] takes
//! whatever bytes the caller has, emits an [`Event`] for every syntactic unit it can complete,
//! and reports how many bytes it consumed. Bytes of an incomplete unit are never consumed, the
//! caller presents them again, followed by new input, on the next call.
//!
//! ```
//! use httpr::reader::{HttpReader, Recorder, Status};
//!
//! let mut reader = HttpReader::new();
//! let mut events = Recorder::new();
//!
//! let progress = reader.read(b"GET /a HTTP/1.1\r\n", &mut events).unwrap();
//! assert_eq!(progress.status, Status::MoreData);
//! assert_eq!(progress.consumed, 17);
//!
//! let progress = reader.read(b"Host: x\r\n\r\n", &mut events).unwrap();
//! assert_eq!(progress.status, Status::Success);
//! ```
use crate::cursor::Cursor;
use crate::error::Error;
use crate::log::debug;
use crate::message::MessageKind;

mod event;
mod start;
mod header;
mod body;
mod chunk;
mod multipart;

pub use event::{Event, Handler, Recorder, StartLine};

/// Maximum start line length, excluding CRLF.
pub const MAX_START_LINE: usize = 6 * 1024;

/// Maximum size of one header section, CRLFs included.
pub const MAX_HEADER_SIZE: usize = 8 * 1024;

/// Maximum chunk size line length, excluding CRLF.
pub const MAX_CHUNK_LINE: usize = 1024;

/// Maximum multipart boundary length.
pub const MAX_BOUNDARY: usize = 70;

/// How the message body is framed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// No body.
    #[default]
    None,
    /// Raw body, delimited by `Content-Length` or by connection close.
    Body,
    /// Chunked transfer coding.
    Chunked,
    /// `multipart/*` body split on a boundary.
    Multipart,
}

/// Reader configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReaderFlags {
    /// Start directly at the header section, for input that has no start line.
    pub skip_start_line: bool,
}

/// Outcome of a successful [`read`][HttpReader::read] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Message fully parsed.
    Success,
    /// Body length is not framed, everything so far is parsed. More input may follow, or the
    /// caller may call [`finish`][HttpReader::finish] once the peer closed.
    SuccessMoreDataPossible,
    /// Current unit is incomplete.
    MoreData,
}

/// Result of a [`read`][HttpReader::read] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub status: Status,
    /// Bytes consumed from the start of the buffer.
    pub consumed: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Unknown,
    StartLine,
    Header,
    Body,
    ChunkStart,
    ChunkData,
    Trailer,
    MultipartPreamble,
    MultipartHeader,
    MultipartData,
    MultipartCheckEnd,
    MultipartEpilogue,
    Done,
}

/// Resumable parser for a single HTTP/1.x message.
///
/// Once the message is complete, or after any error, the reader is spent. A pipelined message
/// needs a new reader fed from the first unconsumed byte.
#[derive(Debug)]
pub struct HttpReader {
    flags: ReaderFlags,
    step: Step,
    kind: MessageKind,
    data_format: DataFormat,
    body_length_declared: Option<u64>,
    body_length_seen: u64,
    header_bytes_seen: usize,
    /// `\r\n--` followed by the boundary parameter.
    boundary: Vec<u8>,
    part_index: usize,
    no_body_method: bool,
    status_code: u32,
    have_part: bool,
    have_end: bool,
    have_epilogue: bool,
    chunk_remaining: u64,
    consumed: u64,
}

impl Default for HttpReader {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl HttpReader {
    #[inline]
    pub fn new() -> HttpReader {
        Self::with_flags(ReaderFlags::default())
    }

    pub fn with_flags(flags: ReaderFlags) -> HttpReader {
        HttpReader {
            flags,
            step: Step::Unknown,
            kind: MessageKind::Unknown,
            data_format: DataFormat::None,
            body_length_declared: None,
            body_length_seen: 0,
            header_bytes_seen: 0,
            boundary: Vec::new(),
            part_index: 0,
            no_body_method: false,
            status_code: 0,
            have_part: false,
            have_end: false,
            have_epilogue: false,
            chunk_remaining: 0,
            consumed: 0,
        }
    }

    // ===== Accessors =====

    #[inline]
    pub const fn flags(&self) -> ReaderFlags {
        self.flags
    }

    /// Message kind, known once the start line is parsed.
    #[inline]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Body framing, final once the header section is parsed.
    #[inline]
    pub const fn data_format(&self) -> DataFormat {
        self.data_format
    }

    #[inline]
    pub const fn body_length_declared(&self) -> Option<u64> {
        self.body_length_declared
    }

    /// Body bytes seen so far, decoded for chunked bodies, raw for multipart bodies.
    #[inline]
    pub const fn body_length_seen(&self) -> u64 {
        self.body_length_seen
    }

    /// Multipart boundary parameter, without the leading dashes.
    pub fn boundary(&self) -> Option<&[u8]> {
        self.boundary.get(4..)
    }

    /// Total bytes consumed across all calls.
    #[inline]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.step == Step::Done
    }

    // ===== Read =====

    /// Parse as much of `buf` as possible, emitting events to `handler`.
    ///
    /// On [`Status::MoreData`] or [`Status::SuccessMoreDataPossible`], the bytes after
    /// `consumed` must be presented again at the start of the next call.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input, or when `handler` returns one. The reader must not
    /// be used afterwards.
    pub fn read<H>(&mut self, buf: &[u8], handler: &mut H) -> Result<Progress, Error>
    where
        H: Handler + ?Sized,
    {
        let mut cur = Cursor::new(buf);

        let status = loop {
            let result = match self.step {
                Step::Done => break Status::Success,
                Step::Unknown => self.read_unknown(&mut cur),
                Step::StartLine => self.read_start_line(&mut cur, handler),
                Step::Header => self.read_header(&mut cur, handler),
                Step::Body => self.read_body(&mut cur, handler),
                Step::ChunkStart => self.read_chunk_start(&mut cur, handler),
                Step::ChunkData => self.read_chunk_data(&mut cur, handler),
                Step::Trailer => self.read_trailer(&mut cur, handler),
                Step::MultipartPreamble
                | Step::MultipartHeader
                | Step::MultipartData
                | Step::MultipartCheckEnd
                | Step::MultipartEpilogue => self.read_multipart(&mut cur, handler),
            };

            match result {
                Ok(Some(())) => {}
                Ok(None) => break self.pending_status(),
                Err(err) => {
                    debug!("http reader failed at {:?}: {err}", self.step);
                    return Err(err);
                }
            }
        };

        let consumed = cur.position();
        self.consumed += consumed as u64;
        Ok(Progress { status, consumed })
    }

    /// Signal that no more input will arrive.
    ///
    /// Completes a body whose length is framed by connection close.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MoreData`] if the message is still incomplete.
    pub fn finish<H>(&mut self, handler: &mut H) -> Result<(), Error>
    where
        H: Handler + ?Sized,
    {
        match self.step {
            Step::Done => Ok(()),
            Step::Body if self.body_length_declared.is_none() => {
                handler.on_event(Event::BodyDone)?;
                self.step = Step::Done;
                Ok(())
            }
            Step::MultipartEpilogue if self.body_length_declared.is_none() => {
                handler.on_event(Event::MultipartEpilogueDone)?;
                self.step = Step::Done;
                Ok(())
            }
            _ => Err(Error::MoreData),
        }
    }

    fn pending_status(&self) -> Status {
        let open_ended = matches!(self.step, Step::Body | Step::MultipartEpilogue)
            && self.body_length_declared.is_none();
        match open_ended {
            true => Status::SuccessMoreDataPossible,
            false => Status::MoreData,
        }
    }

    /// Declared body bytes not yet consumed.
    fn body_remaining(&self) -> Option<u64> {
        self.body_length_declared
            .map(|declared| declared.saturating_sub(self.body_length_seen))
    }

    /// Skip CRLF noise left between pipelined messages.
    fn read_unknown(&mut self, cur: &mut Cursor) -> Result<Option<()>, Error> {
        if self.flags.skip_start_line {
            self.step = Step::Header;
            return Ok(Some(()));
        }

        while cur.starts_with(b"\r\n") {
            cur.consume(2);
        }

        match cur.peek() {
            [] | [b'\r'] => Ok(None),
            _ => {
                self.step = Step::StartLine;
                Ok(Some(()))
            }
        }
    }
}

/// Length of an unterminated line, not counting a trailing `\r` that may start its CRLF.
#[inline]
fn pending_line_len(cur: &Cursor) -> usize {
    cur.len() - usize::from(cur.peek().ends_with(b"\r"))
}

#[inline]
fn clamp_len(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

// ===== Macros =====

macro_rules! tri {
    ($e:expr) => {
        match $e {
            Ok(Some(ok)) => ok,
            Ok(None) => return Ok(None),
            Err(err) => return Err(err),
        }
    };
}

use tri;
