use std::borrow::Cow;

use super::DataFormat;
use crate::error::Error;
use crate::http::{Method, Version};
use crate::message::MessageKind;

/// Parsed start line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartLine<'a> {
    Request {
        method: Method,
        uri: Cow<'a, str>,
        version: Version,
    },
    Response {
        version: Version,
        status: u32,
        reason: Cow<'a, str>,
    },
}

impl StartLine<'_> {
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Request { .. } => MessageKind::Request,
            Self::Response { .. } => MessageKind::Response,
        }
    }

    pub const fn version(&self) -> Version {
        match self {
            Self::Request { version, .. } | Self::Response { version, .. } => *version,
        }
    }

    pub fn into_owned(self) -> StartLine<'static> {
        match self {
            Self::Request { method, uri, version } => StartLine::Request {
                method,
                uri: own(uri),
                version,
            },
            Self::Response { version, status, reason } => StartLine::Response {
                version,
                status,
                reason: own(reason),
            },
        }
    }
}

/// Event emitted by [`HttpReader`][super::HttpReader] for each completed syntactic unit.
///
/// Payloads borrow from the buffer passed to `read` where possible. Header values that are not
/// valid UTF-8 are converted lossily.
///
/// `index` is the 0-based chunk or multipart part the event belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    Start(StartLine<'a>),

    /// Header line with its value unsplit.
    HeaderFull { key: Cow<'a, str>, value: Cow<'a, str> },
    /// One element of a header value, after comma splitting.
    Header { key: Cow<'a, str>, value: Cow<'a, str> },
    HeaderDone(DataFormat),

    Body(Cow<'a, [u8]>),
    BodyDone,

    ChunkExtension { key: Cow<'a, str>, value: Option<Cow<'a, str>>, index: usize },
    ChunkExtensionsDone(usize),
    ChunkData { data: Cow<'a, [u8]>, index: usize },
    ChunkDataDone(usize),
    /// Zero length chunk seen, trailers follow.
    ChunkDataFinished,

    MultipartPreamble(Cow<'a, [u8]>),
    MultipartPreambleDone,
    MultipartHeaderFull { key: Cow<'a, str>, value: Cow<'a, str>, index: usize },
    MultipartHeader { key: Cow<'a, str>, value: Cow<'a, str>, index: usize },
    MultipartHeaderDone(usize),
    MultipartData { data: Cow<'a, [u8]>, index: usize },
    MultipartDataDone(usize),
    /// Final boundary seen.
    MultipartDataFinished,
    MultipartEpilogue(Cow<'a, [u8]>),
    MultipartEpilogueDone,

    TrailerFull { key: Cow<'a, str>, value: Cow<'a, str> },
    Trailer { key: Cow<'a, str>, value: Cow<'a, str> },
    TrailerDone,
}

impl Event<'_> {
    /// Detach the event from the input buffer.
    pub fn into_owned(self) -> Event<'static> {
        use Event::*;
        match self {
            Start(line) => Start(line.into_owned()),
            HeaderFull { key, value } => HeaderFull { key: own(key), value: own(value) },
            Header { key, value } => Header { key: own(key), value: own(value) },
            HeaderDone(format) => HeaderDone(format),
            Body(data) => Body(own(data)),
            BodyDone => BodyDone,
            ChunkExtension { key, value, index } => ChunkExtension {
                key: own(key),
                value: value.map(own),
                index,
            },
            ChunkExtensionsDone(index) => ChunkExtensionsDone(index),
            ChunkData { data, index } => ChunkData { data: own(data), index },
            ChunkDataDone(index) => ChunkDataDone(index),
            ChunkDataFinished => ChunkDataFinished,
            MultipartPreamble(data) => MultipartPreamble(own(data)),
            MultipartPreambleDone => MultipartPreambleDone,
            MultipartHeaderFull { key, value, index } => MultipartHeaderFull {
                key: own(key),
                value: own(value),
                index,
            },
            MultipartHeader { key, value, index } => MultipartHeader {
                key: own(key),
                value: own(value),
                index,
            },
            MultipartHeaderDone(index) => MultipartHeaderDone(index),
            MultipartData { data, index } => MultipartData { data: own(data), index },
            MultipartDataDone(index) => MultipartDataDone(index),
            MultipartDataFinished => MultipartDataFinished,
            MultipartEpilogue(data) => MultipartEpilogue(own(data)),
            MultipartEpilogueDone => MultipartEpilogueDone,
            TrailerFull { key, value } => TrailerFull { key: own(key), value: own(value) },
            Trailer { key, value } => Trailer { key: own(key), value: own(value) },
            TrailerDone => TrailerDone,
        }
    }
}

fn own<B>(value: Cow<'_, B>) -> Cow<'static, B>
where
    B: ToOwned + ?Sized + 'static,
{
    Cow::Owned(value.into_owned())
}

/// Consumer of reader events.
///
/// Returning an error stops the reader, which hands the error back from `read`. Use
/// [`Error::UserAbort`] for a plain stop, or a policy error such as
/// [`Error::TrailerNotAllowed`].
pub trait Handler {
    fn on_event(&mut self, event: Event<'_>) -> Result<(), Error>;
}

impl<F> Handler for F
where
    F: FnMut(Event<'_>) -> Result<(), Error>,
{
    #[inline]
    fn on_event(&mut self, event: Event<'_>) -> Result<(), Error> {
        self(event)
    }
}

/// Handler that keeps an owned copy of every event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recorder {
    events: Vec<Event<'static>>,
}

impl Recorder {
    #[inline]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    #[inline]
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    #[inline]
    pub fn into_events(self) -> Vec<Event<'static>> {
        self.events
    }
}

impl Handler for Recorder {
    #[inline]
    fn on_event(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.events.push(event.into_owned());
        Ok(())
    }
}

impl Handler for Vec<Event<'static>> {
    #[inline]
    fn on_event(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.push(event.into_owned());
        Ok(())
    }
}
