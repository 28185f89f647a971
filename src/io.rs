//! Async read driver.
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Error;
use crate::log::{debug, warning};
use crate::reader::{Handler, HttpReader, Status};

const READ_SIZE: usize = 4 * 1024;

/// Read one message from `io`, feeding it through `reader` into `handler`.
///
/// `buf` holds bytes read but not yet parsed. It may already contain the start of the message,
/// and on return it holds whatever followed the message, such as a pipelined request. Consumed
/// bytes are zeroed before they are released from `buf`.
///
/// End of input completes a message whose body runs until close.
///
/// # Errors
///
/// Returns [`ReadErrorKind::Eof`] if input ends inside the message.
pub async fn read_message<R, H>(
    reader: &mut HttpReader,
    io: &mut R,
    buf: &mut BytesMut,
    handler: &mut H,
) -> Result<(), ReadError>
where
    R: AsyncRead + Unpin,
    H: Handler + ?Sized,
{
    loop {
        let progress = reader.read(buf, handler)?;
        erase(buf, progress.consumed);

        if progress.status == Status::Success {
            return Ok(());
        }

        buf.reserve(READ_SIZE);
        if io.read_buf(buf).await? == 0 {
            debug!("http input closed after {} bytes", reader.consumed());
            return match reader.finish(handler) {
                Ok(()) => Ok(()),
                Err(Error::MoreData) => {
                    warning!("http input ended inside a message");
                    Err(ReadErrorKind::Eof.into())
                }
                Err(err) => Err(err.into()),
            };
        }
    }
}

/// Zero the first `n` bytes of `buf`, then drop them.
fn erase(buf: &mut BytesMut, n: usize) {
    buf[..n].fill(0);
    buf.advance(n);
}

// ===== Error =====

/// Error returned by [`read_message`].
#[derive(Debug)]
pub struct ReadError {
    kind: Box<ReadErrorKind>,
}

#[derive(Debug)]
pub enum ReadErrorKind {
    Io(std::io::Error),
    Http(Error),
    /// Input ended before the message was complete.
    Eof,
}

use ReadErrorKind as Kind;

impl ReadError {
    #[inline]
    pub fn kind(&self) -> &ReadErrorKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> ReadErrorKind {
        *self.kind
    }
}

impl From<ReadErrorKind> for ReadError {
    #[inline]
    fn from(kind: ReadErrorKind) -> Self {
        Self { kind: Box::new(kind) }
    }
}

impl From<std::io::Error> for ReadError {
    #[inline]
    fn from(v: std::io::Error) -> Self {
        Kind::Io(v).into()
    }
}

impl From<Error> for ReadError {
    #[inline]
    fn from(v: Error) -> Self {
        Kind::Http(v).into()
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            Kind::Io(err) => Some(err),
            Kind::Http(err) => Some(err),
            Kind::Eof => None,
        }
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.kind {
            Kind::Io(err) => write!(f, "io error: {err}"),
            Kind::Http(err) => write!(f, "http error: {err}"),
            Kind::Eof => f.write_str("unexpected end of input"),
        }
    }
}
