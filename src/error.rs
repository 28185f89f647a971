/// HTTP message error.
///
/// Every variant except [`MoreData`][Error::MoreData] is fatal for the reader that returned it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// Caller misuse, such as writing a request without a method.
    InvalidUse,
    /// Start line version field does not begin with `HTTP/`.
    NotHttp,
    /// Version is neither `1.0` nor `1.1`.
    UnknownVersion,
    /// Start line does not have exactly three fields, or a field is invalid.
    StartLineMalformed,
    /// Start line exceeds its size limit.
    StartLineTooLong,
    /// Request method is not one of the supported methods.
    RequestMethodUnrecognized,
    /// Request target is empty or invalid.
    UriInvalid,
    /// Header section exceeds its size limit.
    HeaderTooLong,
    /// Obsolete line folding.
    HeaderFolded,
    /// Header line is not `key: value`, or whitespace precedes the colon.
    HeaderInvalidSyntax,
    /// `Content-Length` with chunked `Transfer-Encoding`, or a repeated `Content-Length`.
    HeaderDuplicateFraming,
    /// `Content-Length` is not a non-negative decimal.
    ContentLengthMalformed,
    /// Chunk size line exceeds its size limit.
    ChunkStartTooLong,
    /// Chunk size is not a valid hex number.
    ChunkLengthInvalid,
    /// Chunk size line is malformed.
    ChunkMalformed,
    /// Chunk data is not followed by CRLF.
    ChunkDataMalformed,
    /// Chunk extensions rejected by policy.
    ChunkExtensionNotAllowed,
    /// Chunk extension is malformed.
    ChunkExtensionMalformed,
    /// Multipart content type without a usable boundary.
    MultipartNoBoundary,
    /// Multipart request without a declared length.
    MultipartInvalid,
    /// Multipart body ended before any part was read.
    MultipartMissingPart,
    /// Multipart body ended before the final boundary.
    MultipartMissingFinalBoundary,
    /// Multipart boundary is followed by neither `--` nor CRLF.
    MultipartInvalidFraming,
    /// Trailers rejected by policy.
    TrailerNotAllowed,
    /// Body could not be decoded with its charset.
    TextCodecFailure,
    /// Parsing stopped by the event handler.
    UserAbort,
    /// Input ended before the message was complete.
    MoreData,
    /// `Content-Length` required by policy but missing.
    LengthRequired,
    /// Body format not supported by the consumer.
    UnsupportedData,
}

impl Error {
    /// Returns the error description.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidUse => "invalid use",
            Self::NotHttp => "not an http message",
            Self::UnknownVersion => "unknown http version",
            Self::StartLineMalformed => "malformed start line",
            Self::StartLineTooLong => "start line too long",
            Self::RequestMethodUnrecognized => "unrecognized request method",
            Self::UriInvalid => "invalid request uri",
            Self::HeaderTooLong => "header section too long",
            Self::HeaderFolded => "folded header line",
            Self::HeaderInvalidSyntax => "invalid header syntax",
            Self::HeaderDuplicateFraming => "duplicate message framing headers",
            Self::ContentLengthMalformed => "malformed content length",
            Self::ChunkStartTooLong => "chunk size line too long",
            Self::ChunkLengthInvalid => "invalid chunk size",
            Self::ChunkMalformed => "malformed chunk size line",
            Self::ChunkDataMalformed => "chunk data not terminated by crlf",
            Self::ChunkExtensionNotAllowed => "chunk extensions not allowed",
            Self::ChunkExtensionMalformed => "malformed chunk extension",
            Self::MultipartNoBoundary => "multipart without boundary",
            Self::MultipartInvalid => "multipart request without length",
            Self::MultipartMissingPart => "multipart without parts",
            Self::MultipartMissingFinalBoundary => "multipart without final boundary",
            Self::MultipartInvalidFraming => "invalid multipart framing",
            Self::TrailerNotAllowed => "trailers not allowed",
            Self::TextCodecFailure => "body text decoding failed",
            Self::UserAbort => "aborted by handler",
            Self::MoreData => "more data required",
            Self::LengthRequired => "content length required",
            Self::UnsupportedData => "unsupported body format",
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Error({:?})", self.message())
    }
}
