use crate::error::Error;

/// Character encoding named by a `charset` parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextCodec {
    /// No charset, or one this crate does not decode.
    #[default]
    Unknown,
    Utf8,
    Ascii,
    Iso8859_1,
}

impl TextCodec {
    /// Resolve a charset label, ignoring ASCII case.
    pub fn from_label(label: &str) -> TextCodec {
        const LABELS: [(&str, TextCodec); 9] = [
            ("utf-8", TextCodec::Utf8),
            ("utf8", TextCodec::Utf8),
            ("us-ascii", TextCodec::Ascii),
            ("ascii", TextCodec::Ascii),
            ("iso-8859-1", TextCodec::Iso8859_1),
            ("iso8859-1", TextCodec::Iso8859_1),
            ("iso_8859-1", TextCodec::Iso8859_1),
            ("latin1", TextCodec::Iso8859_1),
            ("l1", TextCodec::Iso8859_1),
        ];
        let label = label.trim_matches(|c| c == '"' || c == ' ');
        LABELS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map_or(TextCodec::Unknown, |(_, codec)| *codec)
    }

    /// Canonical charset label.
    pub const fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Utf8 => Some("utf-8"),
            Self::Ascii => Some("us-ascii"),
            Self::Iso8859_1 => Some("iso-8859-1"),
        }
    }

    /// Decode `bytes` into UTF-8 text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, Error> {
        match self {
            Self::Unknown => Err(Error::TextCodecFailure),
            Self::Utf8 => str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| Error::TextCodecFailure),
            Self::Ascii => match bytes.is_ascii() {
                // SAFETY: ASCII is valid UTF-8
                true => Ok(unsafe { str::from_utf8_unchecked(bytes) }.to_owned()),
                false => Err(Error::TextCodecFailure),
            },
            Self::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::TextCodec;
    use crate::error::Error;

    #[test]
    fn test_text_codec() {
        assert_eq!(TextCodec::from_label("UTF-8"), TextCodec::Utf8);
        assert_eq!(TextCodec::from_label("\"iso-8859-1\""), TextCodec::Iso8859_1);
        assert_eq!(TextCodec::from_label("koi8-r"), TextCodec::Unknown);

        assert_eq!(TextCodec::Iso8859_1.decode(b"caf\xe9").as_deref(), Ok("café"));
        assert_eq!(TextCodec::Ascii.decode(b"plain").as_deref(), Ok("plain"));
        assert_eq!(TextCodec::Ascii.decode(b"caf\xe9"), Err(Error::TextCodecFailure));
        assert_eq!(TextCodec::Utf8.decode(b"\xff"), Err(Error::TextCodecFailure));
    }
}
