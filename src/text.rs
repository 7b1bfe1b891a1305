//! Reading byte streams as text.
//!
//! [`read_all_text`] drains a stream, decodes it with an [`Encoding`], and
//! returns its lines concatenated *without* separators: `"ab\ncd\n"` reads
//! as `"abcd"`. Lines end at `\n`, `\r\n`, or a lone `\r`.
//!
//! The stream is released through [`with_resource`] whether or not the read
//! succeeds, and a failure never yields partial text.
//!
//! # Example
//!
//! ```rust
//! use undertow::text::{read_all_text, Encoding};
//!
//! let text = read_all_text(&b"ab\ncd\n"[..], Encoding::Utf8).unwrap();
//! assert_eq!(text, "abcd");
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::resource::{with_resource, Close};

/// A character encoding understood by [`read_all_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// UTF-8. A byte order mark is kept as `U+FEFF`.
    #[default]
    Utf8,
    /// UTF-16 with byte order taken from a leading byte order mark,
    /// big-endian when there is none. The mark is not part of the text.
    Utf16,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-16, big-endian.
    Utf16Be,
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    Latin1,
    /// US-ASCII. Bytes above `0x7F` are rejected.
    Ascii,
}

impl Encoding {
    /// Every supported encoding.
    pub const ALL: [Encoding; 6] = [
        Encoding::Utf8,
        Encoding::Utf16,
        Encoding::Utf16Le,
        Encoding::Utf16Be,
        Encoding::Latin1,
        Encoding::Ascii,
    ];

    /// Look up an encoding by label, ignoring case and surrounding
    /// whitespace.
    ///
    /// ```rust
    /// use undertow::text::Encoding;
    ///
    /// assert_eq!(Encoding::for_label("utf8"), Some(Encoding::Utf8));
    /// assert_eq!(Encoding::for_label(" ISO-8859-1 "), Some(Encoding::Latin1));
    /// assert_eq!(Encoding::for_label("ebcdic"), None);
    /// ```
    pub fn for_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Encoding::Utf8),
            "utf-16" | "utf16" => Some(Encoding::Utf16),
            "utf-16le" | "utf16le" => Some(Encoding::Utf16Le),
            "utf-16be" | "utf16be" => Some(Encoding::Utf16Be),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Some(Encoding::Latin1),
            "us-ascii" | "ascii" => Some(Encoding::Ascii),
            _ => None,
        }
    }

    /// The canonical label.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16 => "UTF-16",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Latin1 => "ISO-8859-1",
            Encoding::Ascii => "US-ASCII",
        }
    }

    /// Decode `bytes`, failing at the first byte that is not valid input.
    pub fn decode(self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| DecodeError::new(self, e.valid_up_to(), "invalid UTF-8 sequence")),
            Encoding::Utf16 => match bytes {
                [0xFE, 0xFF, rest @ ..] => self.decode_utf16(rest, 2, u16::from_be_bytes),
                [0xFF, 0xFE, rest @ ..] => self.decode_utf16(rest, 2, u16::from_le_bytes),
                _ => self.decode_utf16(bytes, 0, u16::from_be_bytes),
            },
            Encoding::Utf16Le => self.decode_utf16(bytes, 0, u16::from_le_bytes),
            Encoding::Utf16Be => self.decode_utf16(bytes, 0, u16::from_be_bytes),
            Encoding::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(DecodeError::new(self, offset, "byte outside US-ASCII")),
                None => Ok(bytes.iter().copied().map(char::from).collect()),
            },
        }
    }

    fn decode_utf16(
        self,
        bytes: &[u8],
        base: usize,
        unit: fn([u8; 2]) -> u16,
    ) -> Result<String, DecodeError> {
        let (whole, tail) = bytes.split_at(bytes.len() - bytes.len() % 2);
        let units = whole.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
        let mut text = String::with_capacity(whole.len() / 2);
        let mut offset = base;
        for decoded in char::decode_utf16(units) {
            match decoded {
                Ok(c) => {
                    offset += c.len_utf16() * 2;
                    text.push(c);
                }
                Err(_) => return Err(DecodeError::new(self, offset, "unpaired UTF-16 surrogate")),
            }
        }

        if !tail.is_empty() {
            return Err(DecodeError::new(
                self,
                base + whole.len(),
                "truncated UTF-16 code unit",
            ));
        }
        Ok(text)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::for_label(s).ok_or_else(|| UnknownEncoding(s.to_string()))
    }
}

/// A label that names no supported [`Encoding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEncoding(pub String);

impl fmt::Display for UnknownEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown character encoding: {}", self.0)
    }
}

impl std::error::Error for UnknownEncoding {}

/// Input that is not valid in the requested encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    encoding: Encoding,
    offset: usize,
    reason: &'static str,
}

impl DecodeError {
    fn new(encoding: Encoding, offset: usize, reason: &'static str) -> Self {
        DecodeError {
            encoding,
            offset,
            reason,
        }
    }

    /// The encoding that rejected the input.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Byte offset of the first undecodable input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// What was wrong with the input.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} input at byte {}: {}",
            self.encoding, self.offset, self.reason
        )
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

/// Concatenate the lines of `text`, dropping every line terminator.
///
/// ```rust
/// use undertow::text::concat_lines;
///
/// assert_eq!(concat_lines("ab\r\ncd\ref\n"), "abcdef");
/// ```
pub fn concat_lines(text: &str) -> String {
    text.split(['\r', '\n']).collect()
}

fn read_decoded<R: Read + ?Sized>(stream: &mut R, encoding: Encoding) -> io::Result<String> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    let text = encoding.decode(&bytes)?;
    tracing::debug!(encoding = %encoding, bytes = bytes.len(), "decoded stream");
    Ok(concat_lines(&text))
}

/// Read `stream` to the end as `encoding` and return its lines joined with
/// no separator.
///
/// The stream is closed on every path. Decoding failures are reported as
/// [`io::ErrorKind::InvalidData`] wrapping a [`DecodeError`].
///
/// ```rust
/// use std::io::{self, Cursor};
/// use undertow::text::{read_all_text, Encoding};
///
/// let err = read_all_text(Cursor::new(vec![0x61, 0xFF]), Encoding::Utf8).unwrap_err();
/// assert_eq!(err.kind(), io::ErrorKind::InvalidData);
/// ```
pub fn read_all_text<R>(stream: R, encoding: Encoding) -> io::Result<String>
where
    R: Read + Close,
    io::Error: From<R::Error>,
{
    with_resource(|| Ok(stream), |stream| read_decoded(stream, encoding))
}

/// Open the file at `path` and read it like [`read_all_text`].
pub fn read_file_text<P: AsRef<Path>>(path: P, encoding: Encoding) -> io::Result<String> {
    with_resource(|| File::open(path), |file| read_decoded(file, encoding))
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Encoding;

    impl Serialize for Encoding {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for Encoding {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let label = String::deserialize(deserializer)?;
            label.parse().map_err(serde::de::Error::custom)
        }
    }
}
