// ABOUTME: Byte-chunk to text conversion for remote command output.
// ABOUTME: Strict 7-bit ASCII first, ISO-8859-1 as a fallback that cannot fail.

use std::borrow::Cow;

/// Which decoder produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Latin1,
}

/// Decoded form of one output chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedChunk<'a> {
    pub text: Cow<'a, str>,
    pub encoding: Encoding,
}

/// Decode a chunk. Any byte at or above 0x80 selects the fallback, in which
/// every byte maps to the code point of the same value.
pub fn decode_chunk(bytes: &[u8]) -> DecodedChunk<'_> {
    if bytes.is_ascii() {
        // ASCII is a subset of UTF-8, so this never takes the error branch.
        if let Ok(text) = std::str::from_utf8(bytes) {
            return DecodedChunk {
                text: Cow::Borrowed(text),
                encoding: Encoding::Ascii,
            };
        }
    }

    DecodedChunk {
        text: Cow::Owned(bytes.iter().copied().map(char::from).collect()),
        encoding: Encoding::Latin1,
    }
}

/// Decode a chunk straight to text.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    decode_chunk(bytes).text
}
