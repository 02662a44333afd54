//! Stream objects: locating, inflating and re-emitting payloads

use crate::{PdfError, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// zlib level used when recompressing content streams
pub const DEFLATE_LEVEL: u32 = 6;

/// A stream object split into its dictionary and raw (still encoded) payload
#[derive(Debug, Clone, Copy)]
pub struct RawStream<'a> {
    /// Bytes from the start of the object up to the `stream` keyword
    pub dict: &'a [u8],
    /// Payload between `stream<EOL>` and `<EOL>endstream`
    pub data: &'a [u8],
}

impl RawStream<'_> {
    /// Whether the stream dictionary names the FlateDecode filter
    pub fn is_flate(&self) -> bool {
        find(self.dict, b"/FlateDecode", 0).is_some()
    }

    /// Payload with filters undone (only FlateDecode is supported)
    pub fn decoded(&self) -> Result<Vec<u8>> {
        if self.is_flate() {
            inflate(self.data)
        } else {
            Ok(self.data.to_vec())
        }
    }
}

/// Split an `N 0 obj ... stream ... endstream ... endobj` byte range
///
/// The payload length comes from a direct `/Length` entry when it is
/// consistent with the bytes; otherwise the payload runs up to the last
/// `endstream` keyword.
pub fn split_stream(object: &[u8]) -> Result<RawStream<'_>> {
    let keyword = find_stream_keyword(object)
        .ok_or_else(|| PdfError::StreamError("object has no stream keyword".to_string()))?;

    let mut start = keyword + b"stream".len();
    if object[start..].starts_with(b"\r\n") {
        start += 2;
    } else if object[start..].starts_with(b"\n") {
        start += 1;
    }

    let dict = &object[..keyword];
    if let Some(length) = declared_length(dict) {
        let end = start + length;
        if end <= object.len() && endstream_follows(&object[end..]) {
            return Ok(RawStream {
                dict,
                data: &object[start..end],
            });
        }
    }

    let mut end = rfind(object, b"endstream")
        .filter(|&pos| pos >= start)
        .ok_or_else(|| PdfError::StreamError("stream is not terminated".to_string()))?;
    if object[start..end].ends_with(b"\r\n") {
        end -= 2;
    } else if object[start..end].ends_with(b"\n") || object[start..end].ends_with(b"\r") {
        end -= 1;
    }

    Ok(RawStream {
        dict,
        data: &object[start..end],
    })
}

/// Decoded payload of a stream object
pub fn object_stream(object: &[u8]) -> Result<Vec<u8>> {
    split_stream(object)?.decoded()
}

/// Inflate a zlib (FlateDecode) payload
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| PdfError::StreamError(format!("inflate failed: {e}")))?;
    Ok(out)
}

/// Deflate a payload as a zlib stream at [`DEFLATE_LEVEL`]
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(DEFLATE_LEVEL));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Serialize a FlateDecode stream object with a fresh `/Length`
pub fn flate_stream_object(id: u32, compressed: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(compressed.len() + 96);
    out.extend_from_slice(format!("{id} 0 obj\r\n").as_bytes());
    out.extend_from_slice(
        format!("<< /Length {} /Filter /FlateDecode >>\r\n", compressed.len()).as_bytes(),
    );
    out.extend_from_slice(b"stream\r\n");
    out.extend_from_slice(compressed);
    out.extend_from_slice(b"\r\nendstream\r\nendobj\r\n");
    out
}

/// Map every byte to the char with the same value (ISO-8859-1)
pub fn latin1_decode(data: &[u8]) -> String {
    data.iter().map(|&b| b as char).collect()
}

/// Inverse of [`latin1_decode`]; fails on characters above U+00FF
pub fn latin1_encode(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(c).map_err(|_| {
                PdfError::StreamError(format!("character {c:?} does not fit in one byte"))
            })
        })
        .collect()
}

/// Position of `needle` in `haystack` at or after `from`
pub fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Position of the last occurrence of `needle` in `haystack`
pub fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

/// First `stream` keyword that is not the tail of `endstream`
fn find_stream_keyword(object: &[u8]) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = find(object, b"stream", from) {
        let after = &object[pos + b"stream".len()..];
        let is_end = pos >= 3 && &object[pos - 3..pos] == b"end";
        if !is_end && (after.starts_with(b"\r") || after.starts_with(b"\n")) {
            return Some(pos);
        }
        from = pos + 1;
    }
    None
}

/// Direct `/Length N` value; `None` for indirect references
fn declared_length(dict: &[u8]) -> Option<usize> {
    let pos = find(dict, b"/Length", 0)?;
    let rest = &dict[pos + b"/Length".len()..];
    let rest = trim_ascii_start(rest);
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    // `/Length 12 0 R`
    if trim_ascii_start(&rest[digits..])
        .first()
        .is_some_and(u8::is_ascii_digit)
    {
        return None;
    }
    std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()
}

fn endstream_follows(tail: &[u8]) -> bool {
    trim_ascii_start(tail).starts_with(b"endstream")
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &bytes[skip..]
}
