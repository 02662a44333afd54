//! ToUnicode CMap parsing and glyph code encoding

use crate::stream::latin1_decode;
use crate::{PdfError, Result};
use lopdf::{Document, Object};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Non-breaking space. Receipt templates draw every word gap with it.
pub const NBSP: char = '\u{00A0}';

/// Character substituted for codes missing from the map when decoding
pub const UNKNOWN_CHAR: char = '?';

/// Width of one glyph code in hex digits (two-byte CIDs)
pub const CODE_WIDTH: usize = 4;

/// Bidirectional mapping between two-byte font codes and Unicode characters
///
/// Codes are stored as upper-case hex strings, the same form they take
/// inside `<...>` show strings of a content stream.
#[derive(Debug, Clone, Default)]
pub struct GlyphCodec {
    code_to_char: HashMap<String, char>,
    char_to_code: HashMap<char, String>,
}

impl GlyphCodec {
    /// Build a codec from the decoded bytes of a ToUnicode CMap
    ///
    /// Every line whose first two tokens are `<SRC>` and `<DST>` contributes
    /// one mapping, DST being UTF-16BE. Other lines are skipped. A later line
    /// overrides an earlier one for the same code or character.
    ///
    /// # Errors
    /// `MalformedResource` when no mapping line could be read at all.
    pub fn from_cmap(data: &[u8]) -> Result<Self> {
        let codec = Self::parse_lines(data);
        if codec.is_empty() {
            return Err(PdfError::MalformedResource(
                "no <code> <unicode> mapping lines found".to_string(),
            ));
        }

        debug!(codes = codec.code_to_char.len(), "parsed ToUnicode CMap");
        Ok(codec)
    }

    /// Collect the ToUnicode CMaps of every font on every page of a PDF
    ///
    /// Used as a secondary source of glyph codes. Fonts without a
    /// `/ToUnicode` entry are skipped; later fonts override earlier ones.
    pub fn from_pdf_fonts(data: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(data)?;
        let mut codec = Self::default();

        for page_id in doc.get_pages().into_values() {
            for (name, font) in doc.get_page_fonts(page_id) {
                let stream = match font.get(b"ToUnicode") {
                    Ok(Object::Reference(id)) => doc.get_object(*id)?.as_stream()?,
                    Ok(Object::Stream(stream)) => stream,
                    _ => {
                        trace!(font = %String::from_utf8_lossy(&name), "font has no ToUnicode");
                        continue;
                    }
                };
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                codec.extend(Self::parse_lines(&content));
            }
        }

        debug!(
            chars = codec.char_to_code.len(),
            "collected glyph codes from PDF fonts"
        );
        Ok(codec)
    }

    /// Add every character of `secondary` that this codec cannot encode yet
    ///
    /// Existing entries are never overwritten. Only the encoding direction
    /// is extended; decoding keeps using the primary map.
    pub fn with_fallback(mut self, secondary: &GlyphCodec) -> Self {
        let before = self.char_to_code.len();
        for (ch, code) in &secondary.char_to_code {
            self.char_to_code
                .entry(*ch)
                .or_insert_with(|| code.clone());
        }
        debug!(
            added = self.char_to_code.len() - before,
            "merged fallback glyph codes"
        );
        self
    }

    /// Encode text as a hex string of glyph codes (without angle brackets)
    ///
    /// Spaces are encoded as [`NBSP`]. Fails on the first character that
    /// has no code, so a partial encoding is never returned.
    pub fn encode(&self, text: &str) -> Result<String> {
        text.chars()
            .map(|c| if c == ' ' { NBSP } else { c })
            .map(|c| {
                self.char_to_code
                    .get(&c)
                    .map(String::as_str)
                    .ok_or(PdfError::UnknownGlyph(c))
            })
            .collect()
    }

    /// Decode a hex string of glyph codes
    ///
    /// Unknown or incomplete codes become [`UNKNOWN_CHAR`].
    pub fn decode(&self, hex: &str) -> String {
        hex.as_bytes()
            .chunks(CODE_WIDTH)
            .map(|chunk| {
                std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|code| self.char_for(code))
                    .unwrap_or(UNKNOWN_CHAR)
            })
            .collect()
    }

    /// Glyph code for a character, if known
    pub fn code_for(&self, c: char) -> Option<&str> {
        self.char_to_code.get(&c).map(String::as_str)
    }

    /// Character for a glyph code, if known
    pub fn char_for(&self, code: &str) -> Option<char> {
        self.code_to_char
            .get(code)
            .or_else(|| self.code_to_char.get(&code.to_ascii_uppercase()))
            .copied()
    }

    /// Number of codes this codec can decode
    pub fn len(&self) -> usize {
        self.code_to_char.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_to_char.is_empty()
    }

    fn parse_lines(data: &[u8]) -> Self {
        let text = latin1_decode(data);
        let mut codec = Self::default();
        for line in text.split(['\r', '\n']) {
            if let Some((code, ch)) = parse_mapping_line(line) {
                codec.insert(code, ch);
            }
        }
        codec
    }

    fn insert(&mut self, code: String, ch: char) {
        self.char_to_code.insert(ch, code.clone());
        self.code_to_char.insert(code, ch);
    }

    fn extend(&mut self, other: GlyphCodec) {
        self.code_to_char.extend(other.code_to_char);
        self.char_to_code.extend(other.char_to_code);
    }
}

/// Parse `<SRC> <DST> ...` into an upper-case code and one character
fn parse_mapping_line(line: &str) -> Option<(String, char)> {
    if !line.starts_with('<') || !line.contains('>') {
        return None;
    }

    let mut parts = line.split_whitespace();
    let src = strip_brackets(parts.next()?)?;
    let dst = strip_brackets(parts.next()?)?;

    let bytes = hex::decode(dst).ok()?;
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let decoded: String = char::decode_utf16(units)
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some((src.to_ascii_uppercase(), ch)),
        _ => {
            trace!(line, "skipping mapping that is not a single character");
            None
        }
    }
}

/// `<0041>` -> `0041`
fn strip_brackets(token: &str) -> Option<&str> {
    token.strip_prefix('<')?.strip_suffix('>')
}
