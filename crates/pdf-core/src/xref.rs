//! Cross-reference table reading for fixed-shape documents

use crate::stream::rfind;
use crate::{PdfError, Result};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

/// Width of the offset field of a classic xref entry
const OFFSET_DIGITS: usize = 10;

/// Fixed shape of a template document
///
/// The objects of the receipt template are not stored in ascending id
/// order, so the emission order is spelled out rather than derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLayout {
    /// Bytes written before the first object
    pub header: Vec<u8>,
    /// Number of xref entries, including the free entry 0
    pub size: usize,
    /// Object ids in the order they appear in the file
    pub order: Vec<u32>,
    /// Catalog object id (trailer `/Root`)
    pub root: u32,
    /// Document info object id (trailer `/Info`)
    pub info: u32,
}

impl ObjectLayout {
    /// Layout of the bank receipt template
    pub fn receipt() -> Self {
        Self {
            header: b"%PDF-1.6\r\n".to_vec(),
            size: 17,
            order: vec![5, 6, 7, 8, 9, 1, 2, 3, 4, 10, 11, 12, 13, 14, 15, 16],
            root: 1,
            info: 2,
        }
    }

    /// Check that `order` lists every id in `1..size` exactly once
    pub fn validate(&self) -> Result<()> {
        if self.order.len() + 1 != self.size {
            return Err(PdfError::InvalidLayout(format!(
                "order has {} ids but size is {}",
                self.order.len(),
                self.size
            )));
        }

        let mut seen = vec![false; self.size];
        for &id in &self.order {
            let slot = seen
                .get_mut(id as usize)
                .filter(|_| id != 0)
                .ok_or_else(|| PdfError::InvalidLayout(format!("object id {id} out of range")))?;
            if *slot {
                return Err(PdfError::InvalidLayout(format!("object id {id} listed twice")));
            }
            *slot = true;
        }

        for id in [self.root, self.info] {
            if id == 0 || id as usize >= self.size {
                return Err(PdfError::InvalidLayout(format!(
                    "trailer object {id} out of range"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ObjectLayout {
    fn default() -> Self {
        Self::receipt()
    }
}

/// Object byte ranges of a document, recovered from its xref table
///
/// Owns the source bytes; objects are handed out as slices.
#[derive(Debug, Clone)]
pub struct StructuralIndex {
    data: Vec<u8>,
    ranges: BTreeMap<u32, Range<usize>>,
    order: Vec<u32>,
    xref_offset: usize,
}

impl StructuralIndex {
    /// Parse the xref table found through the last `startxref` marker
    ///
    /// # Errors
    /// - `TruncatedIndex` if the table has fewer entries than `layout.size`
    /// - `CorruptOffset` if the marker, the table header or any offset is
    ///   unusable, or offsets are not increasing along `layout.order`
    pub fn parse(data: Vec<u8>, layout: &ObjectLayout) -> Result<Self> {
        layout.validate()?;

        let xref_offset = read_startxref(&data)?;
        let offsets = read_xref_entries(&data[xref_offset..], layout.size)?;

        let mut ranges = BTreeMap::new();
        for (pos, &id) in layout.order.iter().enumerate() {
            let start = offsets[id as usize];
            let end = match layout.order.get(pos + 1) {
                Some(&next) => offsets[next as usize],
                None => xref_offset,
            };
            if start > end || end > xref_offset {
                return Err(PdfError::CorruptOffset(format!(
                    "object {id} spans {start}..{end}, outside the object area (xref at {xref_offset})"
                )));
            }
            ranges.insert(id, start..end);
        }

        debug!(
            objects = ranges.len(),
            xref_offset,
            bytes = data.len(),
            "parsed structural index"
        );

        Ok(Self {
            data,
            ranges,
            order: layout.order.clone(),
            xref_offset,
        })
    }

    /// Raw bytes of one object, from `N 0 obj` up to the next object
    pub fn object(&self, id: u32) -> Result<&[u8]> {
        self.ranges
            .get(&id)
            .map(|range| &self.data[range.clone()])
            .ok_or(PdfError::MissingObject(id))
    }

    /// Byte offset of an object in the source document
    pub fn offset(&self, id: u32) -> Option<usize> {
        self.ranges.get(&id).map(|range| range.start)
    }

    /// Object ids in file order
    pub fn order(&self) -> &[u32] {
        &self.order
    }

    /// Offset of the xref table itself
    pub fn xref_offset(&self) -> usize {
        self.xref_offset
    }

    /// The complete source document
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Offset written after the last `startxref` keyword
fn read_startxref(data: &[u8]) -> Result<usize> {
    let marker = rfind(data, b"startxref")
        .ok_or_else(|| PdfError::CorruptOffset("startxref marker not found".to_string()))?;

    let rest = &data[marker + b"startxref".len()..];
    let digits: String = rest
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();

    let offset: usize = digits
        .parse()
        .map_err(|_| PdfError::CorruptOffset("startxref is not followed by a number".to_string()))?;
    if offset >= marker {
        return Err(PdfError::CorruptOffset(format!(
            "xref offset {offset} points past the startxref marker"
        )));
    }
    Ok(offset)
}

/// Read `xref`, the subsection line and `size` entries; return their offsets
fn read_xref_entries(table: &[u8], size: usize) -> Result<Vec<usize>> {
    let lines = split_lines(table, size + 2);
    let mut lines = lines.into_iter();

    match lines.next() {
        Some(line) if line.trim_ascii() == b"xref" => {}
        _ => {
            return Err(PdfError::CorruptOffset(
                "xref offset does not point at an xref table".to_string(),
            ))
        }
    }

    let subsection = lines.next().unwrap_or_default();
    if let Some(count) = subsection_count(subsection) {
        if count < size {
            return Err(PdfError::TruncatedIndex {
                expected: size,
                found: count,
            });
        }
    }

    let mut offsets = Vec::with_capacity(size);
    for line in lines.take_while(|line| !line.starts_with(b"trailer")) {
        let field = line
            .get(..OFFSET_DIGITS)
            .filter(|field| field.iter().all(u8::is_ascii_digit))
            .ok_or_else(|| {
                PdfError::CorruptOffset(format!(
                    "bad xref entry {:?}",
                    String::from_utf8_lossy(line)
                ))
            })?;
        // ten ASCII digits always parse
        let offset = std::str::from_utf8(field)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        offsets.push(offset);
    }

    if offsets.len() < size {
        return Err(PdfError::TruncatedIndex {
            expected: size,
            found: offsets.len(),
        });
    }
    Ok(offsets)
}

/// `0 17` -> 17
fn subsection_count(line: &[u8]) -> Option<usize> {
    let text = std::str::from_utf8(line).ok()?;
    let mut parts = text.split_whitespace();
    let _first = parts.next()?;
    parts.next()?.parse().ok()
}

/// Split on `\r\n`, `\n` or `\r`, keeping at most `max` lines
fn split_lines(data: &[u8], max: usize) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < data.len() && lines.len() < max {
        match data[i] {
            b'\r' => {
                lines.push(&data[start..i]);
                if data.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&data[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < data.len() && lines.len() < max {
        lines.push(&data[start..]);
    }
    lines
}
