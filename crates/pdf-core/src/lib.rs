//! PDF Core - Byte-level PDF plumbing for fixed-layout templates
//!
//! This crate provides functionality for:
//! - Mapping font codes to Unicode characters through a ToUnicode CMap
//! - Reading the classic cross-reference table of a known-shape document
//! - Inflating and deflating content streams
//! - Re-emitting a document with recomputed offsets and trailer
//!
//! Nothing here is a general PDF parser. The document shape is described
//! up front by an [`ObjectLayout`] and every deviation is an error.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{GlyphCodec, ObjectLayout, StructuralIndex};
//!
//! let index = StructuralIndex::parse(std::fs::read("template.pdf")?, &ObjectLayout::receipt())?;
//! let cmap = pdf_core::stream::object_stream(index.object(14)?)?;
//! let codec = GlyphCodec::from_cmap(&cmap)?;
//! assert_eq!(codec.decode(&codec.encode("RUR")?), "RUR");
//! ```

pub mod cmap;
pub mod stream;
pub mod writer;
pub mod xref;

pub use cmap::GlyphCodec;
pub use writer::write_document;
pub use xref::{ObjectLayout, StructuralIndex};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Malformed character map: {0}")]
    MalformedResource(String),

    #[error("No glyph code for character {0:?}")]
    UnknownGlyph(char),

    #[error("Cross-reference table truncated: expected {expected} entries, found {found}")]
    TruncatedIndex { expected: usize, found: usize },

    #[error("Corrupt offset: {0}")]
    CorruptOffset(String),

    #[error("Invalid object layout: {0}")]
    InvalidLayout(String),

    #[error("Object {0} not found")]
    MissingObject(u32),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
