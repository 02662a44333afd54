//! Template Engine - field substitution for fixed-layout receipt PDFs
//!
//! This crate provides:
//! - Layout description types (object order, labels, field names)
//! - Layout parsing from JSON
//! - Placeholder discovery inside the template's content stream
//! - Field substitution producing a fresh document
//! - Text extraction from documents of the same layout
//!
//! # Example
//!
//! ```ignore
//! use template::{ReceiptFields, ReceiptTemplate, TemplateLayout};
//!
//! let template = ReceiptTemplate::open("pdf 16.pdf", TemplateLayout::receipt())?;
//! let values = ReceiptFields::default().into_values(
//!     "18.08.2025 17:34:11 мск",
//!     "C421808250875533",
//!     "A52301434118691P0000060011571101",
//! );
//! let pdf_bytes = template.substitute(&values, "0a3bf3ec9afc3fdd8e058d7c4b481b6c")?;
//! ```

pub mod parser;
mod renderer;
mod schema;

pub use parser::parse_layout;
pub use renderer::{extract_text, ReceiptTemplate};
pub use schema::*;

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template layout mismatch: found {found} of {expected} fields (missing: {missing:?})")]
    TemplateLayoutMismatch {
        expected: usize,
        found: usize,
        missing: Vec<String>,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid file ID: {0}")]
    InvalidFileId(String),

    #[error("Failed to parse layout: {0}")]
    ParseError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
