//! Template loading and field substitution

use crate::parser::{discover_placeholders, replace_segments, shown_strings};
use crate::schema::{FieldValues, TemplateLayout};
use crate::{Result, TemplateError};
use pdf_core::stream::{deflate, flate_stream_object, latin1_decode, latin1_encode, object_stream};
use pdf_core::{write_document, GlyphCodec, ObjectLayout, StructuralIndex};
use receipt_ids::validate_file_id;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, trace};

/// A parsed template, ready to produce documents
///
/// Everything is computed once at construction; [`substitute`](Self::substitute)
/// only reads, so a template can be shared between threads.
#[derive(Debug, Clone)]
pub struct ReceiptTemplate {
    layout: TemplateLayout,
    objects: ObjectLayout,
    index: StructuralIndex,
    codec: GlyphCodec,
    content: String,
    placeholders: BTreeMap<String, String>,
}

impl ReceiptTemplate {
    /// Read and parse a template file
    pub fn open(path: impl AsRef<Path>, layout: TemplateLayout) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        info!(path = %path.as_ref().display(), bytes = data.len(), "loaded template");
        Self::from_bytes(data, layout)
    }

    /// Parse a template, taking the glyph table from its own CMap object
    pub fn from_bytes(data: Vec<u8>, layout: TemplateLayout) -> Result<Self> {
        let objects = layout.object_layout();
        let index = StructuralIndex::parse(data, &objects)?;
        let cmap = object_stream(index.object(layout.cmap_object)?)?;
        let codec = GlyphCodec::from_cmap(&cmap)?;
        Self::derive(index, codec, layout)
    }

    /// Locate the placeholders of every field of `layout`
    ///
    /// # Errors
    /// - `TemplateLayoutMismatch` if some field has no placeholder
    /// - `PdfError` if the content object is missing or not a readable stream
    pub fn derive(index: StructuralIndex, codec: GlyphCodec, layout: TemplateLayout) -> Result<Self> {
        let objects = layout.object_layout();
        let content = latin1_decode(&object_stream(index.object(layout.content_object)?)?);
        let placeholders = discover_placeholders(&content, &codec, &layout)?;

        debug!(
            fields = placeholders.len(),
            content_bytes = content.len(),
            "template derived"
        );

        Ok(Self {
            layout,
            objects,
            index,
            codec,
            content,
            placeholders,
        })
    }

    /// Let characters missing from the template font borrow codes from
    /// another glyph table
    pub fn with_fallback(mut self, secondary: &GlyphCodec) -> Self {
        self.codec = std::mem::take(&mut self.codec).with_fallback(secondary);
        self
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    pub fn codec(&self) -> &GlyphCodec {
        &self.codec
    }

    /// Decoded content stream text (Latin-1)
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Placeholder hex of every field
    pub fn placeholders(&self) -> &BTreeMap<String, String> {
        &self.placeholders
    }

    /// Current text of a field as rendered in the template
    pub fn field_text(&self, field: &str) -> Option<String> {
        self.placeholders
            .get(field)
            .map(|hex| self.codec.decode(hex))
    }

    /// Content stream text with `values` substituted
    ///
    /// Fields missing from `values` keep the template text.
    ///
    /// # Errors
    /// - `UnknownField` for a name the template has no placeholder for
    /// - `PdfError(UnknownGlyph)` if a value has a character the font lacks
    pub fn render_content(&self, values: &FieldValues) -> Result<String> {
        if let Some(name) = values.keys().find(|k| !self.placeholders.contains_key(*k)) {
            return Err(TemplateError::UnknownField(name.clone()));
        }

        let line_feed = self.layout.line_feed_code.as_str();
        let mut replacements: HashMap<&str, String> = HashMap::new();
        for field in self.layout.field_names() {
            let (Some(old), Some(value)) = (self.placeholders.get(field), values.get(field)) else {
                continue;
            };

            let mut new = self.codec.encode(value)?;
            if old.ends_with(line_feed) && !new.ends_with(line_feed) {
                new.push_str(line_feed);
            }
            trace!(field, old = %old, new = %new, "field encoded");
            // a later field sharing the placeholder overrides an earlier one
            replacements.insert(old.as_str(), new);
        }

        Ok(replace_segments(&self.content, &replacements))
    }

    /// Produce a new document with `values` substituted and `file_id` as
    /// the trailer identifier
    ///
    /// The template is not modified. Nothing is returned unless every
    /// value could be encoded.
    pub fn substitute(&self, values: &FieldValues, file_id: &str) -> Result<Vec<u8>> {
        validate_file_id(file_id).map_err(|_| TemplateError::InvalidFileId(file_id.to_string()))?;

        let content = self.render_content(values)?;
        let content_id = self.layout.content_object;

        let content_object = if content == self.content {
            debug!("content unchanged, reusing template stream");
            self.index.object(content_id)?.to_vec()
        } else {
            let compressed = deflate(&latin1_encode(&content)?)?;
            flate_stream_object(content_id, &compressed)
        };

        let out = write_document(
            &self.objects,
            |id| {
                if id == content_id {
                    Ok(content_object.as_slice())
                } else {
                    self.index.object(id)
                }
            },
            file_id,
        )?;

        info!(bytes = out.len(), fields = values.len(), "document generated");
        Ok(out)
    }
}

/// Decoded text of every `<HEX> Tj` operation of a document
///
/// Unlike template loading this never fails on unknown codes; they show
/// up as `?`.
pub fn extract_text(data: Vec<u8>, layout: &TemplateLayout) -> Result<Vec<String>> {
    let index = StructuralIndex::parse(data, &layout.object_layout())?;
    let codec = GlyphCodec::from_cmap(&object_stream(index.object(layout.cmap_object)?)?)?;
    let content = latin1_decode(&object_stream(index.object(layout.content_object)?)?);

    Ok(shown_strings(&content)
        .into_iter()
        .map(|hex| codec.decode(hex))
        .collect())
}
