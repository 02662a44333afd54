//! Layout parsing and content stream scanning

use crate::{Result, TemplateError, TemplateLayout};
use lazy_static::lazy_static;
use pdf_core::cmap::{CODE_WIDTH, NBSP};
use pdf_core::GlyphCodec;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

lazy_static! {
    /// Bracketed hex string operand
    static ref HEX_SEGMENT: Regex = Regex::new(r"<([0-9A-F]+)>").unwrap();

    /// Hex string shown with `Tj`
    static ref SHOW_TEXT: Regex = Regex::new(r"<([0-9A-F]+)> Tj").unwrap();
}

/// Parse a layout from JSON string
pub fn parse_layout(json: &str) -> Result<TemplateLayout> {
    serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))
}

/// Every bracketed hex run of a content stream, brackets stripped
pub fn hex_segments(content: &str) -> Vec<&str> {
    HEX_SEGMENT
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Operands of the `<HEX> Tj` operators of a content stream
pub fn shown_strings(content: &str) -> Vec<&str> {
    SHOW_TEXT
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Text of a segment for caption matching
///
/// Unknown codes are dropped, NBSP becomes a space and the result is
/// trimmed.
pub fn segment_text(codec: &GlyphCodec, hex: &str) -> String {
    let text: String = hex
        .as_bytes()
        .chunks(CODE_WIDTH)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|code| codec.char_for(code))
        .map(|c| if c == NBSP { ' ' } else { c })
        .collect();
    text.trim().to_string()
}

/// Find the placeholder hex of every field
///
/// A placeholder is the first non-blank segment after a segment whose
/// text equals one of the layout's captions. When a field is found more
/// than once the last occurrence wins.
///
/// # Errors
/// `TemplateLayoutMismatch` unless every field of the layout was found
pub fn discover_placeholders(
    content: &str,
    codec: &GlyphCodec,
    layout: &TemplateLayout,
) -> Result<BTreeMap<String, String>> {
    let segments = hex_segments(content);
    let texts: Vec<String> = segments
        .iter()
        .map(|hex| segment_text(codec, hex))
        .collect();

    let mut placeholders = BTreeMap::new();
    let mut i = 0;
    while i < segments.len() {
        let Some(label) = layout.labels.iter().find(|l| l.label == texts[i]) else {
            i += 1;
            continue;
        };

        i += 1;
        while i < segments.len() && texts[i].is_empty() {
            i += 1;
        }
        if let Some(hex) = segments.get(i) {
            trace!(field = %label.field, placeholder = %hex, "placeholder found");
            placeholders.insert(label.field.clone(), hex.to_string());
        }
    }

    let names = layout.field_names();
    if placeholders.len() != names.len() {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !placeholders.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        return Err(TemplateError::TemplateLayoutMismatch {
            expected: names.len(),
            found: placeholders.len(),
            missing,
        });
    }

    Ok(placeholders)
}

/// Swap bracketed hex runs that exactly match a key of `replacements`
///
/// Runs are only ever replaced whole; a placeholder that happens to be
/// a substring of a longer run is left alone.
pub fn replace_segments(content: &str, replacements: &HashMap<&str, String>) -> String {
    HEX_SEGMENT
        .replace_all(content, |caps: &Captures| match replacements.get(&caps[1]) {
            Some(new) => format!("<{new}>"),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldLabel;
    use pretty_assertions::assert_eq;

    const CMAP: &str = "\
begincmap
5 beginbfchar
<000A> <00A0>
<0011> <0410>
<0012> <0411>
<0013> <0031>
<0014> <0032>
endbfchar
endcmap
";

    fn codec() -> GlyphCodec {
        GlyphCodec::from_cmap(CMAP.as_bytes()).unwrap()
    }

    fn layout() -> TemplateLayout {
        TemplateLayout {
            labels: vec![FieldLabel::new("А", "first"), FieldLabel::new("Б", "second")],
            ..TemplateLayout::receipt()
        }
    }

    #[test]
    fn test_parse_layout_defaults() {
        let layout = parse_layout(r#"{"contentObject": 3, "labels": []}"#).unwrap();
        assert_eq!(layout.content_object, 3);
        assert_eq!(layout.cmap_object, 14);
        assert_eq!(layout.size, 17);
        assert!(layout.labels.is_empty());
    }

    #[test]
    fn test_parse_layout_invalid() {
        let result = parse_layout("{ not json");
        assert!(matches!(result, Err(TemplateError::ParseError(_))));
    }

    #[test]
    fn test_hex_segments() {
        let content = "BT <0011> Tj ET\n<< /Dict 1 >> [<0013000A>] TJ <abc>";
        assert_eq!(hex_segments(content), vec!["0011", "0013000A"]);
        assert_eq!(shown_strings(content), vec!["0011"]);
    }

    #[test]
    fn test_segment_text() {
        let codec = codec();
        assert_eq!(segment_text(&codec, "000A0011000A"), "А");
        assert_eq!(segment_text(&codec, "000A000A"), "");
        // unknown codes vanish instead of becoming '?'
        assert_eq!(segment_text(&codec, "FFFF0013"), "1");
    }

    #[test]
    fn test_discover_skips_blank_segments() {
        let content = "<0011> Tj <000A> Tj <000A000A> Tj <0013000A> Tj <0012> Tj <0014> Tj";
        let found = discover_placeholders(content, &codec(), &layout()).unwrap();
        assert_eq!(found["first"], "0013000A");
        assert_eq!(found["second"], "0014");
    }

    #[test]
    fn test_discover_skips_segments_of_unknown_codes() {
        let content = "<0011> Tj <FFFF> Tj <FFFE000A> Tj <0013> Tj <0012> Tj <0014> Tj";
        let found = discover_placeholders(content, &codec(), &layout()).unwrap();
        assert_eq!(found["first"], "0013");
    }

    #[test]
    fn test_discover_reports_missing_fields() {
        let content = "<0011> Tj <0013> Tj <0012> Tj";
        let err = discover_placeholders(content, &codec(), &layout()).unwrap_err();
        match err {
            TemplateError::TemplateLayoutMismatch {
                expected,
                found,
                missing,
            } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
                assert_eq!(missing, vec!["second".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_replace_segments_whole_runs_only() {
        let mut replacements = HashMap::new();
        replacements.insert("0013", "0014".to_string());
        let content = "<0013> Tj <00130013> Tj <0013> Tj";
        assert_eq!(
            replace_segments(content, &replacements),
            "<0014> Tj <00130013> Tj <0014> Tj"
        );
    }
}
