//! Document assembly with a freshly computed xref table

use crate::xref::ObjectLayout;
use crate::Result;
use tracing::debug;

/// Concatenate objects in layout order and append xref, trailer and footer
///
/// `object` supplies the serialized bytes of each id in `layout.order`.
/// `file_id` is written twice as the trailer `/ID` pair; it is expected
/// to be hex already.
pub fn write_document<'a, F>(
    layout: &ObjectLayout,
    mut object: F,
    file_id: &str,
) -> Result<Vec<u8>>
where
    F: FnMut(u32) -> Result<&'a [u8]>,
{
    layout.validate()?;

    let mut out = Vec::new();
    out.extend_from_slice(&layout.header);

    let mut offsets = vec![0usize; layout.size];
    for &id in &layout.order {
        offsets[id as usize] = out.len();
        out.extend_from_slice(object(id)?);
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\r\n0 {}\r\n", layout.size).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f\r\n");
    for offset in &offsets[1..] {
        out.extend_from_slice(format!("{offset:010} 00000 n\r\n").as_bytes());
    }

    out.extend_from_slice(
        format!(
            "trailer\r\n<<\r\n/Size {}\r\n/Root {} 0 R\r\n/Info {} 0 R\r\n",
            layout.size, layout.root, layout.info
        )
        .as_bytes(),
    );
    out.extend_from_slice(format!("/ID [<{file_id}><{file_id}>]\r\n").as_bytes());
    out.extend_from_slice(b">>\r\nstartxref\r\n");
    out.extend_from_slice(format!("{xref_offset}\r\n%%EOF\r\n").as_bytes());

    debug!(bytes = out.len(), xref_offset, "assembled document");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PdfError;
    use pretty_assertions::assert_eq;

    const FILE_ID: &str = "0a3bf3ec9afc3fdd8e058d7c4b481b6c";

    fn tiny_layout() -> ObjectLayout {
        ObjectLayout {
            header: b"%PDF-1.6\r\n".to_vec(),
            size: 3,
            order: vec![2, 1],
            root: 1,
            info: 2,
        }
    }

    #[test]
    fn test_write_document_exact_bytes() {
        let out = write_document(
            &tiny_layout(),
            |id| match id {
                1 => Ok(&b"1 0 obj\r\nA\r\nendobj\r\n"[..]),
                _ => Ok(&b"2 0 obj\r\nB\r\nendobj\r\n"[..]),
            },
            FILE_ID,
        )
        .unwrap();

        let expected = format!(
            "%PDF-1.6\r\n\
             2 0 obj\r\nB\r\nendobj\r\n\
             1 0 obj\r\nA\r\nendobj\r\n\
             xref\r\n0 3\r\n\
             0000000000 65535 f\r\n\
             0000000030 00000 n\r\n\
             0000000010 00000 n\r\n\
             trailer\r\n<<\r\n/Size 3\r\n/Root 1 0 R\r\n/Info 2 0 R\r\n\
             /ID [<{FILE_ID}><{FILE_ID}>]\r\n\
             >>\r\nstartxref\r\n50\r\n%%EOF\r\n"
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_write_document_propagates_missing_object() {
        let err = write_document(&tiny_layout(), |id| Err(PdfError::MissingObject(id)), FILE_ID)
            .unwrap_err();
        assert!(matches!(err, PdfError::MissingObject(2)));
    }

    #[test]
    fn test_write_document_rejects_invalid_layout() {
        let mut layout = tiny_layout();
        layout.order = vec![1, 1];
        let err = write_document(&layout, |_| Ok(&b""[..]), FILE_ID).unwrap_err();
        assert!(matches!(err, PdfError::InvalidLayout(_)));
    }
}
