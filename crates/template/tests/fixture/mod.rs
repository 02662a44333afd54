//! A synthetic 17-object receipt template, built in memory
//!
//! The bytes follow the exact object, xref and trailer formatting the
//! generator writes, so regenerating with unchanged values must give
//! the fixture back byte for byte.

#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub const FILE_ID: &str = "06F23BF2B75CA27053851F7BE875AD79";

/// Glyph code of the non-breaking space, which doubles as the line feed
pub const NBSP_CODE: &str = "000A";

const CHARSET: &str = concat!(
    "0123456789",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz",
    "АБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ",
    "абвгдеёжзийклмнопрстуфхцчшщъыьэюя",
    ".,:;-+()/",
);

/// Label and template value of every receipt field, in page order
pub const RECEIPT: [(&str, &str); 11] = [
    ("Сформирована", "22.08.2025 11:28 мск"),
    ("Сумма перевода", "0,01 RUR "),
    ("Комиссия", "0 RUR "),
    ("Дата и время перевода", "18.08.2025 17:34:11 мск "),
    ("Номер операции", "C421808250875533 "),
    ("Получатель", "Михаил Сергеевич К "),
    ("Номер телефона получателя", "7й526247787"),
    ("Банк получателя", "В-Банк"),
    ("Счёт списания", "408178100088600й7530"),
    ("Идентификатор операции в СБП", "A52301434118691P0000060011571101"),
    ("Сообщение получателю", "Перевод денеАнЕГ средств"),
];

/// Code table of the fixture font
pub fn glyph_table() -> Vec<(char, String)> {
    let mut table = vec![('\u{00A0}', NBSP_CODE.to_string())];
    for (i, c) in CHARSET.chars().enumerate() {
        table.push((c, format!("{:04X}", 0x20 + i)));
    }
    table
}

/// Hex encoding of `text` with the fixture font; spaces become NBSP
pub fn encode(text: &str) -> String {
    let table = glyph_table();
    text.chars()
        .map(|c| if c == ' ' { '\u{00A0}' } else { c })
        .map(|c| {
            table
                .iter()
                .find(|(ch, _)| *ch == c)
                .map(|(_, code)| code.clone())
                .unwrap_or_else(|| panic!("fixture font has no glyph for {c:?}"))
        })
        .collect()
}

/// ToUnicode CMap text for the fixture font plus `extra` entries
pub fn cmap(extra: &[(char, &str)]) -> String {
    let mut entries: Vec<(String, char)> = glyph_table()
        .into_iter()
        .map(|(c, code)| (code, c))
        .collect();
    entries.extend(extra.iter().map(|(c, code)| (code.to_string(), *c)));

    let mut out = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    out.push_str(&format!("{} beginbfchar\n", entries.len()));
    for (code, c) in entries {
        out.push_str(&format!("<{code}> <{:04X}>\n", c as u32));
    }
    out.push_str(
        "endbfchar\n\
         endcmap\n\
         CMapName currentdict /CMapResource defineresource pop\n\
         end\n\
         end\n",
    );
    out
}

/// Content stream showing a title and each `(label, value)` pair
///
/// Every other value is preceded by a blank segment. A `None` value
/// leaves the label without a following segment of its own.
pub fn content_stream(entries: &[(&str, Option<&str>)]) -> String {
    let mut out = String::from("q\n");
    let mut show = |x: u32, y: u32, size: u32, hex: &str| {
        out.push_str(&format!(
            "BT\n/F1 {size} Tf\n1 0 0 1 {x} {y} Tm\n<{hex}> Tj\nET\n"
        ));
    };

    show(40, 800, 14, &encode("Чек по операции"));
    let mut y = 760;
    for (i, (label, value)) in entries.iter().enumerate() {
        show(40, y, 9, &encode(label));
        if let Some(value) = value {
            if i % 2 == 1 {
                show(200, y, 9, NBSP_CODE);
            }
            show(220, y, 9, &encode(value));
        }
        y -= 24;
    }
    out.push_str("Q\n");
    out
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn stream_object(id: u32, data: &[u8]) -> Vec<u8> {
    let compressed = compress(data);
    let mut out = format!(
        "{id} 0 obj\r\n<< /Length {} /Filter /FlateDecode >>\r\nstream\r\n",
        compressed.len()
    )
    .into_bytes();
    out.extend_from_slice(&compressed);
    out.extend_from_slice(b"\r\nendstream\r\nendobj\r\n");
    out
}

fn dict_object(id: u32, body: &str) -> Vec<u8> {
    format!("{id} 0 obj\r\n{body}\r\nendobj\r\n").into_bytes()
}

/// Assemble the document around a content stream and a CMap
pub fn build_pdf(content: &str, cmap: &str) -> Vec<u8> {
    let order = [5u32, 6, 7, 8, 9, 1, 2, 3, 4, 10, 11, 12, 13, 14, 15, 16];
    let content_bytes: Vec<u8> = content
        .chars()
        .map(|c| u8::try_from(c as u32).expect("content stream must be Latin-1"))
        .collect();

    let object = |id: u32| -> Vec<u8> {
        match id {
            1 => dict_object(1, "<< /Type /Catalog /Pages 3 0 R >>"),
            2 => dict_object(2, "<< /Producer (receipt fixture) /CreationDate (D:20250818173411+03'00') >>"),
            3 => dict_object(3, "<< /Type /Pages /Kids [4 0 R] /Count 1 >>"),
            4 => dict_object(
                4,
                "<< /Type /Page /Parent 3 0 R /MediaBox [0 0 595 842] \
                 /Resources << /Font << /F1 6 0 R >> /ExtGState << /GS1 5 0 R >> >> \
                 /Contents 9 0 R >>",
            ),
            5 => dict_object(5, "<< /Type /ExtGState /CA 1 /ca 1 >>"),
            6 => dict_object(
                6,
                "<< /Type /Font /Subtype /Type0 /BaseFont /ReceiptSans /Encoding /Identity-H \
                 /DescendantFonts [7 0 R] /ToUnicode 14 0 R >>",
            ),
            7 => dict_object(
                7,
                "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /ReceiptSans \
                 /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
                 /FontDescriptor 8 0 R /DW 500 >>",
            ),
            8 => dict_object(
                8,
                "<< /Type /FontDescriptor /FontName /ReceiptSans /Flags 4 \
                 /FontBBox [0 -200 1000 800] /ItalicAngle 0 /Ascent 800 /Descent -200 \
                 /CapHeight 700 /StemV 80 >>",
            ),
            9 => stream_object(9, &content_bytes),
            14 => stream_object(14, cmap.as_bytes()),
            other => dict_object(other, &format!("<< /Filler {other} >>")),
        }
    };

    let mut out = b"%PDF-1.6\r\n".to_vec();
    let mut offsets = [0usize; 17];
    for id in order {
        offsets[id as usize] = out.len();
        out.extend_from_slice(&object(id));
    }

    let xref = out.len();
    out.extend_from_slice(b"xref\r\n0 17\r\n0000000000 65535 f\r\n");
    for offset in &offsets[1..] {
        out.extend_from_slice(format!("{offset:010} 00000 n\r\n").as_bytes());
    }
    out.extend_from_slice(b"trailer\r\n<<\r\n/Size 17\r\n/Root 1 0 R\r\n/Info 2 0 R\r\n");
    out.extend_from_slice(format!("/ID [<{FILE_ID}><{FILE_ID}>]\r\n").as_bytes());
    out.extend_from_slice(format!(">>\r\nstartxref\r\n{xref}\r\n%%EOF\r\n").as_bytes());
    out
}

/// Receipt entries with every value present
pub fn receipt_entries() -> Vec<(&'static str, Option<&'static str>)> {
    RECEIPT.iter().map(|(label, value)| (*label, Some(*value))).collect()
}

/// The complete receipt template
pub fn receipt_template() -> Vec<u8> {
    build_pdf(&content_stream(&receipt_entries()), &cmap(&[]))
}
