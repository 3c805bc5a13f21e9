//! Minimal WordprocessingML package: one `document.xml` with direct run
//! formatting plus the relationships Word needs for external hyperlinks.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::blocks::{Block, Inline};
use crate::export::ExportError;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Font sizes in half-points, indexed by heading level 1..=6; body text is 22 (11pt).
const HEADING_SIZES: [u32; 6] = [36, 28, 24, 22, 22, 22];
const BODY_SIZE: u32 = 22;

pub fn to_docx(blocks: &[Block]) -> Result<Vec<u8>, ExportError> {
    let mut links: Vec<String> = Vec::new();
    let body: String = blocks.iter().map(|b| paragraph(b, &mut links)).collect();

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="720" w:right="720" w:bottom="720" w:left="720" w:header="0" w:footer="0" w:gutter="0"/></w:sectPr></w:body></w:document>"#
    );

    let relationships: String = links
        .iter()
        .enumerate()
        .map(|(idx, href)| {
            format!(
                r#"<Relationship Id="{}" Type="{HYPERLINK_REL_TYPE}" Target="{}" TargetMode="External"/>"#,
                link_id(idx),
                escape(href.as_str())
            )
        })
        .collect();
    let document_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
    );

    write_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", &document),
        ("word/_rels/document.xml.rels", &document_rels),
    ])
    .map_err(|e| ExportError::Docx(e.to_string()))
}

fn write_package(parts: &[(&str, &str)]) -> zip::result::ZipResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in parts {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

fn link_id(idx: usize) -> String {
    format!("rIdLink{}", idx + 1)
}

fn paragraph(block: &Block, links: &mut Vec<String>) -> String {
    let (props, size, bold, prefix) = match block {
        Block::Heading { level, .. } => {
            let idx = usize::from((*level).clamp(1, 6)) - 1;
            let props = if *level == 1 {
                r#"<w:pPr><w:jc w:val="center"/><w:spacing w:after="120"/></w:pPr>"#
            } else {
                r#"<w:pPr><w:spacing w:before="200" w:after="80"/></w:pPr>"#
            };
            (props, HEADING_SIZES[idx], true, "")
        }
        Block::Paragraph(_) => (r#"<w:pPr><w:spacing w:after="80"/></w:pPr>"#, BODY_SIZE, false, ""),
        Block::Bullet(_) => (
            r#"<w:pPr><w:ind w:left="360" w:hanging="360"/><w:spacing w:after="40"/></w:pPr>"#,
            BODY_SIZE,
            false,
            "\u{2022}\t",
        ),
    };

    let mut runs = String::new();
    if !prefix.is_empty() {
        runs.push_str(&run(prefix, size, bold, false));
    }
    for span in block.spans() {
        match span {
            Inline::Text(text) => runs.push_str(&run(text, size, bold, false)),
            Inline::Link { text, href } => {
                let label = if text.is_empty() { href } else { text };
                runs.push_str(&format!(
                    r#"<w:hyperlink r:id="{}">{}</w:hyperlink>"#,
                    link_id(links.len()),
                    run(label, size, bold, true)
                ));
                links.push(href.clone());
            }
        }
    }
    format!("<w:p>{props}{runs}</w:p>")
}

fn run(text: &str, size: u32, bold: bool, link: bool) -> String {
    let mut props = String::new();
    if bold {
        props.push_str("<w:b/>");
    }
    if link {
        props.push_str(r#"<w:color w:val="0563C1"/><w:u w:val="single"/>"#);
    }
    props.push_str(&format!(r#"<w:sz w:val="{size}"/>"#));

    let body = match text.split_once('\t') {
        Some((before, after)) => format!(
            r#"<w:t xml:space="preserve">{}</w:t><w:tab/><w:t xml:space="preserve">{}</w:t>"#,
            escape(before),
            escape(after)
        ),
        None => format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape(text)),
    };
    format!("<w:r><w:rPr>{props}</w:rPr>{body}</w:r>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::blocks::html_to_blocks;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut xml = String::new();
        file.read_to_string(&mut xml).unwrap();
        xml
    }

    /// Paragraph texts of `word/document.xml`. Entity-free input only.
    fn paragraphs(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut lines = Vec::new();
        let mut current = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == b"w:p" => current.clear(),
                Event::End(e) if e.name().as_ref() == b"w:p" => {
                    lines.push(std::mem::take(&mut current))
                }
                Event::Empty(e) if e.name().as_ref() == b"w:tab" => current.push('\t'),
                Event::Text(e) => current.push_str(&e.xml_content().unwrap()),
                Event::Eof => break,
                _ => {}
            }
        }
        lines
    }

    #[test]
    fn test_docx_package_parts() {
        let bytes = to_docx(&html_to_blocks("<h1>Jane</h1>")).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(!read_part(&bytes, part).is_empty(), "missing {part}");
        }
    }

    #[test]
    fn test_docx_paragraph_text() {
        let blocks = html_to_blocks("<h1>Jane Doe</h1><p>Acme | NYC</p><ul><li>Shipped X</li></ul>");
        let xml = read_part(&to_docx(&blocks).unwrap(), "word/document.xml");
        assert_eq!(
            paragraphs(&xml),
            ["Jane Doe", "Acme | NYC", "\u{2022}\tShipped X"]
        );
    }

    #[test]
    fn test_docx_text_is_escaped() {
        let blocks = html_to_blocks("<p>R&amp;D &lt;lead&gt;</p>");
        let xml = read_part(&to_docx(&blocks).unwrap(), "word/document.xml");
        assert!(xml.contains("R&amp;D &lt;lead&gt;"));
    }

    #[test]
    fn test_docx_hyperlinks_get_relationships() {
        let blocks = html_to_blocks(
            r#"<p><a href="mailto:jane@x.com">jane@x.com</a> | <a href="https://linkedin.com/in/j?a=1&amp;b=2">LinkedIn</a></p>"#,
        );
        let bytes = to_docx(&blocks).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(r#"<w:hyperlink r:id="rIdLink1">"#));
        assert!(xml.contains(r#"<w:hyperlink r:id="rIdLink2">"#));
        let rels = read_part(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains(r#"Target="mailto:jane@x.com""#));
        assert!(rels.contains("a=1&amp;b=2"));
    }
}
