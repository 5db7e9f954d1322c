//! DOCX extraction — reads the OOXML package and yields, per container
//! (document body, headers, footers), the ordered paragraph text. The
//! extractor concatenates containers under a label line each so a reviewer
//! can tell header boilerplate from body content.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

pub fn extract(path: &Path) -> Result<String, ExtractError> {
    let containers = extract_containers(path)?;

    let mut text = String::new();
    for (container, paragraphs) in containers {
        text.push_str(&format!("--- From {container} ---\n"));
        for paragraph in paragraphs {
            text.push_str(&paragraph);
            text.push('\n');
        }
    }
    Ok(text)
}

/// The container capability: container name → ordered paragraph strings.
/// Containers come back in a fixed order: body first, then headers, then
/// footers, name-sorted within each group.
pub(crate) fn extract_containers(path: &Path) -> Result<Vec<(String, Vec<String>)>, ExtractError> {
    let file = std::fs::File::open(path).map_err(|source| ExtractError::io(path, source))?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| is_text_part(name))
        .map(String::from)
        .collect();
    names.sort_by_key(|name| (container_rank(name), name.clone()));

    let mut containers = Vec::new();
    for name in names {
        let mut xml = String::new();
        archive
            .by_name(&name)?
            .read_to_string(&mut xml)
            .map_err(|source| ExtractError::io(path, source))?;
        containers.push((container_label(&name), parse_paragraphs(&xml)?));
    }
    Ok(containers)
}

fn is_text_part(name: &str) -> bool {
    name == "word/document.xml"
        || (name.starts_with("word/header") && name.ends_with(".xml"))
        || (name.starts_with("word/footer") && name.ends_with(".xml"))
}

fn container_rank(name: &str) -> u8 {
    if name == "word/document.xml" {
        0
    } else if name.starts_with("word/header") {
        1
    } else {
        2
    }
}

fn container_label(name: &str) -> String {
    name.trim_start_matches("word/")
        .trim_end_matches(".xml")
        .to_string()
}

/// Collects the `<w:t>` runs of each `<w:p>` paragraph. Formatting markup is
/// discarded; `<w:br/>` becomes a newline and `<w:tab/>` a space.
fn parse_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = true,
                b"p" => current.clear(),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"br" => current.push('\n'),
                b"tab" => current.push(' '),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                current.push_str(&t.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r><w:r><w:t xml:space="preserve">, Backend Engineer</w:t></w:r></w:p>
    <w:p><w:pPr></w:pPr></w:p>
    <w:p><w:r><w:t>Five years of Go &amp; Rust.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    const HEADER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:p><w:r><w:t>Confidential</w:t></w:r></w:p>
</w:hdr>"#;

    fn write_docx(parts: &[(&str, &str)]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        (dir, path)
    }

    #[test]
    fn test_paragraph_runs_are_joined_and_entities_unescaped() {
        let paragraphs = parse_paragraphs(DOCUMENT_XML).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "Jane Doe, Backend Engineer".to_string(),
                "Five years of Go & Rust.".to_string(),
            ]
        );
    }

    #[test]
    fn test_containers_are_labeled_body_first() {
        let (_dir, path) = write_docx(&[
            ("word/header1.xml", HEADER_XML),
            ("word/document.xml", DOCUMENT_XML),
        ]);

        let text = extract(&path).unwrap();
        let body_at = text.find("--- From document ---").unwrap();
        let header_at = text.find("--- From header1 ---").unwrap();
        assert!(body_at < header_at, "body must precede headers:\n{text}");
        assert!(text.contains("Jane Doe, Backend Engineer"));
        assert!(text.contains("Confidential"));
    }

    #[test]
    fn test_non_text_parts_are_ignored() {
        let (_dir, path) = write_docx(&[
            ("word/document.xml", DOCUMENT_XML),
            ("word/styles.xml", "<w:styles/>"),
            ("[Content_Types].xml", "<Types/>"),
        ]);

        let containers = extract_containers(&path).unwrap();
        let names: Vec<_> = containers.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["document"]);
    }

    #[test]
    fn test_corrupt_archive_is_an_error_not_partial_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let err = extract(&path).unwrap_err();
        assert!(matches!(err, ExtractError::DocxArchive(_)));
    }
}
