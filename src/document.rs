//! # Document Reading Module
//!
//! Reads the input document that carries the category/URL blocks and turns
//! it into plain text for the extractor.
//!
//! DOCX files are ZIP archives containing XML in Open XML format; the main
//! content lives in `word/document.xml`. Paragraph text is collected from
//! `<w:t>` runs and paragraphs are joined with newlines, so the extractor
//! sees the same line structure a text export would produce. Any other
//! extension is read verbatim as UTF-8.

use crate::error::PipelineError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

/// Reads the full text content of a document file.
///
/// A missing or unreadable document is a fatal error for the run; the
/// caller is expected to abort.
pub fn read_document_text(path: &Path) -> Result<String, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::Document(format!(
            "File '{}' not found",
            path.display()
        )));
    }

    let is_docx = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("docx"))
        .unwrap_or(false);

    if is_docx {
        let bytes = std::fs::read(path)?;
        docx_text(&bytes)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Extracts paragraph text from DOCX bytes.
///
/// Parity with the usual "one line per paragraph" text extraction: every
/// `<w:p>` becomes one line, runs inside it are concatenated.
pub fn docx_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| PipelineError::Document(format!("Failed to open DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| PipelineError::Document(format!("No word/document.xml in archive: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| PipelineError::Document(format!("Failed to read document.xml: {}", e)))?;

    let mut reader = Reader::from_str(&xml);
    reader.trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| PipelineError::Document(format!("Malformed document.xml: {}", e)))?
        {
            Event::Start(ref e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| PipelineError::Document(format!("Malformed document.xml: {}", e)))?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Trailing run outside a closed paragraph (defensive against truncated XML)
    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}
