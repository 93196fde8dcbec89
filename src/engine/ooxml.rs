//! Default DOCX reader: paragraph text straight from `word/document.xml`.
//!
//! Only body-level `w:p` elements count as paragraphs, in document order.
//! Paragraphs inside tables, text boxes and headers/footers are not part of
//! the body paragraph sequence and are skipped. Inside a paragraph, run text
//! (`w:t`) is concatenated; `w:tab` becomes `\t` and line breaks
//! (`w:br`, `w:cr`) become `\n`. Page and column breaks contribute nothing.

use super::DocxReader;
use crate::error::Doc2MdError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const FORMAT: &str = "DOCX";
const DOCUMENT_PART: &str = "word/document.xml";

/// zip + quick-xml [`DocxReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OoxmlReader;

impl DocxReader for OoxmlReader {
    fn paragraphs(&self, bytes: &[u8]) -> Result<Vec<String>, Doc2MdError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Doc2MdError::extraction(FORMAT, format!("not a DOCX container: {e}")))?;

        let xml = {
            let mut part = archive
                .by_name(DOCUMENT_PART)
                .map_err(|e| Doc2MdError::extraction(FORMAT, format!("missing {DOCUMENT_PART}: {e}")))?;
            let mut content = String::new();
            part.read_to_string(&mut content)
                .map_err(|e| Doc2MdError::extraction(FORMAT, format!("reading {DOCUMENT_PART}: {e}")))?;
            content
        };

        let paragraphs = parse_document_xml(&xml)?;
        debug!("DOCX body has {} paragraphs", paragraphs.len());
        Ok(paragraphs)
    }
}

/// Walk `word/document.xml` and collect body paragraph text.
fn parse_document_xml(xml: &str) -> Result<Vec<String>, Doc2MdError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut depth: usize = 0;
    let mut body_depth: Option<usize> = None;
    let mut current: Option<String> = None;
    // Paragraphs opened inside the current one (text boxes).
    let mut nested: usize = 0;
    // Depth of the open run of the current paragraph; runs of nested
    // paragraphs never touch it.
    let mut run_depth: Option<usize> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                match e.name().as_ref() {
                    b"w:body" => body_depth = Some(depth + 1),
                    b"w:p" => {
                        if current.is_some() {
                            nested += 1;
                        } else if body_depth == Some(depth) {
                            current = Some(String::new());
                        }
                    }
                    b"w:r" if current.is_some() && nested == 0 => run_depth = Some(depth),
                    b"w:t" => in_text = nested == 0 && run_depth.is_some(),
                    _ => {}
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                let top_level = current.is_none() && body_depth == Some(depth);
                let in_run = nested == 0 && run_depth.is_some();
                match e.name().as_ref() {
                    b"w:p" if top_level => paragraphs.push(String::new()),
                    b"w:tab" if in_run => push_char(&mut current, '\t'),
                    b"w:cr" if in_run => push_char(&mut current, '\n'),
                    b"w:br" if in_run && is_line_break(&e) => push_char(&mut current, '\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| Doc2MdError::extraction(FORMAT, format!("bad text node: {e}")))?;
                if let Some(p) = current.as_mut() {
                    p.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:r" if run_depth == Some(depth) => run_depth = None,
                    b"w:p" => {
                        if nested > 0 {
                            nested -= 1;
                        } else if let Some(p) = current.take() {
                            paragraphs.push(p);
                            run_depth = None;
                        }
                    }
                    b"w:body" => body_depth = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Doc2MdError::extraction(
                    FORMAT,
                    format!("malformed XML at byte {}: {e}", reader.buffer_position()),
                ))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(p) = current.as_mut() {
        p.push(c);
    }
}

/// `w:br` without a type (or `textWrapping`) is a line break; `page` and
/// `column` breaks are layout only.
fn is_line_break(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"w:type")
        .map_or(true, |a| a.value.as_ref() == b"textWrapping")
}
