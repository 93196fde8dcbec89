//! Format-specific text extraction on top of the document engines.
//!
//! Both extractors run their engine inside `spawn_blocking`: pdfium and the
//! zip/XML walk are CPU-bound and must not stall the async workers.

use super::reference::{DocumentFormat, InputReference};
use super::scratch::ScratchDir;
use crate::config::ConversionConfig;
use crate::engine::{
    ClassifyHints, ContentItem, ContentKind, DocxReader, DropMode, ImageWriter, PdfEngine, PdfKind,
};
use crate::error::Doc2MdError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extract text from PDF bytes.
///
/// Every `text` item is emitted in order followed by a blank line
/// (`"\n\n"`). Image, table and equation items are dropped. A document
/// without text items yields an empty string.
pub async fn extract_pdf(
    bytes: Vec<u8>,
    engine: Arc<dyn PdfEngine>,
    config: &ConversionConfig,
) -> Result<String, Doc2MdError> {
    // Side-channel output (images) lands here. The directory is owned by the
    // blocking task, so it outlives the engine even if this future is dropped.
    let scratch = ScratchDir::new(config.scratch_root.as_deref())?;
    let writer = ImageWriter::new(scratch.path().join("images"));
    let drop_mode = config.drop_mode;

    let items = tokio::task::spawn_blocking(move || -> Result<Vec<ContentItem>, Doc2MdError> {
        let items = run_pdf_stages(engine.as_ref(), bytes, writer, drop_mode);
        drop(scratch);
        items
    })
    .await
    .map_err(|e| Doc2MdError::Internal(format!("PDF extraction task panicked: {}", e)))??;

    let markdown = join_text_items(&items);
    info!(
        "PDF yielded {} content items, {} bytes of text",
        items.len(),
        markdown.len()
    );
    Ok(markdown)
}

fn run_pdf_stages(
    engine: &dyn PdfEngine,
    bytes: Vec<u8>,
    writer: ImageWriter,
    drop_mode: DropMode,
) -> Result<Vec<ContentItem>, Doc2MdError> {
    let mut pipe = engine.open(bytes, ClassifyHints::default(), writer)?;
    let kind = pipe.classify()?;
    if kind == PdfKind::Ocr {
        warn!("PDF has no usable text layer; output will be sparse");
    }
    pipe.analyze()?;
    pipe.parse()?;
    pipe.content_list(drop_mode)
}

/// Concatenate the text of `text` items, each followed by a blank line.
pub fn join_text_items(items: &[ContentItem]) -> String {
    let mut out = String::new();
    for item in items.iter().filter(|i| i.kind == ContentKind::Text) {
        out.push_str(&item.text);
        out.push_str("\n\n");
    }
    out
}

/// Extract text from DOCX bytes.
///
/// `reference` is the document the bytes came from after any legacy
/// normalisation; anything but a `.docx` reference is rejected. Each
/// paragraph is emitted followed by a single newline.
pub async fn extract_docx(
    reference: &InputReference,
    bytes: Vec<u8>,
    reader: Arc<dyn DocxReader>,
) -> Result<String, Doc2MdError> {
    if reference.format() != DocumentFormat::Docx {
        return Err(Doc2MdError::UnsupportedFormat {
            reference: reference.to_string(),
        });
    }

    let paragraphs = tokio::task::spawn_blocking(move || reader.paragraphs(&bytes))
        .await
        .map_err(|e| Doc2MdError::Internal(format!("DOCX extraction task panicked: {}", e)))??;

    debug!("DOCX yielded {} paragraphs", paragraphs.len());
    Ok(join_paragraphs(&paragraphs))
}

/// Concatenate paragraphs, each followed by a newline.
pub fn join_paragraphs(paragraphs: &[String]) -> String {
    let mut out = String::with_capacity(paragraphs.iter().map(|p| p.len() + 1).sum());
    for p in paragraphs {
        out.push_str(p);
        out.push('\n');
    }
    out
}
