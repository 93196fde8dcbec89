//! Document engines: the swappable collaborators that understand file formats.
//!
//! The conversion pipeline never parses PDF or DOCX itself. It hands bytes to
//! an engine and consumes what comes back:
//!
//! * a [`PdfEngine`] opens a [`PdfPipe`] that is driven through four stages,
//!   `classify → analyze → parse → content_list`, and yields tagged
//!   [`ContentItem`]s in document order;
//! * a [`DocxReader`] turns a DOCX container into its ordered paragraphs.
//!
//! Default implementations live in [`pdfium`] and [`ooxml`]. Tests and
//! embedders can plug in their own through
//! [`crate::convert::Converter::with_engines`].

pub mod ooxml;
pub mod pdfium;

use crate::error::Doc2MdError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use ooxml::OoxmlReader;
pub use pdfium::PdfiumEngine;

/// Kind of a unit emitted by the PDF engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Table,
    Equation,
}

/// One unit of extracted PDF content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Text payload; empty for image items.
    #[serde(default)]
    pub text: String,
    /// Path of the side-channel file written for image items, relative to
    /// the image writer root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// 0-based page the item came from.
    pub page_idx: usize,
}

impl ContentItem {
    pub fn text(page_idx: usize, text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            text: text.into(),
            image_path: None,
            page_idx,
        }
    }

    pub fn image(page_idx: usize, image_path: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Image,
            text: String::new(),
            image_path: Some(image_path.into()),
            page_idx,
        }
    }
}

/// Which pages the engine may discard when emitting the content list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropMode {
    /// Keep every page, including ones flagged as unparseable. (default)
    #[default]
    None,
    /// Silently drop flagged pages.
    SinglePage,
    /// Reject the whole document if any page is flagged.
    WholePdf,
}

/// Outcome of the classify stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfKind {
    /// The document carries an extractable text layer.
    Text,
    /// Scanned/image-only document; text would need OCR.
    Ocr,
}

/// Classification hints passed into [`PdfEngine::open`].
///
/// The pipeline always passes an empty value and lets the engine decide.
/// Pre-filling `pdf_kind` skips detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifyHints {
    pub pdf_kind: Option<PdfKind>,
}

/// Writes side-channel image files under a root directory.
///
/// The PDF engine needs somewhere to put the images it cuts out of pages.
/// The pipeline points the writer at a scratch directory that is removed
/// once extraction finishes; image bytes are never read back.
#[derive(Debug, Clone)]
pub struct ImageWriter {
    root: PathBuf,
}

impl ImageWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to `<root>/<name>`, creating the root on first use.
    /// Returns the full path written.
    ///
    /// Only the root itself is created: if its parent has been removed the
    /// write fails with `NotFound` instead of resurrecting the tree.
    pub fn write(&self, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        match std::fs::create_dir(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
        let path = self.root.join(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// A PDF document engine.
///
/// `open` is called once per conversion from a blocking thread; the
/// returned pipe is driven to completion on that same thread.
pub trait PdfEngine: Send + Sync {
    fn open(
        &self,
        bytes: Vec<u8>,
        hints: ClassifyHints,
        writer: ImageWriter,
    ) -> Result<Box<dyn PdfPipe>, Doc2MdError>;
}

/// Staged processing of one opened PDF.
///
/// Stages must be called in order. Calling a stage before its predecessor
/// is an engine error, not a panic.
pub trait PdfPipe {
    fn classify(&mut self) -> Result<PdfKind, Doc2MdError>;
    fn analyze(&mut self) -> Result<(), Doc2MdError>;
    fn parse(&mut self) -> Result<(), Doc2MdError>;
    fn content_list(&self, drop_mode: DropMode) -> Result<Vec<ContentItem>, Doc2MdError>;
}

/// A DOCX structured reader.
pub trait DocxReader: Send + Sync {
    /// Text of every paragraph in document order.
    fn paragraphs(&self, bytes: &[u8]) -> Result<Vec<String>, Doc2MdError>;
}
