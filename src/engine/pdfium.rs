//! Default PDF engine backed by pdfium.
//!
//! Each stage reloads the document from the in-memory bytes: a
//! `PdfDocument` borrows its `Pdfium` binding, so it cannot be stored next to
//! it in the pipe. Stage results are plain owned data.
//!
//! * **classify** counts text characters and image objects per page. A page
//!   with images but (almost) no text is flagged as needing OCR; a document
//!   whose pages are mostly flagged is an OCR document.
//! * **analyze** pulls the raw text layer and embedded images of every page.
//! * **parse** splits page text into paragraph blocks and writes images as
//!   PNG through the [`ImageWriter`].
//! * **content_list** emits items in page order, applying the [`DropMode`].
//!
//! pdfium is not async-safe; the pipeline drives this engine from
//! `spawn_blocking`.

use super::{ClassifyHints, ContentItem, DropMode, ImageWriter, PdfEngine, PdfKind, PdfPipe};
use crate::error::Doc2MdError;
use image::DynamicImage;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Pages with fewer text characters than this are considered text-less.
const MIN_PAGE_TEXT_CHARS: usize = 10;

const FORMAT: &str = "PDF";

/// pdfium-backed [`PdfEngine`].
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine {
    library_path: Option<PathBuf>,
}

impl PdfiumEngine {
    /// `library_path` may name the library file itself or a directory
    /// holding the platform library. `None` binds the system library.
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    fn bind(&self) -> Result<Pdfium, Doc2MdError> {
        let bindings = match &self.library_path {
            Some(path) if path.is_dir() => {
                Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path(path))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| Doc2MdError::PdfiumBindingFailed(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PdfEngine for PdfiumEngine {
    fn open(
        &self,
        bytes: Vec<u8>,
        hints: ClassifyHints,
        writer: ImageWriter,
    ) -> Result<Box<dyn PdfPipe>, Doc2MdError> {
        let pdfium = self.bind()?;
        Ok(Box::new(PdfiumPipe {
            pdfium,
            bytes,
            hints,
            writer,
            scans: None,
            layouts: None,
            parsed: None,
        }))
    }
}

#[derive(Debug, Clone)]
struct PageScan {
    text_chars: usize,
    image_count: usize,
}

impl PageScan {
    fn needs_ocr(&self) -> bool {
        self.text_chars < MIN_PAGE_TEXT_CHARS && self.image_count > 0
    }
}

struct PageLayout {
    text: String,
    images: Vec<DynamicImage>,
}

struct ParsedPage {
    items: Vec<ContentItem>,
    flagged: bool,
}

struct PdfiumPipe {
    pdfium: Pdfium,
    bytes: Vec<u8>,
    hints: ClassifyHints,
    writer: ImageWriter,
    scans: Option<Vec<PageScan>>,
    layouts: Option<Vec<PageLayout>>,
    parsed: Option<Vec<ParsedPage>>,
}

impl PdfiumPipe {
    fn load(&self) -> Result<PdfDocument<'_>, Doc2MdError> {
        self.pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|e| Doc2MdError::extraction(FORMAT, format!("{:?}", e)))
    }

    fn scan_pages(&self) -> Result<Vec<PageScan>, Doc2MdError> {
        let document = self.load()?;
        let mut scans = Vec::new();
        for page in document.pages().iter() {
            let text = page
                .text()
                .map_err(|e| Doc2MdError::extraction(FORMAT, format!("{:?}", e)))?;
            let text_chars = text.all().chars().filter(|c| !c.is_whitespace()).count();
            let image_count = page
                .objects()
                .iter()
                .filter(|o| o.object_type() == PdfPageObjectType::Image)
                .count();
            scans.push(PageScan {
                text_chars,
                image_count,
            });
        }
        Ok(scans)
    }

    fn read_layouts(&self) -> Result<Vec<PageLayout>, Doc2MdError> {
        let document = self.load()?;
        let mut layouts = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| Doc2MdError::extraction(FORMAT, format!("{:?}", e)))?
                .all();

            let mut images = Vec::new();
            for object in page.objects().iter() {
                if let Some(image) = object.as_image_object() {
                    match image.get_raw_image() {
                        Ok(img) => images.push(img),
                        Err(e) => warn!("Skipping unreadable image on page {}: {:?}", idx + 1, e),
                    }
                }
            }
            debug!(
                "Analyzed page {}: {} chars, {} images",
                idx + 1,
                text.len(),
                images.len()
            );
            layouts.push(PageLayout { text, images });
        }
        Ok(layouts)
    }
}

impl PdfPipe for PdfiumPipe {
    fn classify(&mut self) -> Result<PdfKind, Doc2MdError> {
        let scans = self.scan_pages()?;

        let kind = match self.hints.pdf_kind {
            Some(kind) => kind,
            None => {
                let ocr_pages = scans.iter().filter(|s| s.needs_ocr()).count();
                if !scans.is_empty() && ocr_pages * 2 > scans.len() {
                    PdfKind::Ocr
                } else {
                    PdfKind::Text
                }
            }
        };
        info!("PDF classified as {:?} ({} pages)", kind, scans.len());
        self.hints.pdf_kind = Some(kind);
        self.scans = Some(scans);
        Ok(kind)
    }

    fn analyze(&mut self) -> Result<(), Doc2MdError> {
        if self.scans.is_none() {
            return Err(Doc2MdError::extraction(FORMAT, "analyze called before classify"));
        }
        let layouts = self.read_layouts()?;
        self.layouts = Some(layouts);
        Ok(())
    }

    fn parse(&mut self) -> Result<(), Doc2MdError> {
        let (Some(scans), Some(layouts)) = (self.scans.as_ref(), self.layouts.take()) else {
            return Err(Doc2MdError::extraction(FORMAT, "parse called before analyze"));
        };

        let mut parsed = Vec::with_capacity(layouts.len());
        for (idx, layout) in layouts.into_iter().enumerate() {
            let mut items: Vec<ContentItem> = split_blocks(&layout.text)
                .into_iter()
                .map(|block| ContentItem::text(idx, block))
                .collect();

            for (n, img) in layout.images.iter().enumerate() {
                let name = format!("p{}_{}.png", idx + 1, n);
                let mut buf = Vec::new();
                if let Err(e) = img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png) {
                    warn!("Failed to encode image {}: {}", name, e);
                    continue;
                }
                self.writer
                    .write(&name, &buf)
                    .map_err(|e| Doc2MdError::extraction(FORMAT, format!("image write: {e}")))?;
                items.push(ContentItem::image(idx, name));
            }

            let flagged = scans.get(idx).map(PageScan::needs_ocr).unwrap_or(false);
            parsed.push(ParsedPage { items, flagged });
        }
        self.parsed = Some(parsed);
        Ok(())
    }

    fn content_list(&self, drop_mode: DropMode) -> Result<Vec<ContentItem>, Doc2MdError> {
        let Some(parsed) = self.parsed.as_ref() else {
            return Err(Doc2MdError::extraction(FORMAT, "content_list called before parse"));
        };

        if drop_mode == DropMode::WholePdf {
            if let Some(idx) = parsed.iter().position(|p| p.flagged) {
                return Err(Doc2MdError::extraction(
                    FORMAT,
                    format!("page {} has no text layer", idx + 1),
                ));
            }
        }

        Ok(parsed
            .iter()
            .filter(|p| !(drop_mode == DropMode::SinglePage && p.flagged))
            .flat_map(|p| p.items.iter().cloned())
            .collect())
    }
}

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\u{00A0}]*\n").unwrap());
static RE_INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

/// Split a page's raw text layer into paragraph blocks.
///
/// Blocks are separated by blank lines. Inside a block, line breaks are
/// kept, runs of spaces collapse to one, and invisible characters pdfium
/// sometimes emits are removed.
fn split_blocks(raw: &str) -> Vec<String> {
    let text = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(['\u{FEFF}', '\u{200B}', '\u{0002}'], "");

    RE_BLANK_LINES
        .split(&text)
        .map(|block| {
            block
                .lines()
                .map(|line| RE_INLINE_SPACE.replace_all(line.trim(), " ").into_owned())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|block| !block.is_empty())
        .collect()
}
