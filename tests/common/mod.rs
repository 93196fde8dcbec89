//! Shared fixtures for the integration tests.
//!
//! * [`docx_bytes`] builds a minimal DOCX container in memory.
//! * [`fake_office`] writes a shell script that behaves like
//!   `soffice --convert-to docx --outdir DIR FILE` by copying a prepared
//!   DOCX next to the source; it is run as `sh <script>` so no exec bit or
//!   freshly written executable is involved.
//! * [`ScriptedPdfEngine`] is a PDF engine that emits a fixed item list.

#![allow(dead_code)]

use edgequake_doc2md::engine::{
    ClassifyHints, ContentItem, DropMode, ImageWriter, PdfEngine, PdfKind, PdfPipe,
};
use edgequake_doc2md::{ConversionConfig, Doc2MdError};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory DOCX whose body holds one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            if p.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#)
            }
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Write a fake office converter script into `dir`.
///
/// On each run it copies `docx_fixture` to `<outdir>/<source stem>.docx`,
/// then exits with `exit_code`. With `docx_fixture = None` it writes nothing.
pub fn fake_office(dir: &Path, docx_fixture: Option<&Path>, exit_code: i32) -> PathBuf {
    let copy = match docx_fixture {
        Some(fixture) => format!(
            r#"stem=$(basename "$src"); stem="${{stem%.*}}"
cp "{}" "$out/$stem.docx""#,
            fixture.display()
        ),
        None => String::new(),
    };
    let script = format!(
        r#"#!/bin/sh
out=""
src=""
while [ $# -gt 0 ]; do
  case "$1" in
    --outdir) shift; out="$1" ;;
    *) src="$1" ;;
  esac
  shift
done
echo "$src" >> "{log}"
{copy}
if [ {exit_code} -ne 0 ]; then echo "Error: source file could not be loaded" >&2; fi
exit {exit_code}
"#,
        log = dir.join("office.log").display(),
    );
    let path = dir.join(format!("fake-soffice-{exit_code}.sh"));
    std::fs::write(&path, script).unwrap();
    path
}

/// Config that runs `script` through `sh` and keeps scratch under `root`.
pub fn config_with_office(script: &Path, scratch_root: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .office_program("sh")
        .office_args([script.to_string_lossy().into_owned()])
        .normalize_timeout_secs(20)
        .scratch_root(scratch_root)
        .build()
        .unwrap()
}

/// Number of entries directly under `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// PDF engine that returns `items` and counts how often it was opened.
pub struct ScriptedPdfEngine {
    pub items: Vec<ContentItem>,
    pub fail_parse: bool,
    /// Blocking delay inside `analyze`, to model a slow layout pass.
    pub analyze_delay: Option<Duration>,
    pub opened: AtomicUsize,
}

impl ScriptedPdfEngine {
    pub fn new(items: Vec<ContentItem>) -> Arc<Self> {
        Arc::new(Self {
            items,
            fail_parse: false,
            analyze_delay: None,
            opened: AtomicUsize::new(0),
        })
    }

    pub fn slow(items: Vec<ContentItem>, analyze_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            items,
            fail_parse: false,
            analyze_delay: Some(analyze_delay),
            opened: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            items: Vec::new(),
            fail_parse: true,
            analyze_delay: None,
            opened: AtomicUsize::new(0),
        })
    }
}

impl PdfEngine for ScriptedPdfEngine {
    fn open(
        &self,
        bytes: Vec<u8>,
        _hints: ClassifyHints,
        writer: ImageWriter,
    ) -> Result<Box<dyn PdfPipe>, Doc2MdError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if !bytes.starts_with(b"%PDF") {
            return Err(Doc2MdError::Extraction {
                format: "PDF".into(),
                detail: "missing %PDF header".into(),
            });
        }
        Ok(Box::new(ScriptedPipe {
            items: self.items.clone(),
            fail_parse: self.fail_parse,
            analyze_delay: self.analyze_delay,
            writer,
        }))
    }
}

struct ScriptedPipe {
    items: Vec<ContentItem>,
    fail_parse: bool,
    analyze_delay: Option<Duration>,
    writer: ImageWriter,
}

impl PdfPipe for ScriptedPipe {
    fn classify(&mut self) -> Result<PdfKind, Doc2MdError> {
        Ok(PdfKind::Text)
    }

    fn analyze(&mut self) -> Result<(), Doc2MdError> {
        if let Some(delay) = self.analyze_delay {
            std::thread::sleep(delay);
        }
        Ok(())
    }

    fn parse(&mut self) -> Result<(), Doc2MdError> {
        // Side-channel output, like a real engine cutting out images.
        self.writer
            .write("p1_0.png", b"png")
            .map_err(|e| Doc2MdError::Extraction {
                format: "PDF".into(),
                detail: format!("image write: {e}"),
            })?;
        if self.fail_parse {
            return Err(Doc2MdError::Extraction {
                format: "PDF".into(),
                detail: "layout analysis failed".into(),
            });
        }
        Ok(())
    }

    fn content_list(&self, _drop_mode: DropMode) -> Result<Vec<ContentItem>, Doc2MdError> {
        Ok(self.items.clone())
    }
}
