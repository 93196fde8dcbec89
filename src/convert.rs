//! Conversion orchestration: route a reference through the right stages.
//!
//! Dispatch happens once, on the format declared by the caller's reference:
//!
//! | Declared format | Stages                                                   |
//! |-----------------|----------------------------------------------------------|
//! | PDF             | fetch → PDF extractor                                    |
//! | DOC, WPS        | fetch → normalize → fetch normalised DOCX → DOCX extractor |
//! | DOCX            | fetch → DOCX extractor                                   |
//! | anything else   | `UnsupportedFormat`, nothing fetched                     |
//!
//! The first failing stage aborts the conversion; no partial text is ever
//! returned. Scratch artefacts are owned by the stage that made them and are
//! gone by the time [`Converter::convert`] returns.

use crate::config::ConversionConfig;
use crate::engine::{DocxReader, OoxmlReader, PdfEngine, PdfiumEngine};
use crate::error::Doc2MdError;
use crate::output::ConversionOutput;
use crate::pipeline::reference::{DocumentFormat, InputReference};
use crate::pipeline::{extract, fetch, normalize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The conversion orchestrator.
///
/// Holds only immutable state (config and engine handles), so one instance
/// can serve any number of concurrent conversions.
#[derive(Clone)]
pub struct Converter {
    config: ConversionConfig,
    pdf_engine: Arc<dyn PdfEngine>,
    docx_reader: Arc<dyn DocxReader>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("pdf_engine", &"<dyn PdfEngine>")
            .field("docx_reader", &"<dyn DocxReader>")
            .finish()
    }
}

impl Converter {
    /// Converter with the default engines: pdfium for PDF, zip + XML for DOCX.
    pub fn new(config: ConversionConfig) -> Self {
        let pdf_engine = Arc::new(PdfiumEngine::new(config.pdfium_library_path.clone()));
        Self::with_engines(config, pdf_engine, Arc::new(OoxmlReader))
    }

    /// Converter with caller-supplied engines.
    pub fn with_engines(
        config: ConversionConfig,
        pdf_engine: Arc<dyn PdfEngine>,
        docx_reader: Arc<dyn DocxReader>,
    ) -> Self {
        Self {
            config,
            pdf_engine,
            docx_reader,
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert the document named by `input` (local path or HTTP/HTTPS URL).
    pub async fn convert(&self, input: &str) -> Result<ConversionOutput, Doc2MdError> {
        let start = Instant::now();
        if input.trim().is_empty() {
            return Err(Doc2MdError::InvalidInput {
                input: input.to_string(),
            });
        }

        let reference = InputReference::parse(input);
        let format = reference.format();
        info!("Starting conversion: {} ({})", reference, format);

        let markdown = match format {
            DocumentFormat::Pdf => {
                let bytes = fetch::fetch(&reference, &self.config).await?;
                extract::extract_pdf(bytes, Arc::clone(&self.pdf_engine), &self.config).await?
            }
            DocumentFormat::Doc | DocumentFormat::Wps => {
                let legacy = fetch::fetch(&reference, &self.config).await?;
                let normalized = normalize::normalize_legacy(&legacy, format, &self.config).await?;
                drop(legacy);
                let docx = normalized.reference();
                debug!("Re-fetching normalised document {}", docx);
                let bytes = fetch::fetch(docx, &self.config).await?;
                extract::extract_docx(docx, bytes, Arc::clone(&self.docx_reader)).await?
                // `normalized` (and its scratch directory) is dropped here.
            }
            DocumentFormat::Docx => {
                let bytes = fetch::fetch(&reference, &self.config).await?;
                extract::extract_docx(&reference, bytes, Arc::clone(&self.docx_reader)).await?
            }
            DocumentFormat::Unsupported => {
                return Err(Doc2MdError::UnsupportedFormat {
                    reference: reference.to_string(),
                });
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Conversion complete: {} → {} bytes in {}ms",
            reference,
            markdown.len(),
            duration_ms
        );

        Ok(ConversionOutput {
            markdown,
            format,
            source: reference.to_string(),
            duration_ms,
        })
    }
}

/// Convert a document file or URL to text with the default engines.
///
/// # Errors
/// Any stage failure: not found, fetch, unsupported format, normalisation,
/// extraction.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Doc2MdError> {
    Converter::new(config.clone()).convert(input_str.as_ref()).await
}

/// Convert a document and write the text directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Doc2MdError> {
    let output = convert(input_str, config).await?;
    write_atomic(output_path.as_ref(), &output.markdown).await?;
    Ok(output)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Doc2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

pub(crate) async fn write_atomic(path: &Path, contents: &str) -> Result<(), Doc2MdError> {
    let write_err = |source| Doc2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let converter = Converter::new(ConversionConfig::default());
        let err = converter.convert("   ").await.unwrap_err();
        assert!(matches!(err, Doc2MdError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn unsupported_extension_fails_before_fetch() {
        let converter = Converter::new(ConversionConfig::default());
        // The file does not exist: a fetch would report NotFound instead.
        let err = converter.convert("/definitely/not/here.txt").await.unwrap_err();
        assert!(
            matches!(err, Doc2MdError::UnsupportedFormat { .. }),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn write_atomic_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out.md");
        write_atomic(&out, "hello\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello\n");
        let names: Vec<_> = std::fs::read_dir(out.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.md")]);
    }

    #[test]
    fn convert_sync_reports_missing_file() {
        let err = convert_sync("/definitely/not/here.docx", &ConversionConfig::default())
            .unwrap_err();
        assert!(matches!(err, Doc2MdError::NotFound { .. }), "got: {err:?}");
    }

    #[test]
    fn converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
        let converter = Converter::new(ConversionConfig::default());
        let err = tokio_test::block_on(converter.convert("README")).unwrap_err();
        assert!(
            matches!(err, Doc2MdError::UnsupportedFormat { .. }),
            "got: {err:?}"
        );
    }
}
