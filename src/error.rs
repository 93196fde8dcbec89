//! Error types for the edgequake-doc2md library.
//!
//! Every stage of the pipeline fails with a [`Doc2MdError`]. Nothing is
//! retried and nothing is partially returned: the first failure aborts the
//! conversion and travels up to the caller (or to the HTTP handler, which
//! turns it into a `500` response and logs it).
//!
//! [`ErrorKind`] collapses the variants into the coarse taxonomy operators
//! reason about (not found, fetch, unsupported format, extraction,
//! normalisation, ...). It is used for structured logging and in tests; HTTP
//! callers only ever see the `Display` message.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-doc2md library.
#[derive(Debug, Error)]
pub enum Doc2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Local file (or the expected output of the office converter) is absent.
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input reference is empty or otherwise unusable.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// Remote fetch failed (transport error or non-2xx status).
    #[error("Failed to fetch '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    /// Remote fetch exceeded the configured timeout.
    #[error("Fetch timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    FetchTimeout { url: String, secs: u64 },

    /// The reference does not name a supported document format.
    #[error("Unsupported file type: {reference}")]
    UnsupportedFormat { reference: String },

    // ── Normalisation errors ──────────────────────────────────────────────
    /// The office converter executable could not be started.
    #[error(
        "Office converter '{program}' could not be started.\n\
Install LibreOffice or point --office-program at the soffice binary."
    )]
    ConverterNotFound { program: String },

    /// The office converter exited with a failure status.
    #[error("Legacy document conversion failed for '{path}' ({status}): {stderr}")]
    Normalization {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The office converter did not finish in time and was killed.
    #[error("Legacy document conversion timed out after {secs}s for '{path}'")]
    NormalizationTimeout { path: PathBuf, secs: u64 },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// A document engine rejected the bytes or failed while parsing them.
    #[error("Failed to extract text from {format} document: {detail}")]
    Extraction { format: String, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium on the library search path, or set DOC2MD_PDFIUM_LIB\n\
(--pdfium-lib) to the directory or file of an existing copy."
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scratch directory or file could not be created.
    #[error("Scratch storage error: {0}")]
    Scratch(#[source] std::io::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure category of a [`Doc2MdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Fetch,
    UnsupportedFormat,
    Normalization,
    Extraction,
    Config,
    Io,
    Internal,
}

impl Doc2MdError {
    /// Category used for logging and for callers that want to branch on
    /// the failure class without matching every variant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Doc2MdError::NotFound { .. } | Doc2MdError::PermissionDenied { .. } => {
                ErrorKind::NotFound
            }
            Doc2MdError::InvalidInput { .. } | Doc2MdError::UnsupportedFormat { .. } => {
                ErrorKind::UnsupportedFormat
            }
            Doc2MdError::FetchFailed { .. } | Doc2MdError::FetchTimeout { .. } => ErrorKind::Fetch,
            Doc2MdError::ConverterNotFound { .. }
            | Doc2MdError::Normalization { .. }
            | Doc2MdError::NormalizationTimeout { .. } => ErrorKind::Normalization,
            Doc2MdError::Extraction { .. } | Doc2MdError::PdfiumBindingFailed(_) => {
                ErrorKind::Extraction
            }
            Doc2MdError::OutputWriteFailed { .. } | Doc2MdError::Scratch(_) => ErrorKind::Io,
            Doc2MdError::InvalidConfig(_) => ErrorKind::Config,
            Doc2MdError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn extraction(format: impl Into<String>, detail: impl ToString) -> Self {
        Doc2MdError::Extraction {
            format: format.into(),
            detail: detail.to_string(),
        }
    }
}
