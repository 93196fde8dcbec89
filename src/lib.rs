//! # edgequake-doc2md
//!
//! Turn PDF, DOCX and legacy DOC/WPS documents into plain Markdown text,
//! from a local path or an HTTP/HTTPS URL, as a library, a CLI, or a small
//! HTTP gateway.
//!
//! ## Pipeline Overview
//!
//! ```text
//! reference (path | URL)
//!  │
//!  ├─ 1. Classify  remote/local + declared format, once
//!  ├─ 2. Fetch     GET with browser UA, or read from disk
//!  ├─ 3. Normalize DOC/WPS → DOCX via headless LibreOffice (scratch dir)
//!  ├─ 4. Extract   PDF: pdfium content items → text blocks
//!  │               DOCX: body paragraphs → lines
//!  └─ 5. Output    text, or an error; never partial text
//! ```
//!
//! Format parsing is delegated to swappable engines ([`engine::PdfEngine`],
//! [`engine::DocxReader`]); only text-bearing content is kept.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_doc2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("report.docx", &config).await?;
//!     println!("{}", output.markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Gateway
//!
//! ```rust,no_run
//! use edgequake_doc2md::{server, ConversionConfig, Converter, ServerConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let converter = Converter::new(ConversionConfig::default());
//! server::serve(ServerConfig::default(), converter).await
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2md` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Runtime requirements
//!
//! * PDF: a pdfium shared library (system search path or `pdfium_library_path`).
//! * DOC/WPS: LibreOffice `soffice` (or any compatible `office_program`).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ServerConfig, BROWSER_USER_AGENT};
pub use convert::{convert, convert_sync, convert_to_file, Converter};
pub use engine::{ContentItem, ContentKind, DropMode};
pub use error::{Doc2MdError, ErrorKind};
pub use output::ConversionOutput;
pub use pipeline::reference::{DocumentFormat, InputReference};
