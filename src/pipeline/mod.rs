//! Pipeline stages for document-to-text conversion.
//!
//! Each submodule implements one step; [`crate::convert::Converter`] wires
//! them together.
//!
//! ## Data Flow
//!
//! ```text
//! reference ──▶ fetch ──▶ [normalize ──▶ fetch] ──▶ extract
//! (URL/path)    (bytes)    (DOC/WPS → DOCX)          (PDF | DOCX → text)
//! ```
//!
//! 1. [`reference`]: classify the caller's string once (remote or local,
//!    and which [`reference::DocumentFormat`])
//! 2. [`fetch`]: read the bytes; the only place sources are touched
//! 3. [`scratch`]: self-removing temp directories for tools that need paths
//! 4. [`normalize`]: run the office converter on legacy formats
//! 5. [`extract`]: drive the document engines and assemble the text

pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod reference;
pub mod scratch;
