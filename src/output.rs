//! Conversion output types.

use crate::pipeline::reference::DocumentFormat;
use serde::{Deserialize, Serialize};

/// Result of one successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Extracted text.
    pub markdown: String,
    /// Format declared by the caller's reference (before normalisation).
    pub format: DocumentFormat,
    /// The reference as supplied by the caller.
    pub source: String,
    /// Wall-clock time spent converting.
    pub duration_ms: u64,
}
