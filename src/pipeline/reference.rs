//! Input references: where a document lives and what format it claims to be.
//!
//! A reference is classified exactly once, at the boundary, into a
//! [`Location`] and a [`DocumentFormat`]. Every later stage matches on those
//! enums instead of re-inspecting suffix strings.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Declared document format, taken from the reference's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Wps,
    Unsupported,
}

impl DocumentFormat {
    /// Classify a file extension (without the dot). Case-insensitive.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            "doc" => DocumentFormat::Doc,
            "wps" => DocumentFormat::Wps,
            _ => DocumentFormat::Unsupported,
        }
    }

    /// Canonical extension, `None` for [`DocumentFormat::Unsupported`].
    pub fn extension(self) -> Option<&'static str> {
        match self {
            DocumentFormat::Pdf => Some("pdf"),
            DocumentFormat::Docx => Some("docx"),
            DocumentFormat::Doc => Some("doc"),
            DocumentFormat::Wps => Some("wps"),
            DocumentFormat::Unsupported => None,
        }
    }

    /// Binary office formats that must be normalised to DOCX first.
    pub fn is_legacy(self) -> bool {
        matches!(self, DocumentFormat::Doc | DocumentFormat::Wps)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extension() {
            Some(ext) => f.write_str(&ext.to_ascii_uppercase()),
            None => f.write_str("unsupported"),
        }
    }
}

/// Where the document bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(Url),
    Local(PathBuf),
}

/// A caller-supplied document reference, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputReference {
    raw: String,
    location: Location,
    format: DocumentFormat,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

impl InputReference {
    /// Classify a raw reference string.
    ///
    /// Strings starting with `http://` or `https://` that parse as URLs are
    /// remote; their extension is read from the URL path so query strings
    /// and fragments do not hide it. Everything else is a local path.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let remote = if is_url(&raw) {
            Url::parse(&raw).ok()
        } else {
            None
        };

        let (location, format) = match remote {
            Some(url) => {
                let format = extension_of(url.path());
                (Location::Remote(url), format)
            }
            None => {
                let path = PathBuf::from(&raw);
                let format = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map_or(DocumentFormat::Unsupported, DocumentFormat::from_extension);
                (Location::Local(path), format)
            }
        };

        Self {
            raw,
            location,
            format,
        }
    }

    /// Reference to a local file, e.g. the output of the office converter.
    pub fn local(path: impl AsRef<Path>) -> Self {
        Self::parse(path.as_ref().to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.location, Location::Remote(_))
    }
}

impl fmt::Display for InputReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn extension_of(url_path: &str) -> DocumentFormat {
    url_path
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map_or(DocumentFormat::Unsupported, |(_, ext)| {
            DocumentFormat::from_extension(ext)
        })
}
