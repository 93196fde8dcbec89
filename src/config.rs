//! Configuration types for document conversion and the HTTP gateway.
//!
//! Conversion behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. The gateway listener is described by
//! [`ServerConfig`]. Both are plain data: a converter owns its config
//! immutably, so any number of in-flight requests can read it without locks.

use crate::engine::DropMode;
use crate::error::Doc2MdError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// User agent sent with every remote fetch. Some origin servers refuse
/// requests that do not look like they come from a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36";

/// Configuration for a document conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_doc2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .download_timeout_secs(30)
///     .office_program("/usr/bin/soffice")
///     .normalize_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Timeout for remote fetches in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// `User-Agent` header for remote fetches. Default: [`BROWSER_USER_AGENT`].
    pub user_agent: String,

    /// Office converter executable used for DOC/WPS → DOCX. Default: `soffice`.
    pub office_program: String,

    /// Extra arguments placed before the standard converter arguments.
    /// Default: none.
    pub office_args: Vec<String>,

    /// Upper bound on one office converter run, in seconds. Default: 120.
    ///
    /// A converter that has not exited by then is killed and the conversion
    /// fails with [`Doc2MdError::NormalizationTimeout`].
    pub normalize_timeout_secs: u64,

    /// Give every converter run its own LibreOffice user profile inside the
    /// scratch directory. Default: true.
    ///
    /// Two `soffice` processes sharing one profile block each other, so
    /// concurrent requests would otherwise serialise or fail.
    pub isolate_office_profile: bool,

    /// Parent directory for scratch directories. Default: system temp dir.
    pub scratch_root: Option<PathBuf>,

    /// Path to libpdfium (file, or directory containing the platform
    /// library). Default: bind the system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Which pages the PDF engine may discard. Default: [`DropMode::None`].
    pub drop_mode: DropMode,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: 120,
            user_agent: BROWSER_USER_AGENT.to_string(),
            office_program: "soffice".to_string(),
            office_args: Vec::new(),
            normalize_timeout_secs: 120,
            isolate_office_profile: true,
            scratch_root: None,
            pdfium_library_path: None,
            drop_mode: DropMode::None,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn office_program(mut self, program: impl Into<String>) -> Self {
        self.config.office_program = program.into();
        self
    }

    pub fn office_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.office_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn normalize_timeout_secs(mut self, secs: u64) -> Self {
        self.config.normalize_timeout_secs = secs;
        self
    }

    pub fn isolate_office_profile(mut self, v: bool) -> Self {
        self.config.isolate_office_profile = v;
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(dir.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn drop_mode(mut self, mode: DropMode) -> Self {
        self.config.drop_mode = mode;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Doc2MdError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(Doc2MdError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.normalize_timeout_secs == 0 {
            return Err(Doc2MdError::InvalidConfig(
                "Normalize timeout must be ≥ 1 second".into(),
            ));
        }
        if c.office_program.trim().is_empty() {
            return Err(Doc2MdError::InvalidConfig(
                "Office program must not be empty".into(),
            ));
        }
        if let Some(ref root) = c.scratch_root {
            if !root.is_dir() {
                return Err(Doc2MdError::InvalidConfig(format!(
                    "Scratch root '{}' is not a directory",
                    root.display()
                )));
            }
        }
        Ok(self.config)
    }
}

/// Listener configuration for the HTTP gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind. Default: `127.0.0.1:9999`.
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 9999)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.download_timeout_secs, 120);
        assert_eq!(c.office_program, "soffice");
        assert!(c.office_args.is_empty());
        assert!(c.isolate_office_profile);
        assert!(c.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(c.drop_mode, DropMode::None);
        assert_eq!(ServerConfig::default().bind.port(), 9999);
    }

    #[test]
    fn builder_sets_fields() {
        let c = ConversionConfig::builder()
            .office_program("sh")
            .office_args(["fake-soffice.sh"])
            .normalize_timeout_secs(5)
            .isolate_office_profile(false)
            .build()
            .expect("valid config");
        assert_eq!(c.office_program, "sh");
        assert_eq!(c.office_args, vec!["fake-soffice.sh".to_string()]);
        assert_eq!(c.normalize_timeout_secs, 5);
        assert!(!c.isolate_office_profile);
    }

    #[test]
    fn builder_rejects_zero_timeouts() {
        assert!(ConversionConfig::builder()
            .normalize_timeout_secs(0)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .download_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_missing_scratch_root() {
        let err = ConversionConfig::builder()
            .scratch_root("/definitely/not/a/dir")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Scratch root"), "got: {err}");
    }
}
