//! Legacy format normalisation: DOC/WPS → DOCX through an office converter.
//!
//! The legacy bytes are materialised into a [`ScratchFile`] and the converter
//! (LibreOffice `soffice` by default) is run headless with the scratch
//! directory as its output directory:
//!
//! ```text
//! soffice --headless [-env:UserInstallation=file:///…/profile]
//!         --convert-to docx --outdir <scratch> <scratch>/<uuid>.doc
//! ```
//!
//! The converter writes `<scratch>/<uuid>.docx`. The returned
//! [`NormalizedDocument`] points at that path and owns the scratch directory,
//! so the caller can fetch the result before everything is removed.
//!
//! The run is bounded by `normalize_timeout_secs`; on expiry the child is
//! killed. A non-zero exit status fails with [`Doc2MdError::Normalization`]
//! carrying the converter's stderr. A zero exit that produced no file is not
//! detected here: the subsequent fetch reports it as not found.

use super::reference::{DocumentFormat, InputReference};
use super::scratch::ScratchFile;
use crate::config::ConversionConfig;
use crate::error::Doc2MdError;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Longest stderr excerpt kept in an error message.
const MAX_STDERR_BYTES: usize = 2048;

/// A converted document plus the scratch directory it lives in.
#[derive(Debug)]
pub struct NormalizedDocument {
    reference: InputReference,
    _scratch: ScratchFile,
}

impl NormalizedDocument {
    /// Local reference to the expected `.docx` output.
    pub fn reference(&self) -> &InputReference {
        &self.reference
    }
}

/// Convert legacy `bytes` of the given format to DOCX.
pub async fn normalize_legacy(
    bytes: &[u8],
    format: DocumentFormat,
    config: &ConversionConfig,
) -> Result<NormalizedDocument, Doc2MdError> {
    let suffix = match format {
        DocumentFormat::Doc | DocumentFormat::Wps => format.extension().unwrap_or("doc"),
        other => {
            return Err(Doc2MdError::Internal(format!(
                "normalize_legacy called for {other} document"
            )))
        }
    };

    let scratch = ScratchFile::materialize(bytes, suffix, config.scratch_root.as_deref()).await?;
    let args = converter_args(&scratch, config);

    info!(
        "Normalizing {} document with {}",
        format, config.office_program
    );
    debug!("Converter args: {:?}", args);

    let child = Command::new(&config.office_program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Doc2MdError::ConverterNotFound {
                    program: config.office_program.clone(),
                }
            } else {
                Doc2MdError::Internal(format!(
                    "Failed to start '{}': {}",
                    config.office_program, e
                ))
            }
        })?;

    let start = Instant::now();
    let timeout = Duration::from_secs(config.normalize_timeout_secs);
    // Dropping the `wait_with_output` future on timeout drops the child,
    // which kills it (`kill_on_drop`).
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| {
            Doc2MdError::Internal(format!("Waiting for office converter failed: {e}"))
        })?,
        Err(_) => {
            warn!(
                "Office converter exceeded {}s on {}",
                config.normalize_timeout_secs,
                scratch.path().display()
            );
            return Err(Doc2MdError::NormalizationTimeout {
                path: scratch.path().to_path_buf(),
                secs: config.normalize_timeout_secs,
            });
        }
    };

    if !output.status.success() {
        return Err(Doc2MdError::Normalization {
            path: scratch.path().to_path_buf(),
            status: output.status.to_string(),
            stderr: excerpt(&output.stderr),
        });
    }

    let converted = scratch.sibling_with_extension("docx");
    info!(
        "Office converter finished in {}ms → {}",
        start.elapsed().as_millis(),
        converted.display()
    );

    Ok(NormalizedDocument {
        reference: InputReference::local(&converted),
        _scratch: scratch,
    })
}

/// Full converter argument vector for one scratch file.
fn converter_args(scratch: &ScratchFile, config: &ConversionConfig) -> Vec<String> {
    let mut args = config.office_args.clone();
    args.push("--headless".to_string());
    if config.isolate_office_profile {
        let profile = scratch.dir().join("profile");
        match reqwest::Url::from_directory_path(&profile) {
            Ok(url) => args.push(format!("-env:UserInstallation={url}")),
            Err(()) => warn!(
                "Cannot express {} as a file URL; using the shared office profile",
                profile.display()
            ),
        }
    }
    args.extend([
        "--convert-to".to_string(),
        "docx".to_string(),
        "--outdir".to_string(),
        scratch.dir().to_string_lossy().into_owned(),
        scratch.path().to_string_lossy().into_owned(),
    ]);
    args
}

fn excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        return "(no output on stderr)".to_string();
    }
    if text.len() <= MAX_STDERR_BYTES {
        return text.to_string();
    }
    let mut cut = MAX_STDERR_BYTES;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\u{2026}", &text[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn args_end_with_outdir_and_source() {
        let scratch = ScratchFile::materialize(b"x", "doc", None).await.unwrap();
        let config = ConversionConfig::builder()
            .office_args(["--norestore"])
            .build()
            .unwrap();
        let args = converter_args(&scratch, &config);

        assert_eq!(args[0], "--norestore");
        assert_eq!(args[1], "--headless");
        assert!(args[2].starts_with("-env:UserInstallation=file://"), "{:?}", args);
        let n = args.len();
        assert_eq!(args[n - 5..n - 2], ["--convert-to", "docx", "--outdir"]);
        assert_eq!(args[n - 2], scratch.dir().to_string_lossy());
        assert_eq!(args[n - 1], scratch.path().to_string_lossy());
    }

    #[tokio::test]
    async fn shared_profile_when_isolation_disabled() {
        let scratch = ScratchFile::materialize(b"x", "wps", None).await.unwrap();
        let config = ConversionConfig::builder()
            .isolate_office_profile(false)
            .build()
            .unwrap();
        let args = converter_args(&scratch, &config);
        assert!(!args.iter().any(|a| a.starts_with("-env:")));
        assert_eq!(args.len(), 6);
    }

    #[test]
    fn stderr_excerpt_is_trimmed_and_capped() {
        assert_eq!(excerpt(b"  boom \n"), "boom");
        assert_eq!(excerpt(b""), "(no output on stderr)");
        let long = "é".repeat(MAX_STDERR_BYTES);
        let cut = excerpt(long.as_bytes());
        assert!(cut.len() <= MAX_STDERR_BYTES + '\u{2026}'.len_utf8());
        assert!(cut.ends_with('\u{2026}'));
    }

    #[tokio::test]
    async fn rejects_non_legacy_format() {
        let err = normalize_legacy(b"x", DocumentFormat::Pdf, &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Doc2MdError::Internal(_)));
    }

    #[tokio::test]
    async fn missing_converter_is_reported() {
        let config = ConversionConfig::builder()
            .office_program("/definitely/not/soffice")
            .build()
            .unwrap();
        let err = normalize_legacy(b"x", DocumentFormat::Doc, &config)
            .await
            .unwrap_err();
        assert!(
            matches!(err, Doc2MdError::ConverterNotFound { .. }),
            "got: {err:?}"
        );
    }
}
