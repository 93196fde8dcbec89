//! CLI binary for edgequake-doc2md.
//!
//! A thin shim over the library crate: `serve` runs the HTTP gateway,
//! `convert` converts one document and prints or writes the text.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_doc2md::{
    convert_to_file, server, ConversionConfig, Converter, DropMode, ServerConfig,
};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the gateway on the default address (127.0.0.1:9999)
  doc2md serve

  # Ask it for text
  curl -s -X POST localhost:9999/convert \
       -H 'content-type: application/json' \
       -d '{"path": "https://example.com/report.pdf"}'

  # One-off conversion to stdout
  doc2md convert contract.docx

  # Legacy formats go through LibreOffice
  doc2md convert minutes.doc -o minutes.md

  # JSON output with format and timing
  doc2md convert --json notes.wps

SUPPORTED FORMATS:
  .pdf    text layer via pdfium (scanned pages yield little or no text)
  .docx   body paragraphs
  .doc    converted to .docx with soffice, then as above
  .wps    converted to .docx with soffice, then as above

ENVIRONMENT VARIABLES:
  DOC2MD_BIND              Gateway listen address
  DOC2MD_OFFICE_PROGRAM    Office converter executable (default: soffice)
  DOC2MD_PDFIUM_LIB        libpdfium file or directory
  DOC2MD_SCRATCH_DIR       Parent directory for scratch files
  RUST_LOG                 Log filter, overrides --verbose / --quiet
"#;

/// Convert PDF, DOCX, DOC and WPS documents to Markdown text.
#[derive(Parser, Debug)]
#[command(
    name = "doc2md",
    version,
    about = "Convert PDF, DOCX, DOC and WPS documents (files or URLs) to Markdown text",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    engine: EngineArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOC2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOC2MD_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP conversion gateway.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "DOC2MD_BIND", default_value = "127.0.0.1:9999")]
        bind: SocketAddr,
    },
    /// Convert one document.
    Convert {
        /// Local file path or HTTP/HTTPS URL.
        input: String,

        /// Write text to this file instead of stdout.
        #[arg(short, long, env = "DOC2MD_OUTPUT")]
        output: Option<PathBuf>,

        /// Output structured JSON (ConversionOutput) instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// HTTP download timeout in seconds.
    #[arg(long, global = true, env = "DOC2MD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Office converter executable for DOC/WPS.
    #[arg(long, global = true, env = "DOC2MD_OFFICE_PROGRAM", default_value = "soffice")]
    office_program: String,

    /// Office converter timeout in seconds.
    #[arg(long, global = true, env = "DOC2MD_NORMALIZE_TIMEOUT", default_value_t = 120)]
    normalize_timeout: u64,

    /// Share the default LibreOffice profile instead of one per conversion.
    #[arg(long, global = true, env = "DOC2MD_SHARED_OFFICE_PROFILE")]
    shared_office_profile: bool,

    /// libpdfium shared library (file, or directory containing it).
    #[arg(long, global = true, env = "DOC2MD_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Parent directory for scratch files.
    #[arg(long, global = true, env = "DOC2MD_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Pages the PDF engine may discard: none, single-page, whole-pdf.
    #[arg(long, global = true, env = "DOC2MD_DROP_MODE", value_enum, default_value = "none")]
    drop_mode: DropModeArg,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum DropModeArg {
    None,
    SinglePage,
    WholePdf,
}

impl From<DropModeArg> for DropMode {
    fn from(v: DropModeArg) -> Self {
        match v {
            DropModeArg::None => DropMode::None,
            DropModeArg::SinglePage => DropMode::SinglePage,
            DropModeArg::WholePdf => DropMode::WholePdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.engine)?;

    match cli.command {
        Command::Serve { bind } => {
            let converter = Converter::new(config);
            server::serve(ServerConfig { bind }, converter)
                .await
                .with_context(|| format!("Gateway on {bind} failed"))?;
        }
        Command::Convert {
            input,
            output,
            json,
        } => {
            if let Some(ref output_path) = output {
                let result = convert_to_file(&input, output_path, &config)
                    .await
                    .context("Conversion failed")?;
                if !cli.quiet {
                    eprintln!(
                        "✔ {} ({})  {} bytes  {}ms  →  {}",
                        result.source,
                        result.format,
                        result.markdown.len(),
                        result.duration_ms,
                        output_path.display(),
                    );
                }
            } else {
                let result = Converter::new(config)
                    .convert(&input)
                    .await
                    .context("Conversion failed")?;

                let stdout = io::stdout();
                let mut handle = stdout.lock();
                if json {
                    let json = serde_json::to_string_pretty(&result)
                        .context("Failed to serialise output")?;
                    writeln!(handle, "{json}").context("Failed to write to stdout")?;
                } else {
                    handle
                        .write_all(result.markdown.as_bytes())
                        .context("Failed to write to stdout")?;
                    if !result.markdown.ends_with('\n') {
                        handle
                            .write_all(b"\n")
                            .context("Failed to write to stdout")?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(args: &EngineArgs) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .download_timeout_secs(args.download_timeout)
        .office_program(args.office_program.clone())
        .normalize_timeout_secs(args.normalize_timeout)
        .isolate_office_profile(!args.shared_office_profile)
        .drop_mode(args.drop_mode.clone().into());

    if let Some(ref path) = args.pdfium_lib {
        builder = builder.pdfium_library_path(path.clone());
    }
    if let Some(ref dir) = args.scratch_dir {
        builder = builder.scratch_root(dir.clone());
    }

    builder.build().context("Invalid configuration")
}
