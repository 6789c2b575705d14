//! # Signet CLI
//!
//! Command-line interface for the email signature generator.
//!
//! ## Usage
//!
//! ```bash
//! # Check a form document, printing the error mapping
//! signet validate signature.toml
//!
//! # Write the HTML fragment
//! signet render signature.json --out signature.html
//!
//! # Export a picture (writes email-signature.png)
//! signet export signature.json --format png
//!
//! # Serve the web form
//! signet serve --listen 127.0.0.1:8080
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

use signet::{
    SignetError,
    export::{self, ExportFormat, HttpImageSource, export_rich_text, resolve_images},
    form::{SignatureForm, validate},
    render::{RenderTree, render},
    server::{self, ServerConfig},
    telemetry::{self, LogFormat, LoggingSettings},
};

/// Signet - email signature generator
#[derive(Parser, Debug)]
#[command(name = "signet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, env = "SIGNET_LOG_LEVEL", default_value = "info")]
    log_level: LevelFilter,

    /// Log line format
    #[arg(long, global = true, env = "SIGNET_LOG_FORMAT", value_enum, default_value_t)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a form document and print its error mapping as JSON
    Validate {
        /// Form document (.json or .toml)
        file: PathBuf,
    },

    /// Render a form document to an HTML fragment
    Render {
        /// Form document (.json or .toml)
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Self-close void elements (XHTML)
        #[arg(long)]
        xhtml: bool,
    },

    /// Export a form document as an image or clipboard payload
    Export {
        /// Form document (.json or .toml)
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
        format: OutputFormat,

        /// Output file (defaults to email-signature.<ext>; rich-text
        /// defaults to stdout)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Serve the web form
    Serve {
        /// Address to listen on
        #[arg(long, env = "SIGNET_LISTEN", default_value = "127.0.0.1:8080")]
        listen: String,

        /// Idle seconds before a form session expires
        #[arg(long, env = "SIGNET_SESSION_TTL_SECS", default_value_t = server::SESSION_EXPIRATION_SECS)]
        session_ttl_secs: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Jpeg,
    Svg,
    RichText,
}

impl OutputFormat {
    fn file_format(self) -> Option<ExportFormat> {
        match self {
            OutputFormat::Png => Some(ExportFormat::Png),
            OutputFormat::Jpeg => Some(ExportFormat::Jpeg),
            OutputFormat::Svg => Some(ExportFormat::Svg),
            OutputFormat::RichText => None,
        }
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32, SignetError> {
    let cli = Cli::parse();

    telemetry::init(&LoggingSettings {
        level: cli.log_level,
        format: cli.log_format,
    })?;

    match cli.command {
        Commands::Validate { file } => {
            let form = load_form(&file)?;
            let errors = validate(&form);
            println!("{}", to_json(&errors)?);
            Ok(if errors.is_empty() { 0 } else { 1 })
        }

        Commands::Render { file, out, xhtml } => {
            let tree = load_tree(&file)?;
            let markup = if xhtml { tree.to_xhtml() } else { tree.to_html() };
            write_output(out.as_deref(), markup.as_bytes())?;
            Ok(0)
        }

        Commands::Export { file, format, out } => {
            let tree = load_tree(&file)?;

            let Some(file_format) = format.file_format() else {
                let rich = to_json(&export_rich_text(&tree))?;
                write_output(out.as_deref(), rich.as_bytes())?;
                return Ok(0);
            };

            let runtime = tokio::runtime::Runtime::new()?;
            let source = HttpImageSource::new()?;
            let images = runtime.block_on(resolve_images(&tree, &source));
            let bytes = export::export(&tree, file_format, &images)?;

            let path = out.unwrap_or_else(|| PathBuf::from(file_format.file_name()));
            std::fs::write(&path, &bytes)?;
            info!(path = %path.display(), bytes = bytes.len(), "exported {}", file_format);
            Ok(0)
        }

        Commands::Serve {
            listen,
            session_ttl_secs,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                session_ttl: Duration::from_secs(session_ttl_secs),
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))?;
            Ok(0)
        }
    }
}

/// Load a form and normalize it as if every field had been left once.
fn load_form(path: &Path) -> Result<SignatureForm, SignetError> {
    let mut form = SignatureForm::load(path)?;
    form.normalize_all();
    debug!(path = %path.display(), "loaded form");
    Ok(form)
}

fn load_tree(path: &Path) -> Result<RenderTree, SignetError> {
    let model = load_form(path)?.to_model().map_err(SignetError::Invalid)?;
    Ok(render(&model))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SignetError> {
    serde_json::to_string_pretty(value).map_err(|e| SignetError::Parse(e.to_string()))
}

fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<(), SignetError> {
    match out {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
