//! docclass — classify a PDF document.
//!
//! Prints exactly one JSON line to stdout: `{"category", "confidence"}` on
//! success, `{"error"}` otherwise. Diagnostics go to stderr.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

use docclass::{ClassificationResult, Config, DocclassError, Document, DocumentClassifier, Report};

const FAIL_ON_ERROR_FLAG: &str = "--fail-on-error";

/// Zero-shot PDF document classifier
#[derive(Parser)]
#[command(name = "docclass")]
#[command(version = docclass::PKG_VERSION)]
#[command(about = "Classify a PDF as Education, Work, Health, Finance, Travel or Legal")]
struct Args {
    /// PDF file to classify (may start with '-')
    #[arg(allow_hyphen_values = true)]
    file: Option<PathBuf>,

    /// Further arguments are accepted and ignored
    #[arg(hide = true)]
    ignored: Vec<OsString>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exit with status 1 when an error is reported (default: always 0)
    #[arg(long)]
    fail_on_error: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (default: warn; override with RUST_LOG). Stdout is
    // reserved for the report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let fail_on_error = std::env::args_os().any(|a| a == FAIL_ON_ERROR_FLAG);
            return emit(&Report::error(usage_error(&e)), fail_on_error);
        }
    };
    debug!(version = docclass::version_string(), "docclass starting");

    if !args.ignored.is_empty() {
        debug!(count = args.ignored.len(), "ignoring extra arguments");
    }

    let report = Report::from(classify(&args).await);
    emit(&report, args.fail_on_error)
}

/// Print the report line and pick the exit status.
fn emit(report: &Report, fail_on_error: bool) -> ExitCode {
    println!("{}", report.to_json_line());

    if report.is_error() && fail_on_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// First line of a clap error, without its `error: ` prefix.
fn usage_error(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

/// Load the document first so bad input is reported before the model loads.
async fn classify(args: &Args) -> docclass::Result<ClassificationResult> {
    let path = args.file.as_deref().ok_or(DocclassError::MissingArgument)?;

    let document = Document::load(path)?;
    if document.is_blank() {
        return Err(DocclassError::NoText);
    }

    let config = Config::load(args.config.as_deref())?;
    let secrets = config.load_secrets()?;
    let classifier = DocumentClassifier::from_config(&config, &secrets)?;

    classifier.classify_loaded(&document).await
}
