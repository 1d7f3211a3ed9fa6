use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use label_verify_core::{
    verify_label, ConfigError, ProductDeclaration, RecognitionResult, VerificationConfig,
    VerifyError,
};

/// Check a label's recognized text against its declared attributes.
///
/// Prints the verification result as JSON. Exits 0 when the label passes,
/// 1 when it fails, 2 when it could not be verified.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Product declaration (JSON)
    #[arg(short, long)]
    declaration: PathBuf,

    /// Recognition result from the OCR provider (JSON)
    #[arg(short, long)]
    recognition: PathBuf,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("failed to render result: {0}")]
    Render(#[from] serde_json::Error),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn describe_metrics() {
    metrics::describe_counter!(
        "label_verifications_total",
        "Label verifications completed, by grade and outcome"
    );
    metrics::describe_counter!(
        "label_field_results_total",
        "Field verdicts produced, by field and status"
    );
    metrics::describe_histogram!(
        "label_verification_seconds",
        "Time to verify one label"
    );
}

/// Returns whether the label passed.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let config = VerificationConfig::from_env()?;
    let declaration: ProductDeclaration = read_json(&cli.declaration)?;
    let recognition: RecognitionResult = read_json(&cli.recognition)?;

    tracing::info!(
        declaration = %cli.declaration.display(),
        recognition = %cli.recognition.display(),
        units = recognition.units().len(),
        "Verifying label"
    );

    let result = verify_label(&declaration, &recognition, &config)?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");

    Ok(result.overall_match)
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    describe_metrics();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "Label verification did not complete");
            ExitCode::from(2)
        }
    }
}
