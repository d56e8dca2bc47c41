//! CLI for requesting one image from Gemini.
//!
//! Prints exactly one JSON document on stdout and exits 0, whatever happens
//! to the request. Progress goes to stderr.
//!
//! The prompt may start with `-`. Options go before the prompt or after the
//! API key.

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use genimg::image::providers::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use genimg::{GenImgError, GenerationResult, ImageRequestor, RequestorConfig};
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genimg")]
#[command(about = "Generate an image with Gemini and print the result as JSON")]
#[command(version)]
struct Cli {
    /// Text describing the image
    #[arg(value_name = "PROMPT", allow_hyphen_values = true)]
    prompt: Option<String>,

    /// Gemini API key
    #[arg(value_name = "API_KEY")]
    api_key: Option<String>,

    /// Ignored
    #[arg(hide = true)]
    extra: Vec<String>,

    /// Gemini model identifier
    #[arg(long, env = "GENIMG_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// API root (e.g. a proxy)
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "GENIMG_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    /// Image to restyle, as an http(s) URL or a local path
    #[arg(long, value_name = "URL_OR_PATH")]
    image_url: Option<String>,

    /// Attach debug_info to the JSON and log at debug level
    #[arg(long)]
    debug: bool,

    /// Suppress progress logging
    #[arg(short, long, conflicts_with = "debug")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let err = GenImgError::InvalidArguments(clap_message(&e.to_string()));
            return emit(&GenerationResult::from_error(&err));
        }
    };

    init_logging(&cli);

    let args: Vec<String> = cli
        .prompt
        .into_iter()
        .chain(cli.api_key)
        .chain(cli.extra)
        .collect();

    let requestor = ImageRequestor::new(RequestorConfig {
        model: cli.model,
        base_url: cli.base_url,
        timeout: Duration::from_secs(cli.timeout_secs),
        input_image: cli.image_url,
        debug_info: cli.debug,
    });

    let result = requestor.run(&args).await;
    tracing::debug!(success = result.success, "writing JSON result");
    emit(&result)
}

fn init_logging(cli: &Cli) {
    let default = if cli.quiet {
        "off"
    } else if cli.debug {
        "genimg=debug"
    } else {
        "genimg=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Writes the result line. A closed stdout is logged, not fatal.
fn emit(result: &GenerationResult) -> anyhow::Result<()> {
    let json = result.to_json()?;
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{json}").and_then(|()| stdout.flush()) {
        tracing::warn!("failed to write result: {e}");
    }
    Ok(())
}

/// First line of a clap error, without its `error: ` label.
fn clap_message(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default().trim();
    line.strip_prefix("error:").unwrap_or(line).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clap_message() {
        assert_eq!(
            clap_message("error: unexpected argument '--nope' found\n\nUsage: genimg"),
            "unexpected argument '--nope' found"
        );
        assert_eq!(clap_message("plain"), "plain");
    }

    #[test]
    fn test_hyphen_prompt_is_positional() {
        let cli = Cli::try_parse_from([
            "genimg",
            "-q",
            "-a moody sky",
            "AIzaKey",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.prompt.as_deref(), Some("-a moody sky"));
        assert_eq!(cli.api_key.as_deref(), Some("AIzaKey"));
        assert_eq!(cli.timeout_secs, 5);
        assert!(cli.extra.is_empty());
    }

    #[test]
    fn test_unknown_flag_after_key_is_rejected() {
        let err = Cli::try_parse_from(["genimg", "a cat", "AIzaKey", "--nope"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ClapErrorKind::UnknownArgument);
    }
}
