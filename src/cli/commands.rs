//! CLI argument definitions and the translate handler

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use tracing::{debug, info};

use crate::core::client::YandexTranslator;
use crate::core::config::{TranslatorConfig, API_KEY_ENV};
use crate::core::models::LanguageTag;

/// Attribution required by the Yandex.Translate terms of use
pub const ATTRIBUTION: &str = "Powered by Yandex.Translate (http://translate.yandex.ru/)";

/// Exit status for a successful run, `--help` and `--version`
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for malformed command lines
pub const EXIT_PARSE_FAILURE: u8 = 1;

/// Exit status for invalid arguments, configuration and translation failures
pub const EXIT_FAILURE: u8 = 2;

/// Translate text with Yandex.Translate
#[derive(Parser, Debug)]
#[command(name = "translate", about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// From language (auto-detect if not specified)
    #[arg(short, long)]
    pub from: Option<String>,

    /// To language
    #[arg(short, long, default_value = "ru")]
    pub to: String,

    /// API key (optional, defaults to YANDEX_API_KEY env var)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Print the version information and exit
    #[arg(short, long)]
    pub version: bool,

    /// Text to translate
    #[arg(value_name = "TEXT")]
    pub text: Vec<String>,
}

/// Arguments validated before any configuration or network access
#[derive(Debug)]
pub struct TranslateArgs {
    /// Source language, `None` for auto-detection
    pub from: Option<LanguageTag>,
    /// Target language
    pub to: LanguageTag,
    /// Positional words joined with single spaces
    pub text: String,
}

/// What one invocation writes and how it exits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Text for standard output
    pub stdout: String,
    /// Text for standard error
    pub stderr: String,
    /// Process exit status
    pub exit_code: u8,
}

impl Outcome {
    fn success(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: EXIT_SUCCESS,
        }
    }

    fn failure(exit_code: u8, stderr: String) -> Self {
        Self {
            stdout: String::new(),
            stderr,
            exit_code,
        }
    }
}

impl Cli {
    /// Check the positional text and parse both language codes
    pub fn validate(&self) -> anyhow::Result<TranslateArgs> {
        if self.text.is_empty() {
            anyhow::bail!("the required argument `text (at least 1 argument)` was not provided");
        }

        let to = LanguageTag::parse(&self.to).context("Failed to parse `to language`")?;

        let from = match &self.from {
            Some(from) => {
                LanguageTag::parse_optional(from).context("Failed to parse `from language`")?
            }
            None => None,
        };

        Ok(TranslateArgs {
            from,
            to,
            text: self.text.join(" "),
        })
    }

    /// Build the translator configuration from `lookup`, with `--api-key` taking precedence
    pub fn config_with<F>(&self, lookup: F) -> anyhow::Result<TranslatorConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = TranslatorConfig::from_lookup(|name| match &self.api_key {
            Some(key) if name == API_KEY_ENV => Some(key.clone()),
            _ => lookup(name),
        })?;
        Ok(config)
    }
}

/// Parse the command line
///
/// Help output and malformed command lines come back as a finished [`Outcome`].
pub fn parse_args<I, T>(args: I) -> Result<Cli, Outcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| {
        let rendered = e.render().to_string();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Outcome::success(rendered),
            _ => Outcome::failure(EXIT_PARSE_FAILURE, rendered),
        }
    })
}

/// Version line printed for `--version`
pub fn version_line() -> String {
    format!("Translate version {}", crate::VERSION)
}

/// Translation followed by a blank line and the attribution
pub fn render_translation(result: &str) -> String {
    format!("{}\n\n{}\n", result, ATTRIBUTION)
}

/// Run a parsed command line against the process environment
pub async fn execute(cli: &Cli) -> Outcome {
    execute_with(cli, |name| std::env::var(name).ok()).await
}

/// Run a parsed command line, reading configuration through `lookup`
pub async fn execute_with<F>(cli: &Cli, lookup: F) -> Outcome
where
    F: Fn(&str) -> Option<String>,
{
    if cli.version {
        return Outcome::success(format!("{}\n", version_line()));
    }

    match handle_translate_with(cli, lookup).await {
        Ok(result) => Outcome::success(render_translation(&result)),
        Err(e) => Outcome::failure(EXIT_FAILURE, format!("{:#}\n", e)),
    }
}

/// Handle the translate command, returning the translated text
async fn handle_translate_with<F>(cli: &Cli, lookup: F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let config = cli.config_with(lookup)?;
    let args = cli.validate()?;

    info!("Target language: {}", args.to);
    match &args.from {
        Some(from) => info!("Source language: {}", from),
        None => info!("Source language: auto-detect"),
    }
    debug!("Text: {:?}", args.text);

    let translator = YandexTranslator::new(config, None)?;
    let result = translator
        .translate(args.from.as_ref(), &args.to, &args.text)
        .await
        .context("Failed to translate")?;

    Ok(result)
}
