mod bounce;
mod browser;
mod config;
mod locale;
mod translator;

use std::ffi::OsString;
use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use config::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use translator::GoogleTranslator;

const AFTER_HELP: &str = "\
Source language is detected automatically.

Environment:
  [one of these]
  GOOGLE_TRANSLATE_API_KEY       Your Google Translate API key
  GOOGLE_TRANSLATE_ACCESS_TOKEN  Your Google Translate access token
                                 (the API key wins if both are set)

  [optional]
  GOOGLE_TRANSLATE_LANG          default target language (e.g. en, ja, ...)
  GOOGLE_TRANSLATE_SECOND_LANG   second language (e.g. en, ja, ...)

  Without --to or GOOGLE_TRANSLATE_LANG the target language comes from
  $LANGUAGE, $LC_ALL or $LANG. If GOOGLE_TRANSLATE_SECOND_LANG is set, text
  that is already in the target language is translated into the second
  language instead.

Example:
  $ gtrans \"Rust is awesome\"
  Rustは素晴らしいです
  $ gtrans \"Rustは素晴らしいです\"
  Rust is great
  $ gtrans \"Rustは素晴らしいです\" | gtrans | gtrans | gtrans ...";

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Translate text from arguments or stdin with Google Translate",
    long_about = None,
    after_help = AFTER_HELP
)]
pub struct Args {
    #[arg(
        short,
        long = "to",
        value_name = "LANG",
        help = "Language code (https://cloud.google.com/translate/docs/languages) to translate to"
    )]
    pub to_lang: Option<String>,
    #[arg(
        short,
        long,
        help = "Open Google Translate in the browser instead of writing the translation to stdout"
    )]
    pub open: bool,
    #[arg(help = "Text to translate, if not provided, stdin will be used")]
    pub text: Vec<String>,
}

impl Args {
    /// Positional words joined by spaces, `None` when they make up nothing.
    fn joined_text(&self) -> Option<String> {
        Some(self.text.join(" ")).filter(|text| !text.is_empty())
    }
}

/// Rewrites the single-dash long flags `-to`, `-to=LANG` and `-open` to their
/// `--` forms so they are not read as `-t o`. Arguments after `--` are untouched.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let long = match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    None
                }
                Some(flag @ ("-to" | "-open")) => Some(format!("-{}", flag)),
                Some(flag) if flag.starts_with("-to=") => Some(format!("-{}", flag)),
                _ => None,
            };
            long.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gtrans=warn")),
        )
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse_from(normalize_args(std::env::args_os()));
    init_logging();

    match run(args, Config::from_env(), browser::open_in_browser) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn read_input<R: Read>(mut input: R) -> anyhow::Result<String> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .context("fail to read stdin")?;
    Ok(text)
}

/// `open_url` receives the Google Translate web link in `--open` mode.
fn run<F>(args: Args, config: Config, open_url: F) -> anyhow::Result<()>
where
    F: FnOnce(&str) -> anyhow::Result<()>,
{
    let to_lang = locale::select_target_lang(args.to_lang.as_deref(), &config)?;
    debug!(to_lang = %to_lang, "selected target language");

    let text = match args.joined_text() {
        Some(text) => text,
        None => read_input(std::io::stdin())?,
    };

    if args.open {
        return open_url(&browser::google_translate_url(&to_lang, &text));
    }

    let translator = GoogleTranslator::new(config.credential()?);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut stdout = std::io::stdout().lock();
    runtime.block_on(bounce::run_translation(
        &translator,
        &mut stdout,
        &text,
        &to_lang,
        config.second_lang.as_deref(),
    ))
}
