//! Command-line surface for the `cgpt` binary.
//!
//! Subcommands:
//! - `login` stores credentials in the user config
//! - `where` prints the resolved config path for debugging
//! - `ask` sends a single-turn prompt and prints the reply, streamed by
//!   default

use std::io::{self, BufRead, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use cgpt_api::{extract_text, ApiClient, ApiConfig, CancellationSignal, Mode, RequestPayload};
use cgpt_config::{config_path, update_config, Config};

const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Parser)]
#[command(name = "cgpt", version, about = "Tiny ChatGPT terminal client.")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store the API key (and optional base URL) in the user config.
    Login {
        /// Optional API base URL (leave unset for the default provider endpoint).
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },
    /// Print the resolved config file path.
    Where,
    /// Send a single-turn prompt and print the reply.
    Ask {
        /// Prompt words; reads stdin when omitted.
        prompt: Vec<String>,
        /// Model identifier; falls back to the configured default.
        #[arg(long)]
        model: Option<String>,
        /// API surface: "responses" (default) or "chat".
        #[arg(long)]
        mode: Option<String>,
        /// Base URL override for this call only.
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Wait for the complete reply instead of streaming fragments.
        #[arg(long)]
        no_stream: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Login { base_url } => login(base_url),
        Command::Where => {
            println!("{}", config_path().display());
            Ok(())
        }
        Command::Ask {
            prompt,
            model,
            mode,
            base_url,
            no_stream,
        } => ask(prompt, model, mode, base_url, no_stream).await,
    }
}

fn login(base_url: Option<String>) -> anyhow::Result<()> {
    let api_key = prompt_line("Enter API key: ")?;
    let confirmation = prompt_line("Repeat for confirmation: ")?;
    if api_key != confirmation {
        bail!("API keys did not match");
    }

    let base_url = match base_url {
        Some(url) => Some(url),
        None => {
            let answer = prompt_line("Do you want to set a custom base URL? [y/N]: ")?;
            if answer.eq_ignore_ascii_case("y") {
                Some(prompt_line("Base URL: ")?)
            } else {
                None
            }
        }
    };

    let path = update_config(Config {
        api_key: Some(api_key),
        base_url,
        ..Config::default()
    })
    .context("failed to save credentials")?;

    println!("Saved credentials to: {}", path.display());
    Ok(())
}

async fn ask(
    prompt: Vec<String>,
    model: Option<String>,
    mode: Option<String>,
    base_url: Option<String>,
    no_stream: bool,
) -> anyhow::Result<()> {
    let config = cgpt_config::load_config();
    let Some(api_key) = cgpt_config::resolve_api_key() else {
        bail!("no API key configured; run `cgpt login` or set OPENAI_API_KEY");
    };

    let mode = resolve_mode(mode.as_deref(), &config);
    let model = resolve_model(model, &config);
    let prompt = match prompt_text(prompt) {
        Some(text) => text,
        None => read_stdin_prompt()?,
    };

    let mut api_config = ApiConfig::new(api_key);
    if let Some(base) = base_url.or(config.base_url) {
        api_config = api_config.with_base_url(base);
    }
    let client = ApiClient::new(api_config)?;
    let payload = RequestPayload::new(mode, model, prompt, !no_stream);

    if no_stream {
        let document = client.send(mode, &payload, None).await?;
        match extract_text(mode, &document) {
            Some(text) => println!("{text}"),
            // Keep the whole document visible when no known shape matches.
            None => println!("{}", serde_json::to_string_pretty(&document)?),
        }
        return Ok(());
    }

    let cancel: CancellationSignal = Arc::new(AtomicBool::new(false));
    let mut printer = StreamPrinter::new(io::stdout(), cancel.clone());
    let result = client
        .stream_with_handler(mode, &payload, Some(&cancel), |fragment| {
            printer.print(fragment);
        })
        .await;
    // Already-printed fragments stay on screen even when the stream fails.
    printer.print("\n");
    if let Some(error) = printer.take_error() {
        return Err(error).context("failed to write streamed output");
    }
    result?;
    Ok(())
}

/// Writes fragments as they arrive, flushing after each one. The first write
/// failure (e.g. a closed pipe) raises the cancellation signal so the stream
/// stops pulling instead of printing into the void; the error is kept for
/// the caller.
struct StreamPrinter<W: Write> {
    out: W,
    cancel: CancellationSignal,
    error: Option<io::Error>,
}

impl<W: Write> StreamPrinter<W> {
    fn new(out: W, cancel: CancellationSignal) -> Self {
        Self {
            out,
            cancel,
            error: None,
        }
    }

    fn print(&mut self, fragment: &str) {
        if self.error.is_some() {
            return;
        }
        let result = self
            .out
            .write_all(fragment.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(error) = result {
            self.cancel.store(true, Ordering::Release);
            self.error = Some(error);
        }
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

fn resolve_mode(flag: Option<&str>, config: &Config) -> Mode {
    flag.or(config.default_mode.as_deref())
        .map(Mode::parse)
        .unwrap_or_default()
}

fn resolve_model(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.default_model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

fn prompt_text(words: Vec<String>) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn read_stdin_prompt() -> anyhow::Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read prompt from stdin")?;
    Ok(buffer.trim_end_matches('\n').to_string())
}

fn prompt_line(message: &str) -> anyhow::Result<String> {
    eprint!("{message}");
    io::stderr().flush().ok();

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("failed to read input")?;
    Ok(input.trim().to_string())
}
