//! CLI for converting Speaker Deck presentations into Google Slides.

mod config;
mod fetch;
mod report;
mod trigger;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use deck_core::{ConvertRequest, ConvertResponse, PresentationRecord};
use deck_extract::{analyze_page, is_presentation_page, Extractor, ExtractorOptions, Page};
use deck_upload::{
    spawn_worker, CommandToken, HttpSlidesApi, InstalledAppFlow, StaticToken, TokenProvider,
    Uploader, WorkerHandle,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

use crate::config::{Config, Credentials};
use crate::trigger::{ControlState, ConversionGuard, TriggerControl, RESET_DELAY};

/// Extract Speaker Deck slides and rebuild them as a Google Slides presentation.
#[derive(Parser, Debug)]
#[command(name = "deck2slides")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract slide data and print it as JSON
    Extract {
        #[command(flatten)]
        source: SourceArgs,

        /// Scan slide images instead of reading the transcript
        #[arg(long)]
        skip_transcript: bool,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report which page structures are present
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Extract slides and upload them to Google Slides
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Scan slide images instead of reading the transcript
        #[arg(long)]
        skip_transcript: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Open the new presentation in the browser
        #[arg(long)]
        open: bool,

        /// OAuth access token (overrides GOOGLE_ACCESS_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Slides API base URL (overrides SLIDES_API_BASE)
        #[arg(long)]
        api_base: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct SourceArgs {
    /// Presentation page URL
    url: Url,

    /// Read the page from a saved HTML file instead of fetching it
    #[arg(long)]
    html: Option<PathBuf>,

    /// Re-fetch the page every N milliseconds while waiting for content (0 = off)
    #[arg(long, default_value = "0")]
    poll_ms: u64,
}

impl SourceArgs {
    async fn load(&self) -> Result<Page> {
        if !is_presentation_page(&self.url) {
            bail!("{} is not a Speaker Deck presentation page", self.url);
        }
        let poll = Duration::from_millis(self.poll_ms);
        fetch::load_page(self.url.clone(), self.html.as_deref(), Some(poll)).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Extract {
            source,
            skip_transcript,
            output,
        } => run_extract(&source, skip_transcript, output.as_deref()).await,
        Command::Analyze { source } => {
            let page = source.load().await?;
            print!("{}", analyze_page(&page));
            Ok(())
        }
        Command::Convert {
            source,
            skip_transcript,
            yes,
            open,
            token,
            api_base,
        } => {
            let config = Config::from_env();
            log::debug!("{:?}", config);
            let uploader = build_uploader(&config, token, api_base)?;
            run_convert(&source, skip_transcript, yes, open, &config, uploader).await
        }
    }
}

fn extractor(skip_transcript: bool) -> Extractor {
    Extractor::with_options(ExtractorOptions {
        skip_transcript,
        ..ExtractorOptions::default()
    })
}

async fn run_extract(source: &SourceArgs, skip_transcript: bool, output: Option<&Path>) -> Result<()> {
    let page = source.load().await?;

    let Some(record) = extractor(skip_transcript).extract(&page).await else {
        eprintln!("{}", report::extraction_failed());
        std::process::exit(1);
    };

    let json = serde_json::to_string_pretty(&record).context("Failed to serialize presentation")?;
    match output {
        Some(path) => {
            tokio::fs::write(path, format!("{}\n", json))
                .await
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            log::info!("Written to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn build_uploader(config: &Config, token: Option<String>, api_base: Option<String>) -> Result<Uploader> {
    let tokens: Box<dyn TokenProvider> = match config.credentials(token) {
        Credentials::Token(token) => Box::new(StaticToken::new(token)),
        Credentials::SignIn {
            client_id,
            client_secret,
        } => Box::new(
            InstalledAppFlow::new(client_id)
                .context("Invalid CLIENT_ID")?
                .with_client_secret(client_secret),
        ),
        Credentials::Command(command) => Box::new(
            CommandToken::from_command_line(&command)
                .context("Invalid DECK2SLIDES_TOKEN_COMMAND")?,
        ),
    };

    let base_url = api_base.unwrap_or_else(|| config.api_base.clone());
    let api = HttpSlidesApi::with_base_url(base_url).context("Failed to build Slides API client")?;

    Ok(Uploader::new(tokens, Box::new(api)))
}

async fn run_convert(
    source: &SourceArgs,
    skip_transcript: bool,
    yes: bool,
    open: bool,
    config: &Config,
    uploader: Uploader,
) -> Result<()> {
    let control = TriggerControl::new();
    let worker = spawn_worker(uploader);

    let guard = control.begin()?;
    show(&control);

    let page = source.load().await?;
    let Some(record) = extractor(skip_transcript).extract(&page).await else {
        let _reset = guard.settle(ControlState::ExtractionFailed, RESET_DELAY);
        show(&control);
        eprintln!("{}", report::extraction_failed());
        std::process::exit(1);
    };
    drop(page);

    if !yes && !confirm(&record).await? {
        log::debug!("User cancelled conversion");
        guard.cancel();
        show(&control);
        return Ok(());
    }

    let response = upload(&guard, &control, &worker, record).await?;
    let outcome = if response.success {
        ControlState::Succeeded
    } else {
        ControlState::Failed
    };
    let _reset = guard.settle(outcome, RESET_DELAY);
    show(&control);

    let message = report::conversion_outcome(&response, &config.oauth);
    if response.success {
        println!("{}", message);
        if open {
            open_presentation(&response);
        }
        Ok(())
    } else {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

async fn upload(
    guard: &ConversionGuard,
    control: &TriggerControl,
    worker: &WorkerHandle,
    record: PresentationRecord,
) -> Result<ConvertResponse> {
    guard.converting();
    show(control);
    log::debug!("User confirmed conversion");

    worker
        .send(ConvertRequest::convert(record))
        .await
        .context("Conversion request was not answered")
}

async fn confirm(record: &PresentationRecord) -> Result<bool> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(report::confirmation(record).as_bytes()).await?;
    stderr.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("Failed to read confirmation")?;

    Ok(report::is_affirmative(&answer))
}

fn show(control: &TriggerControl) {
    eprintln!("{}", control.label());
}

fn open_presentation(response: &ConvertResponse) {
    let Some(url) = &response.presentation_url else {
        return;
    };
    if let Err(e) = webbrowser::open(url) {
        log::warn!("Could not open {} in a browser: {}", url, e);
    }
}
