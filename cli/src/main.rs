//! CLI entrypoint for sermonsmith
//!
//! Wires all layers together with constructor injection: one shared
//! reqwest client, the two provider adapters, the tokio clock, and the
//! configuration resolved once at startup.

use anyhow::{Context, Result, bail};
use clap::Parser;
use sermonsmith_application::{GenerateUseCase, GenerationOutput};
use sermonsmith_domain::{
    ChatMessage, GenerationRequest, RoutePreference, StructuredDocument, Subject,
};
use sermonsmith_infrastructure::{
    AssistantsApiProvider, ChatCompletionsProvider, ConfigLoader, TokioClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sermonsmith", about = "Generate a structured sermon for a passage or topic")]
struct Cli {
    /// The passage or topic to preach on (e.g. "John 3:16")
    subject: String,

    /// Title to use instead of an extracted one
    #[arg(long)]
    title: Option<String>,

    /// Extra framing for this request (narrows assistant behavior per call)
    #[arg(long)]
    instructions: Option<String>,

    /// Return the model's answer verbatim instead of a structured document
    #[arg(long)]
    freeform: bool,

    /// Force the conversational-assistant path
    #[arg(long, conflicts_with = "force_secondary")]
    force_primary: bool,

    /// Force the single-shot completion path
    #[arg(long)]
    force_secondary: bool,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let file_config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to load configuration")?;
    let api_key = match file_config.api_key() {
        Some(key) => key,
        None => bail!("no API key configured: set provider.api_key or OPENAI_API_KEY"),
    };
    let config = file_config.resolve().context("invalid configuration")?;

    let Some(subject) = Subject::try_new(cli.subject.clone()) else {
        bail!("subject must be non-empty");
    };

    // === Dependency Injection ===
    let client = reqwest::Client::new();
    let base_url = file_config.provider.base_url.clone();
    let assistant = Arc::new(match &base_url {
        Some(url) => AssistantsApiProvider::with_base_url(client.clone(), &api_key, url),
        None => AssistantsApiProvider::new(client.clone(), &api_key),
    });
    let completion = Arc::new(match &base_url {
        Some(url) => ChatCompletionsProvider::with_base_url(client.clone(), &api_key, url),
        None => ChatCompletionsProvider::new(client.clone(), &api_key),
    });
    let use_case = GenerateUseCase::new(assistant, completion, Arc::new(TokioClock), config);

    // A disconnected caller (ctrl-c) stops the poll loop promptly.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let prompt = format!(
        "Write a sermon on {subject} with an introduction, three titled \
         points, and a conclusion. Use markdown headings for each section."
    );
    let mut request = if cli.freeform {
        GenerationRequest::chat(vec![ChatMessage::user(prompt)])
    } else {
        GenerationRequest::sermon(subject.clone(), prompt)
    };
    if let Some(title) = &cli.title {
        request = request.with_title(title);
    }
    if let Some(instructions) = &cli.instructions {
        request = request.with_instructions(instructions);
    }
    request = request.with_route(RoutePreference {
        force_primary: cli.force_primary,
        force_secondary: cli.force_secondary,
    });

    info!(%subject, "starting generation");
    let outcome = use_case.execute(request, &cancel).await?;

    if outcome.used_secondary {
        info!("answer served by the single-shot provider");
    }
    match outcome.output {
        GenerationOutput::Text(text) => println!("{text}"),
        GenerationOutput::Document(document) => print_document(&document),
    }

    Ok(())
}

fn print_document(document: &StructuredDocument) {
    println!("# {}", document.title);
    println!();
    println!("{}", document.introduction);
    for (index, point) in document.points.iter().enumerate() {
        println!();
        println!("## {}. {}", index + 1, point.title);
        println!("{}", point.content);
    }
    println!();
    println!("## Conclusion");
    println!("{}", document.conclusion);
    println!();
    println!("References: {}", document.references.join("; "));
}
