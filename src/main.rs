//! Worldsmith - Two-Role World-Building Agent
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use worldsmith::agent::{build_router, seed_messages, InputSource, ScriptedInput};
use worldsmith::cli::{StdinInput, Transcript};
use worldsmith::core::telemetry;
use worldsmith::llm::OpenAICompatClient;
use worldsmith::tools::ToolRegistry;
use worldsmith::Config;

const DEFAULT_PREMISE: &str = "Wheel of Time, pre-Breaking of the World era.";

/// Worldsmith - Two-Role World-Building Agent
#[derive(Parser, Debug)]
#[command(name = "worldsmith")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Setting or premise handed to the generator
    #[arg(long, short = 'p', default_value = DEFAULT_PREMISE)]
    premise: String,

    /// Model identifier
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long)]
    api_key: Option<String>,

    /// Sampling temperature
    #[arg(long, short = 't')]
    temperature: Option<f32>,

    /// Maximum node steps per run
    #[arg(long)]
    max_steps: Option<usize>,

    /// Librarian question (repeatable); skips reading stdin
    #[arg(long, short = 'q')]
    question: Vec<String>,

    /// Keep questioning the librarian until /finish
    #[arg(long)]
    follow_up: bool,

    /// Config file to load instead of the default location
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Print the default config file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::default_config_toml());
        return Ok(());
    }

    // Build configuration
    let mut config = Config::load_from(args.config.as_deref())?;

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.model.name = model.clone();
    }

    if let Some(ref base_url) = args.base_url {
        config.endpoint.base_url = base_url.clone();
    }

    if let Some(ref api_key) = args.api_key {
        config.endpoint.api_key = api_key.clone();
    }

    if let Some(temperature) = args.temperature {
        config.model.temperature = temperature;
    }

    if let Some(max_steps) = args.max_steps {
        config.router.max_steps = max_steps;
    }

    if args.follow_up {
        config.router.follow_up = true;
    }

    if args.debug {
        config.logging.level = "debug".to_string();
    }

    telemetry::init_telemetry(&config.logging.level);
    config.validate()?;
    debug!(model = %config.model.name, url = %config.chat_completions_url(), "configured");

    let model = Arc::new(OpenAICompatClient::from_config(&config)?);
    let tools = Arc::new(ToolRegistry::with_defaults()?);
    let router = build_router(&config, model, tools)?;

    let scripted = !args.question.is_empty();
    let input: Box<dyn InputSource> = if scripted {
        Box::new(ScriptedInput::new(args.question))
    } else {
        Box::new(StdinInput)
    };
    let transcript = Transcript::new(scripted);

    println!("\n🚀 Running agents...\n");
    let report = router
        .run_with(seed_messages(&config, &args.premise), input.as_ref(), &transcript)
        .await?;

    println!("{}", transcript.summary(&report));
    Ok(())
}
