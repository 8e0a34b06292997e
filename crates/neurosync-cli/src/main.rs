//! neurosync - NEURAL_SYNC_X terminal client

mod commands;
mod config;
mod ui;

use clap::Parser;
use std::sync::Arc;

use neurosync_ai::{CompletionClient, DEFAULT_MODEL, GroqClient};
use neurosync_chat::{
    ApiExchange, Controller, HistoryStore, Recognizer, SYSTEM_PROMPT, Speaker, media,
};

/// neurosync - NEURAL_SYNC_X terminal client
#[derive(Parser, Debug)]
#[command(name = "neurosync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Model to use (default: llama-3.3-70b-versatile)
    #[arg(short, long)]
    model: Option<String>,

    /// Disable speech output and voice capture
    #[arg(long)]
    no_voice: bool,

    /// Reset the stored transcript to the boot banner before starting
    #[arg(long)]
    reset: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("neurosync=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file
    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let model = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // A missing credential is not fatal: the client degrades to the
    // unconfigured variant and every exchange surfaces the failure notice
    let client = match cfg.get_api_key() {
        Some(key) => {
            let mut groq = GroqClient::new(key).with_model(model.as_str());
            if let Some(temperature) = cfg.temperature {
                groq = groq.with_temperature(temperature);
            }
            CompletionClient::Ready(groq)
        }
        None => CompletionClient::Unconfigured,
    };

    // Durable transcript slot
    let store = HistoryStore::open_default();
    if args.reset {
        store.reset()?;
    }
    let history = store.load();

    let exchange = Arc::new(ApiExchange::new(client, SYSTEM_PROMPT));
    let mut controller = Controller::with_history(exchange, history);

    // Persist every announced history snapshot
    let persist_task = store.spawn_observer(controller.subscribe());

    // Voice adapters
    let voice_enabled = cfg.voice.enabled && !args.no_voice;
    let speaker = if voice_enabled {
        Speaker::discover()
    } else {
        Speaker::disabled()
    };
    let recognizer = if voice_enabled {
        Recognizer::discover(cfg.voice.recognizer.as_deref())
    } else {
        Recognizer::disabled()
    };

    let result = if let Some(command) = args.command {
        run_command(&mut controller, &command).await
    } else {
        ui::run_tui(&mut controller, &model, speaker, recognizer).await
    };

    // Stop the observer so the final save below is the last slot write
    persist_task.abort();
    let _ = persist_task.await;
    flush_transcript(&store, &controller);
    result
}

/// Final save on the way out; routine saves happen through the observer task
fn flush_transcript(store: &HistoryStore, controller: &Controller) {
    if let Err(e) = store.save(controller.messages()) {
        eprintln!("Warning: failed to persist transcript: {}", e);
    }
}

async fn run_command(controller: &mut Controller, command: &str) -> anyhow::Result<()> {
    println!("neurosync> {}", command);
    println!();

    let before = controller.messages().len();
    controller.submit(command).await;

    for message in &controller.messages()[before..] {
        if !message.is_assistant() {
            continue;
        }
        let text = media::display_text(message.content());
        if !text.is_empty() {
            println!("{}", text);
        }
        if let Some(image) = media::parse(message.content()) {
            println!("[image] {}", image.url);
        }
    }

    Ok(())
}
