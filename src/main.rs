use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use calltriage::io::generate_call_id;
use calltriage::{
    format_summary, read_call_envelope, CallSnapshot, ConversationTracker, TriageConfig, GREETING,
    REMINDER_LINE,
};

#[derive(Parser)]
#[command(name = "calltriage")]
#[command(author, version, about = "Emergency call triage pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and analyze a complete call transcript
    Process {
        /// Input file (plain transcript or JSON call envelope)
        #[arg(short, long)]
        input: PathBuf,

        /// Call identifier (generated when absent)
        #[arg(long)]
        call_id: Option<String>,

        /// Write a JSON dashboard snapshot to this file
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run a live conversation, one caller utterance per stdin line
    Converse {
        /// Call identifier (generated when absent)
        #[arg(long)]
        call_id: Option<String>,

        /// Rewrite a JSON dashboard snapshot to this file after every turn
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            call_id,
            snapshot,
            verbose,
        } => {
            setup_logging(verbose);
            process_call_file(&input, call_id, snapshot.as_deref()).await
        }
        Commands::Converse {
            call_id,
            snapshot,
            verbose,
        } => {
            setup_logging(verbose);
            converse(call_id, snapshot.as_deref()).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn process_call_file(
    input: &Path,
    call_id: Option<String>,
    snapshot: Option<&Path>,
) -> Result<()> {
    info!("Loading call from {:?}", input);
    let envelope = read_call_envelope(input, call_id).context("Failed to load call input")?;

    let config = TriageConfig::from_env()?;
    let pipeline = config.build_pipeline();

    let result = pipeline.process_envelope(&envelope).await;
    if result.is_error() {
        warn!("Call {} finished with {} stage fault(s)", result.call_id, result.errors.len());
    }

    if let Some(path) = snapshot {
        let latest = envelope.transcript.lines().rev().find(|l| !l.trim().is_empty());
        CallSnapshot::new(&result, &envelope.transcript, latest).write_json(path)?;
        info!("Snapshot written to {:?}", path);
    }

    println!("{}", format_summary(&result));
    Ok(())
}

async fn converse(call_id: Option<String>, snapshot: Option<&Path>) -> Result<()> {
    let config = TriageConfig::from_env()?;
    let pipeline = config.build_pipeline();
    let tracker = ConversationTracker::new(config.loop_detection.clone());

    let call_id = call_id.unwrap_or_else(generate_call_id);
    tracker.start_call(&call_id).await;
    info!("Call {} connected", call_id);
    println!("Dispatcher: {}", GREETING);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let utterance = line.trim();
        if utterance.is_empty() {
            println!("Dispatcher: {}", REMINDER_LINE);
            continue;
        }

        let outcome = tracker.handle_turn(&pipeline, &call_id, utterance).await;
        println!("Dispatcher: {}", outcome.reply);
        if outcome.result.is_error() {
            warn!("Turn faulted: {}", outcome.result.errors.join("; "));
        }

        if let Some(path) = snapshot {
            CallSnapshot::new(&outcome.result, &outcome.transcript, Some(utterance))
                .write_json(path)?;
        }
    }

    if let Some(state) = tracker.end_call(&call_id).await {
        info!("Call {} disconnected after {} turns", call_id, state.turns());
    }
    Ok(())
}
