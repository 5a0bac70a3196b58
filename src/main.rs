use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use vista_gateway::booking::{self, BookingStore};
use vista_gateway::providers;
use vista_gateway::{Config, Session, SessionEvent, SessionOutput, SessionParams};

/// Vista - voice concierge gateway for hotel booking assistants
#[derive(Parser)]
#[command(name = "vista", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "VISTA_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory override (booking database)
    #[arg(long, env = "VISTA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed the room inventory
    Seed,
    /// Run an interactive text session against the configured LLM
    Console,
    /// Print the resolved configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,vista_gateway=info",
        1 => "info,vista_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command {
        Command::Seed => seed(&config),
        Command::Console => console(config).await,
        Command::ShowConfig => {
            println!("{config:#?}");
            Ok(())
        }
    }
}

/// Open the booking store, creating the data directory if needed
fn open_store(config: &Config) -> anyhow::Result<BookingStore> {
    std::fs::create_dir_all(&config.data_dir)?;
    let pool = booking::init(config.data_dir.join("vista.db"))?;
    Ok(BookingStore::new(pool))
}

fn seed(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let inserted = store.seed_rooms()?;
    if inserted == 0 {
        println!("room inventory already seeded");
    } else {
        println!("seeded {inserted} rooms");
    }
    Ok(())
}

/// Interactive text console: each line is one user turn
async fn console(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config)?;
    store.seed_rooms()?;

    let generator = providers::make_generator(&config.llm)?;

    // Speech synthesis is optional on the text console
    let synthesizer = if config.tts.api_key.is_empty() {
        None
    } else {
        Some(providers::make_synthesizer(&config.tts)?)
    };

    let params = SessionParams {
        wake_phrases: config.wake_phrases.clone(),
        turn: config.turn_config(),
        idle: config.idle_config(),
        summarizer: config.summarizer_config(),
        ..SessionParams::default()
    };

    let (event_tx, event_rx) = mpsc::channel(32);
    let (output_tx, mut output_rx) = mpsc::channel(32);

    let session = Session::new(params, generator, None, synthesizer, store, output_tx)?;
    let handle = tokio::spawn(session.run(event_rx));

    event_tx.send(SessionEvent::Connected).await?;

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            output = output_rx.recv() => match output {
                Some(SessionOutput::Reply(text)) => println!("samora: {text}"),
                Some(SessionOutput::Speech(_)) => {}
                Some(SessionOutput::Ended) | None => break,
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) if !line.trim().is_empty() => {
                    // The session may have ended itself (end_call); just drain
                    if event_tx.send(SessionEvent::Transcript(line)).await.is_err() {
                        break;
                    }
                }
                Some(_) => {}
                None => {
                    stdin_open = false;
                    let _ = event_tx.send(SessionEvent::Disconnected).await;
                }
            },
        }
    }

    handle.await??;
    Ok(())
}
