//! Guestbook client CLI.
//!
//! ```text
//!   guestbook entries            connect and list entries
//!   guestbook sign -n .. -m ..   connect and sign
//!   guestbook interactive        form-style session on stdin
//! ```
//!
//! The signing key is read from the environment variable named by
//! `wallet.private_key_env` (default `GUESTBOOK_PRIVATE_KEY`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Instrument;

use guestbook_client::client::{ChainClient, ClientEvent, SubmitOutcome};
use guestbook_client::lifecycle::{self, Overrides, Shutdown};
use guestbook_client::observability::logging;
use guestbook_client::view::{Field, GuestbookView};

#[derive(Parser)]
#[command(name = "guestbook")]
#[command(about = "Read and sign the on-chain guestbook", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the JSON-RPC endpoint.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override the required chain ID.
    #[arg(long)]
    chain_id: Option<u64>,

    /// Override the guestbook contract address.
    #[arg(long)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List guestbook entries
    Entries {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign the guestbook
    Sign {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        message: String,
    },
    /// Interactive form session
    Interactive,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        rpc_url: cli.rpc_url.clone(),
        chain_id: cli.chain_id,
        contract: cli.contract.clone(),
    };
    let config = lifecycle::resolve_config(cli.config.as_deref(), &overrides)?;
    logging::init_logging(&config.observability.log_level);

    let app = lifecycle::build(config)?;
    let span = app.session.span();
    let extended = app.config.form.extended;
    let client = app.client;

    async move {
        match cli.command {
            Commands::Entries { json } => list_entries(&client, json).await,
            Commands::Sign { name, message } => sign(&client, extended, &name, &message).await,
            Commands::Interactive => interactive(client, extended).await,
        }
    }
    .instrument(span)
    .await
}

async fn list_entries(client: &ChainClient, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    client.connect().await?;
    let entries = client.snapshot().entries;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        let view = GuestbookView::new(false);
        print!("{}", view.render(&client.snapshot()));
    }
    Ok(())
}

async fn sign(
    client: &ChainClient,
    extended: bool,
    name: &str,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    client.connect().await?;

    let mut events = client.events();
    let progress = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let ClientEvent::Submission(state) = event {
                eprintln!("[{}]", state.name());
            }
        }
    });

    let mut view = GuestbookView::new(extended);
    let snapshot = client.snapshot();
    view.set_field(&snapshot, Field::Name, name);
    view.set_field(&snapshot, Field::Message, message);
    let result = view.submit(client).await;
    progress.abort();

    match result? {
        SubmitOutcome::Confirmed { tx, block_number } => {
            println!("Signed in block {} (tx {})", block_number, tx);
        }
        SubmitOutcome::Ignored => println!("A submission is already in progress"),
    }
    Ok(())
}

const HELP: &str = "commands: name|message|email|country|signature <text>, submit, clear, refresh, reconnect, show, help, quit";

async fn interactive(
    client: Arc<ChainClient>,
    extended: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();
    let mut stop = shutdown.subscribe();

    // Progress lines for transitions that happen while a command is running.
    let mut events = client.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ClientEvent::Connection(state) => eprintln!("[connection: {}]", state.name()),
                ClientEvent::Submission(state) => eprintln!("[submission: {}]", state.name()),
                ClientEvent::EntriesLoaded(count) => eprintln!("[{} entries]", count),
                ClientEvent::Error(_) => {}
            }
        }
    });

    let mut view = GuestbookView::new(extended);
    // Errors land in the snapshot and are rendered below.
    let _ = client.connect().await;
    print!("{}", view.render(&client.snapshot()));
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = stop.recv() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "show" => {}
            "submit" => {
                // Ctrl-c drops the confirmation wait; a broadcast transaction still lands.
                if shutdown.run_until(view.submit(&client)).await.is_none() {
                    break;
                }
            }
            "clear" => view.clear(),
            "refresh" => {
                let _ = client.refresh_entries().await;
            }
            "reconnect" => {
                let _ = client.reconnect().await;
            }
            other => match other.parse::<Field>() {
                Ok(field) => {
                    if !view.set_field(&client.snapshot(), field, rest.trim()) {
                        println!("Inputs are locked while signing");
                    }
                }
                Err(e) => {
                    println!("{}; {}", e, HELP);
                    continue;
                }
            },
        }
        print!("{}", view.render(&client.snapshot()));
    }

    Ok(())
}
