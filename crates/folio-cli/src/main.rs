use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_cli::{commands, config::Config, logging::init_logging, state::ClientState};
use folio_persist::JsonFileStore;

/// Ask questions about your PDF documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload PDF files
    Upload {
        /// What the documents are about (required for the first upload)
        #[arg(short, long)]
        description: Option<String>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask a question about the uploaded documents
    Ask {
        /// Model to answer with (defaults to chat.model)
        #[arg(short, long)]
        model: Option<String>,

        /// Ask within a server-side session instead of sending the documents
        #[arg(long, env = "FOLIO_SESSION_ID")]
        session: Option<String>,

        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// List stored documents and the session cost
    Documents,

    /// Remove a stored document by id
    Remove {
        id: u64,
    },

    /// Replace the description of the stored documents
    Describe {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Forget documents, history and session cost
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    tracing::debug!(
        "Using {} with state in {}",
        config.server.base_url,
        config.storage.dir.display()
    );

    let store = Arc::new(JsonFileStore::new(&config.storage.dir));
    let mut state = ClientState::open(store).await;

    match args.command {
        Command::Upload { description, files } => {
            commands::upload(&config, &mut state, files, description).await
        }
        Command::Ask { model, session, question } => {
            commands::ask(&config, &mut state, question.join(" "), model, session).await
        }
        Command::Documents => {
            commands::documents(&state);
            Ok(())
        }
        Command::Remove { id } => commands::remove(&mut state, id).await,
        Command::Describe { description } => {
            commands::describe(&mut state, description.join(" ")).await
        }
        Command::Reset => {
            commands::reset(&mut state).await;
            Ok(())
        }
    }
}
