//! Tally CLI - a local, offline-first ledger of who owes whom.
//!
//! This is the command-line collaborator over `tally-core`: it wires user
//! actions to the core's operations and renders the results.

mod cli;
mod commands;
mod config;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tally_core::SqliteStore;

use cli::{Cli, Commands, EntryCommands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store_path = config::resolve_store_path(cli.store.as_deref())?;
    tracing::debug!(store = %store_path.display(), "resolved store path");
    let store = Arc::new(SqliteStore::open(store_path));

    match &cli.command {
        Commands::List { query } => commands::list::handle_list(&store, query.as_deref()).await,
        Commands::Show { client } => commands::list::handle_show(&store, client).await,
        Commands::Add { name } => commands::clients::handle_add(&store, name.as_deref()).await,
        Commands::Took(args) => commands::entries::handle_movement(&store, args, true),
        Commands::Gave(args) => commands::entries::handle_movement(&store, args, false),
        Commands::Entry(command) => match command {
            EntryCommands::Edit { id } => commands::entries::handle_edit(&store, id).await,
            EntryCommands::Rm { id } => commands::entries::handle_rm(&store, id),
        },
        Commands::Archive { client, restore } => {
            commands::clients::handle_archive(&store, client, *restore)
        }
        Commands::Rm { client, yes } => commands::clients::handle_rm(&store, client, *yes),
        Commands::Export { path } => commands::transfer::handle_export(&store, path.as_deref()),
        Commands::Import { path, yes } => commands::transfer::handle_import(&store, path, *yes),
    }
}
