use clap::{Args, Parser, Subcommand};

use tally_core::VERSION;

/// Tally - a local, offline-first ledger of who owes whom
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the tally database file
    #[arg(short, long, global = true, env = "TALLY_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List clients with balances, optionally narrowed by a search term
    List {
        /// Match against client names and entry comments
        #[arg(value_name = "QUERY")]
        query: Option<String>,
    },

    /// Show one client with their full history
    Show {
        /// Client name or id
        #[arg(value_name = "CLIENT")]
        client: String,
    },

    /// Add a client; prompts interactively when no name is given
    Add {
        /// Client name
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },

    /// Record that a client took money (their debt grows)
    Took(MovementArgs),

    /// Record that a client gave money back (their debt shrinks)
    Gave(MovementArgs),

    /// Operations on individual ledger entries
    #[command(subcommand)]
    Entry(EntryCommands),

    /// Archive a client (hides them from every view)
    Archive {
        /// Client name or id
        #[arg(value_name = "CLIENT")]
        client: String,

        /// Bring an archived client back instead
        #[arg(long)]
        restore: bool,
    },

    /// Delete a client together with their whole history
    Rm {
        /// Client name or id
        #[arg(value_name = "CLIENT")]
        client: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Write a portable backup document
    Export {
        /// Output file; stdout when omitted
        #[arg(value_name = "PATH")]
        path: Option<String>,
    },

    /// Restore a backup document, replacing everything in the store
    Import {
        /// Backup file to read
        #[arg(value_name = "PATH")]
        path: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Shared arguments for `took` and `gave`.
#[derive(Args)]
pub struct MovementArgs {
    /// Client name or id
    #[arg(value_name = "CLIENT")]
    pub client: String,

    /// Amount in whole currency units
    #[arg(value_name = "AMOUNT")]
    pub amount: i64,

    /// Calendar date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    pub date: Option<String>,

    /// Free-text annotation
    #[arg(short, long)]
    pub comment: Option<String>,
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Edit an entry interactively, autosaving as fields change
    Edit {
        /// Entry id
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Delete an entry
    Rm {
        /// Entry id
        #[arg(value_name = "ID")]
        id: String,
    },
}
