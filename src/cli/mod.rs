//! CLI command definitions for todo-list
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Args, Parser, Subcommand};

use crate::types::{Filter, TodoId};

/// In-memory todo list server and terminal client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Interface to listen on (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory to serve static assets from (overrides config)
    #[arg(long)]
    pub static_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the server (default if no subcommand given)
    Serve,

    /// Talk to a running server from the terminal
    Client(ClientArgs),
}

/// Arguments for the `client` subcommand.
#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Server URL (overrides config)
    #[arg(long)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub action: ClientAction,
}

/// Client actions. Each one loads the list first and prints it afterwards.
#[derive(Subcommand, Debug)]
pub enum ClientAction {
    /// Show the list
    List {
        /// Which todos to show
        #[arg(short, long, default_value = "all", value_parser = parse_filter)]
        filter: Filter,
    },

    /// Add a todo
    Add {
        /// Todo text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip a todo between active and completed
    Toggle { id: TodoId },

    /// Change a todo's text; prompts when no text is given
    Edit {
        id: TodoId,
        /// New text
        text: Vec<String>,
    },

    /// Delete a todo
    Delete {
        id: TodoId,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_filter(s: &str) -> Result<Filter, String> {
    s.parse()
}
