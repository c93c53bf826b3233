//! Todo List Server
//!
//! Serves an in-memory todo list over a JSON REST API and an htmx web page,
//! and doubles as a terminal client for a running server.

use anyhow::Result;
use clap::Parser;
use std::io::{StdinLock, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use todo_list::cli::{Cli, ClientAction, ClientArgs, Command};
use todo_list::client::{
    ActionOutcome, Confirmation, Dialogs, FixedDialogs, HttpApi, TerminalDialogs, TodoApp,
};
use todo_list::config::{ClientConfig, Config, ConfigLoader, ConfigPaths, ServerConfig};
use todo_list::logging::{self, LogTarget};
use todo_list::store::MemoryStore;
use todo_list::view::{DELETE_CONFIRMATION, EDIT_PROMPT, NotificationKind};
use todo_list::web;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), logging::level_for(cli.verbose))?;

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit(config_path);
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    for source in loader.sources() {
        debug!("Config loaded from {}", source.display());
    }

    // CLI flags take precedence over every config tier
    let config = loader.config_mut();
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(static_dir) = &cli.static_dir {
        config.server.static_dir = PathBuf::from(static_dir);
    }
    let config: Config = loader.into_config();

    match cli.command {
        None | Some(Command::Serve) => run_server(config.server).await,
        Some(Command::Client(args)) => run_client(config.client, args).await,
    }
}

/// Run the HTTP server until Ctrl-C.
async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting todo-list v{}", env!("CARGO_PKG_VERSION"));
    info!("Static dir: {:?}", config.static_dir);

    let store = Arc::new(MemoryStore::seeded());
    let handle = web::start_server(store, &config).await?;

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");
    handle.shutdown().await;
    Ok(())
}

/// Run one client action against a running server and print the result.
async fn run_client(mut config: ClientConfig, args: ClientArgs) -> Result<()> {
    if let Some(url) = args.url {
        config.base_url = url;
    }
    let api = HttpApi::new(config.base_url.clone());
    let mut app = TodoApp::with_notification_ttl(api, config.notification_ttl());

    if app.load().await == ActionOutcome::Failed {
        report(&app);
        anyhow::bail!("could not reach {}", config.base_url);
    }

    let outcome = match args.action {
        ClientAction::List { filter } => {
            app.set_filter(filter);
            ActionOutcome::Applied
        }
        ClientAction::Add { text } => app.add(&text.join(" ")).await,
        ClientAction::Toggle { id } => app.toggle(id).await,
        ClientAction::Edit { id, text } if text.is_empty() => {
            let current = app.todos().iter().find(|t| t.id == id).map(|t| t.text.clone());
            let answer = match current {
                Some(current) => ask_terminal(move |d| d.prompt(EDIT_PROMPT, &current)).await?,
                None => None,
            };
            app.edit(id, &mut FixedDialogs::new(Confirmation::Declined, answer))
                .await
        }
        ClientAction::Edit { id, text } => {
            app.edit(id, &mut FixedDialogs::answering(text.join(" ")))
                .await
        }
        ClientAction::Delete { id, yes: true } => {
            app.delete(id, &mut FixedDialogs::confirming()).await
        }
        ClientAction::Delete { id, yes: false } => {
            let confirmation = if app.todos().iter().any(|t| t.id == id) {
                ask_terminal(|d| d.confirm(DELETE_CONFIRMATION)).await?
            } else {
                Confirmation::Declined
            };
            app.delete(id, &mut FixedDialogs::new(confirmation, None))
                .await
        }
    };

    print!("{}", app.render().to_text());
    report(&app);

    if outcome == ActionOutcome::Failed {
        anyhow::bail!("request to {} failed", config.base_url);
    }
    Ok(())
}

/// Run a terminal dialog on the blocking pool.
async fn ask_terminal<T, F>(ask: F) -> Result<T>
where
    F: FnOnce(&mut TerminalDialogs<StdinLock<'static>, Stdout>) -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || ask(&mut TerminalDialogs::stdio())).await?)
}

/// Print the current notification, errors to stderr.
fn report<A>(app: &TodoApp<A>)
where
    A: todo_list::client::TodoApi,
{
    if let Some(n) = app.notification() {
        match n.kind {
            NotificationKind::Error | NotificationKind::Warning => {
                eprintln!("{}: {}", n.kind.as_str(), n.message)
            }
            _ => println!("{}", n.message),
        }
    }
}
