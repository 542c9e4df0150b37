//! spa-router command line.
//!
//! Loads a route table from TOML and inspects it: validation, resolution,
//! the navigation menu, and a scripted walk through navigation history.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use spa_router::history::HistoryAdapter;
use spa_router::lifecycle::{start, Shutdown, Startup};
use spa_router::routing::menu::menu_items;
use spa_router::routing::{NavigationNotice, RouterInstance};

#[derive(Parser)]
#[command(name = "spa-router")]
#[command(about = "Inspect and exercise a single-page application route table", long_about = None)]
struct Cli {
    /// Route table configuration file.
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and build the route table
    Check,
    /// Resolve a path, following redirects
    Resolve { path: String },
    /// Print the navigation menu
    Menu {
        /// Path to treat as the active route
        #[arg(long)]
        active: Option<String>,
    },
    /// Load the first path, push the rest, and print every navigation notice
    Navigate {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Startup { config, table } = start(&cli.config)?;

    match cli.command {
        Commands::Check => {
            println!("{}: {} routes OK", cli.config.display(), table.len());
        }
        Commands::Resolve { path } => {
            let output = match table.trace(&path) {
                Ok(resolution) => serde_json::to_value(&resolution)?,
                Err(e) => json!({ "error": e.kind(), "message": e.to_string() }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Menu { active } => {
            let active = match active {
                Some(path) => Some(table.resolve(&path)?),
                None => None,
            };
            let menu = menu_items(&table, active.as_ref());
            println!("{}", serde_json::to_string_pretty(&menu)?);
        }
        Commands::Navigate { paths } => {
            let router = Arc::new(RouterInstance::new(Arc::new(table)));
            let (mut history, events) = HistoryAdapter::new(&config.history);
            let shutdown = Shutdown::new();

            let _printer = router.subscribe(|notice| {
                println!("{}", notice_json(notice));
            });

            let runner = router.clone();
            let stop = shutdown.subscribe();
            let task = tokio::spawn(async move {
                runner.run(events, stop).await;
            });

            let mut paths = paths.into_iter();
            if let Some(first) = paths.next() {
                history.load(first);
            }
            for path in paths {
                history.push(path);
            }
            // Closing the channel lets the router drain and stop.
            drop(history);
            task.await?;

            let menu = router.menu();
            println!("{}", serde_json::to_string_pretty(&json!({
                "active": router.active_route().map(|r| r.path.clone()),
                "menu": menu,
            }))?);
        }
    }

    Ok(())
}

fn notice_json(notice: &NavigationNotice) -> Value {
    match &notice.result {
        Ok(route) => json!({
            "requested": notice.requested,
            "trigger": notice.trigger,
            "redirects": notice.redirects,
            "route": route.as_ref(),
        }),
        Err(e) => json!({
            "requested": notice.requested,
            "trigger": notice.trigger,
            "error": e.kind(),
            "message": e.to_string(),
        }),
    }
}
