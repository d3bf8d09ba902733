//! commentctl - bulk comment management for WordPress-style comment tables.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commentctl::commands::{self, purge::PurgeOptions};
use commentctl::config::Config;
use commentctl::logging;
use commentctl::store::StatusSelector;
use commentctl::ui;

#[derive(Parser)]
#[command(name = "commentctl")]
#[command(about = "Inspect, back up and bulk-delete blog comments", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.commentctl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the admin HTTP server
    Serve {
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show comment counts by post type and status
    Stats,
    /// Delete every comment with a status (approved, pending, spam, trash, all)
    Purge {
        /// Status to delete
        status: StatusSelector,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        /// Delete without taking a backup first (not recommended)
        #[arg(long)]
        skip_backup: bool,
    },
    /// Create a backup archive of all comments
    Backup,
    /// Copy a backup archive out of the backup directory and delete it
    Download {
        /// Archive file name
        file: String,
        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove backup archives older than backup.retention_hours
    Sweep,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        ui::print_error_box("Error", Some(&format!("{e:#}")));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init_tracing(&config.logging);

    let app = commands::open_app(&config).await?;

    match cli.command {
        Commands::Serve { port } => commands::serve::execute(app, &config, port).await?,
        Commands::Stats => commands::stats::execute(&app).await?,
        Commands::Purge {
            status,
            yes,
            skip_backup,
        } => {
            commands::purge::execute(
                &app,
                PurgeOptions {
                    selector: status,
                    assume_yes: yes,
                    skip_backup,
                },
            )
            .await?;
        },
        Commands::Backup => {
            commands::backup::execute(&app).await?;
        },
        Commands::Download { file, output } => {
            commands::download::execute(&app, &file, output.as_deref()).await?;
        },
        Commands::Sweep => {
            commands::sweep::execute(&app, &config)?;
        },
    }
    Ok(())
}
