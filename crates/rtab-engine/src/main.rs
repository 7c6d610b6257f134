//! RTAB - record-store table fetcher

use anyhow::Result;
use clap::Parser;
use rtab_common::logging::{init_logging, LogConfig, LogLevel};
use rtab_engine::config::DEFAULT_ENVIRONMENT;
use rtab_engine::DataManager;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "rtab")]
#[command(author, version, about = "RTAB record-store table fetcher")]
struct Cli {
    /// Settings file
    #[arg(short, long, env = "RTAB_CONFIG", default_value = "rtab.json")]
    config: PathBuf,

    /// Environment to load from the settings file
    #[arg(short, long, env = "RTAB_ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
    environment: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run a fetch cycle and list the published tables
    Fetch,

    /// Run a fetch cycle and print one table as JSON lines
    Show {
        /// Published table name
        table: String,

        /// Print at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Environment overrides first; the verbose flag takes precedence
    let mut log_config = LogConfig::from_env()?;
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    let mut manager = DataManager::from_file(&cli.config, &cli.environment)?;
    manager.fetch_cycle().await?;

    match cli.command {
        Command::Fetch => {
            for summary in manager.summary()? {
                if summary.near_offset_cap {
                    warn!(
                        table = %summary.name,
                        rows = summary.rows,
                        "Published (nearing the remote offset cap)"
                    );
                } else {
                    info!(table = %summary.name, rows = summary.rows, "Published");
                }
            }
        },
        Command::Show { table, limit } => {
            match manager.table(&table)? {
                Some(found) => {
                    let rows = found.rows();
                    for row in rows.iter().take(limit.unwrap_or(rows.len())) {
                        println!("{}", serde_json::to_string(row)?);
                    }
                },
                None => {
                    anyhow::bail!(
                        "table '{}' not found; available tables: {}",
                        table,
                        manager.table_names()?.join(", ")
                    );
                },
            }
        },
    }

    info!("Done");
    Ok(())
}
