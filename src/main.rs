use anyhow::Context;
use clap::{Parser, Subcommand};
use kinds::DataKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod fetch;
mod folders;
mod kinds;
mod logging;
mod process;
mod utils;

/// Fetch text, CSV, Excel and JSON data to disk and set up project folders
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML file overriding the built-in URLs, folders and names
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory under which all folders and files are created
    #[arg(short, long, default_value = ".")]
    base: PathBuf,

    /// Runs fetch, process and folders in turn when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch each data kind and write it to its folder
    Fetch {
        /// Kinds to fetch (all when omitted)
        #[arg(value_enum)]
        kinds: Vec<DataKind>,
    },
    /// Fetch each data kind, keep the raw input and write a processed output
    Process {
        /// Kinds to process (all when omitted)
        #[arg(value_enum)]
        kinds: Vec<DataKind>,
    },
    /// Create year, list, prefixed and periodic folders
    Folders {
        /// Seconds to wait between periodic folders (overrides config)
        #[arg(long)]
        delay_secs: Option<u64>,
    },
}

fn report(label: &str, summary: &fetch::RunSummary) {
    println!("\n{} written files:", label);
    for path in &summary.written {
        println!("  - {}", path.display());
    }
    if !summary.failed.is_empty() {
        let failed: Vec<String> = summary.failed.iter().map(|k| k.to_string()).collect();
        println!("Skipped after errors: {}", failed.join(", "));
    }
}

/// Ctrl-C is only intercepted while folders are being created; elsewhere it ends the process.
async fn run_folders(base: &Path, config: &config::FolderConfig) -> anyhow::Result<()> {
    let shutdown = Arc::new(Notify::new());
    let shutdown_signal = shutdown.clone();
    let listener = tokio::spawn(async move {
        folders::notify_on_signal(tokio::signal::ctrl_c(), &shutdown_signal).await;
    });

    let result = folders::run_folder_demo(base, config, shutdown).await;
    listener.abort();

    let created = result.context("failed to create folders")?;
    println!("\nFolders ready: {}", created.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging()?;

    let mut config = config::load_config(args.config.as_deref()).context("failed to load config")?;
    println!("Name:  {}", config.byline);

    let client = utils::http::build_client().context("failed to build HTTP client")?;
    let base = args.base.as_path();

    match args.command {
        Some(Commands::Fetch { kinds }) => {
            let kinds = DataKind::select(&kinds);
            report("Fetch", &fetch::run_fetch_all(&client, &config, base, &kinds).await);
        }
        Some(Commands::Process { kinds }) => {
            let kinds = DataKind::select(&kinds);
            report(
                "Process",
                &process::run_process_all(&client, &config, base, &kinds).await,
            );
        }
        Some(Commands::Folders { delay_secs }) => {
            if let Some(secs) = delay_secs {
                config.folders.delay_secs = secs;
            }
            run_folders(base, &config.folders).await?;
        }
        None => {
            let kinds = DataKind::RUN_ORDER;
            report("Fetch", &fetch::run_fetch_all(&client, &config, base, &kinds).await);
            report(
                "Process",
                &process::run_process_all(&client, &config, base, &kinds).await,
            );
            run_folders(base, &config.folders).await?;
        }
    }

    Ok(())
}
