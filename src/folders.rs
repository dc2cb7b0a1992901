use crate::config::FolderConfig;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

const PERIODIC_FOLDER_COUNT: usize = 5;

/// Name normalisation applied by [`create_folders_from_list`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderOptions {
    pub to_lowercase: bool,
    pub remove_spaces: bool,
}

pub fn normalize_name(name: &str, options: FolderOptions) -> String {
    let mut name = name.to_owned();
    if options.to_lowercase {
        name = name.to_lowercase();
    }
    if options.remove_spaces {
        name = name.replace(' ', "");
    }
    name
}

fn create(dir: PathBuf) -> io::Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        info!("Created directory: {}", dir.display());
    }
    Ok(dir)
}

/// One folder per year in `start..=end`
pub fn create_folders_for_range(base: &Path, start: i32, end: i32) -> io::Result<Vec<PathBuf>> {
    (start..=end)
        .map(|year| create(base.join(year.to_string())))
        .collect()
}

pub fn create_folders_from_list<S: AsRef<str>>(
    base: &Path,
    names: &[S],
    options: FolderOptions,
) -> io::Result<Vec<PathBuf>> {
    names
        .iter()
        .map(|name| create(base.join(normalize_name(name.as_ref(), options))))
        .collect()
}

pub fn create_prefixed_folders<S: AsRef<str>>(
    base: &Path,
    names: &[S],
    prefix: &str,
) -> io::Result<Vec<PathBuf>> {
    names
        .iter()
        .map(|name| create(base.join(format!("{}{}", prefix, name.as_ref()))))
        .collect()
}

/// Create `folder-1` through `folder-5`, waiting `delay` after each one.
///
/// A notification on `shutdown` ends the wait early and stops before the next folder.
pub async fn create_folders_periodically(
    base: &Path,
    delay: Duration,
    shutdown: &Notify,
) -> io::Result<Vec<PathBuf>> {
    let mut created = Vec::with_capacity(PERIODIC_FOLDER_COUNT);

    for count in 1..=PERIODIC_FOLDER_COUNT {
        created.push(create(base.join(format!("folder-{}", count)))?);

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.notified() => {
                warn!("Periodic folder creation cancelled after {} folders", count);
                break;
            }
        }
    }

    Ok(created)
}

/// Wait for `signal` and pass it on to `shutdown`.
///
/// A signal that could not be installed is logged and never counts as a shutdown.
pub async fn notify_on_signal<F>(signal: F, shutdown: &Notify)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("received shutdown signal");
            shutdown.notify_one();
        }
        Err(e) => warn!("failed to listen for shutdown signal: {}", e),
    }
}

/// Run every folder creator with the configured names
pub async fn run_folder_demo(
    base: &Path,
    config: &FolderConfig,
    shutdown: Arc<Notify>,
) -> io::Result<Vec<PathBuf>> {
    let mut created = create_folders_for_range(base, config.start_year, config.end_year)?;
    created.extend(create_folders_from_list(
        base,
        &config.names,
        FolderOptions::default(),
    )?);
    created.extend(create_prefixed_folders(
        base,
        &config.prefixed_names,
        &config.prefix,
    )?);
    created.extend(create_folders_periodically(base, config.delay(), &shutdown).await?);
    created.extend(create_folders_from_list(
        base,
        &config.regions,
        FolderOptions {
            to_lowercase: true,
            remove_spaces: true,
        },
    )?);
    Ok(created)
}
