use crate::config::AppConfig;
use crate::kinds::{DataKind, FetchTarget, WriteTarget};
use crate::utils::files::{write_csv_file, write_excel_file, write_json_file, write_text_file};
use crate::utils::http::{fetch_bytes, fetch_json, fetch_text, fetch_utf8, FetchError};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Outcome of a sequence of independent fetches
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<DataKind>,
}

impl RunSummary {
    pub fn record(&mut self, kind: DataKind, written: Option<Vec<PathBuf>>) {
        match written {
            Some(paths) => self.written.extend(paths),
            None => self.failed.push(kind),
        }
    }
}

async fn try_fetch_and_write(
    client: &Client,
    target: &FetchTarget,
    write: &WriteTarget,
) -> Result<PathBuf, FetchError> {
    let folder = write.folder.as_path();
    let filename = write.filename.as_str();
    debug!("fetching {} into {}", target.url, write.path().display());

    let path = match target.kind {
        DataKind::Text => {
            let data = fetch_text(client, &target.url).await?;
            write_text_file(folder, filename, &data)?
        }
        DataKind::Csv => {
            let data = fetch_utf8(client, &target.url).await?;
            write_csv_file(folder, filename, &data)?
        }
        DataKind::Excel => {
            let data = fetch_bytes(client, &target.url).await?;
            write_excel_file(folder, filename, &data)?
        }
        DataKind::Json => {
            let data = fetch_json(client, &target.url).await?;
            write_json_file(folder, filename, &data)?
        }
    };
    Ok(path)
}

/// Fetch `target` and persist it to `write`.
///
/// Failures are logged and swallowed: nothing is written and `None` is returned, so
/// sibling fetches carry on. A file left by an earlier run stays as it was.
pub async fn fetch_and_write(
    client: &Client,
    target: &FetchTarget,
    write: &WriteTarget,
) -> Option<PathBuf> {
    match try_fetch_and_write(client, target, write).await {
        Ok(path) => Some(path),
        Err(FetchError::Status(status))
            if matches!(target.kind, DataKind::Text | DataKind::Excel) =>
        {
            warn!("Failed to fetch {} data: {}", target.kind, status);
            None
        }
        Err(e) => {
            error!("Error fetching {} data: {}", target.kind, e);
            None
        }
    }
}

pub fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Fetch the configured `kinds` in order, writing under `base`
pub async fn run_fetch_all(
    client: &Client,
    config: &AppConfig,
    base: &Path,
    kinds: &[DataKind],
) -> RunSummary {
    let mut summary = RunSummary::default();
    let pb = progress_bar(kinds.len());

    for &kind in kinds {
        pb.set_message(format!("fetching {}", kind));
        let entry = config.fetch.get(kind);
        let written = fetch_and_write(
            client,
            &entry.target(kind),
            &entry.write_target().under(base),
        )
        .await;
        summary.record(kind, written.map(|p| vec![p]));
        pb.inc(1);
    }

    pb.finish_with_message("fetch complete");
    summary
}
