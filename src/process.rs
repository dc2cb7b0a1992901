//! Fetch a payload, keep the raw copy as an input file and derive an output file from it.
//!
//! Text, CSV and JSON pass through unchanged. Excel workbooks are flattened to CSV from their
//! first sheet; further sheets are ignored and the first row is treated as the header.

use crate::config::{AppConfig, ProcessEntry};
use crate::fetch::{progress_bar, RunSummary};
use crate::kinds::DataKind;
use crate::utils::files::{write_csv_file, write_excel_file, write_json_bytes, write_text_file};
use crate::utils::http::{fetch_bytes, fetch_text, fetch_utf8, FetchError};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::Timelike;
use reqwest::Client;
use serde::Deserialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Record terminator used for generated CSV
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Newline {
    #[default]
    Lf,
    CrLf,
}

impl Newline {
    fn terminator(self) -> csv::Terminator {
        match self {
            Newline::Lf => csv::Terminator::Any(b'\n'),
            Newline::CrLf => csv::Terminator::CRLF,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub input: PathBuf,
    pub output: PathBuf,
}

pub async fn process_text_file(
    client: &Client,
    url: &str,
    folder: &Path,
    input_filename: &str,
    output_filename: &str,
) -> Result<ProcessOutput, FetchError> {
    let data = fetch_text(client, url).await?;
    Ok(ProcessOutput {
        input: write_text_file(folder, input_filename, &data)?,
        output: write_text_file(folder, output_filename, &data)?,
    })
}

pub async fn process_csv_file(
    client: &Client,
    url: &str,
    folder: &Path,
    input_filename: &str,
    output_filename: &str,
) -> Result<ProcessOutput, FetchError> {
    let data = fetch_utf8(client, url).await?;
    Ok(ProcessOutput {
        input: write_csv_file(folder, input_filename, &data)?,
        output: write_csv_file(folder, output_filename, &data)?,
    })
}

pub async fn process_json_file(
    client: &Client,
    url: &str,
    folder: &Path,
    input_filename: &str,
    output_filename: &str,
) -> Result<ProcessOutput, FetchError> {
    let data = fetch_bytes(client, url).await?;
    Ok(ProcessOutput {
        input: write_json_bytes(folder, input_filename, &data)?,
        output: write_json_bytes(folder, output_filename, &data)?,
    })
}

/// Fetch a workbook, store it raw, and write its first sheet as `<output stem>.csv`.
///
/// The raw input is written before conversion, so an unreadable workbook still leaves
/// the input file behind.
pub async fn process_excel_file(
    client: &Client,
    url: &str,
    folder: &Path,
    input_filename: &str,
    output_filename: &str,
    newline: Newline,
) -> Result<ProcessOutput, FetchError> {
    let data = fetch_bytes(client, url).await?;
    let input = write_excel_file(folder, input_filename, &data)?;
    let csv = excel_to_csv(&data, newline)?;
    let output = write_csv_file(folder, &csv_output_name(output_filename), &csv)?;
    Ok(ProcessOutput { input, output })
}

/// `report.xlsx` becomes `report.csv`
pub fn csv_output_name(output_filename: &str) -> String {
    Path::new(output_filename)
        .with_extension("csv")
        .to_string_lossy()
        .into_owned()
}

/// Parse the first sheet of an xls/xlsx/xlsb/ods workbook and render it as CSV
pub fn excel_to_csv(bytes: &[u8], newline: Newline) -> Result<String, FetchError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| FetchError::Excel(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FetchError::Excel("workbook has no sheets".into()))?
        .map_err(|e| FetchError::Excel(e.to_string()))?;
    range_to_csv(&range, newline)
}

/// Dates print as ISO text instead of Excel serial numbers
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(when) if when.time().num_seconds_from_midnight() == 0 => {
                when.format("%Y-%m-%d").to_string()
            }
            Some(when) => when.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        _ => cell.to_string(),
    }
}

/// Render every row of `range`, header first, in sheet order
pub fn range_to_csv(range: &Range<Data>, newline: Newline) -> Result<String, FetchError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(newline.terminator())
        .from_writer(Vec::new());

    for row in range.rows() {
        writer
            .write_record(row.iter().map(render_cell))
            .map_err(|e| FetchError::Excel(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| FetchError::Excel(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

async fn process_entry(
    client: &Client,
    kind: DataKind,
    entry: &ProcessEntry,
    base: &Path,
    newline: Newline,
) -> Result<ProcessOutput, FetchError> {
    let folder = base.join(&entry.folder);
    let (url, input, output) = (&entry.url, &entry.input, &entry.output);
    match kind {
        DataKind::Text => process_text_file(client, url, &folder, input, output).await,
        DataKind::Csv => process_csv_file(client, url, &folder, input, output).await,
        DataKind::Json => process_json_file(client, url, &folder, input, output).await,
        DataKind::Excel => {
            process_excel_file(client, url, &folder, input, output, newline).await
        }
    }
}

/// Process the configured `kinds` in order. Failures are logged per kind.
pub async fn run_process_all(
    client: &Client,
    config: &AppConfig,
    base: &Path,
    kinds: &[DataKind],
) -> RunSummary {
    let mut summary = RunSummary::default();
    let pb = progress_bar(kinds.len());

    for &kind in kinds {
        pb.set_message(format!("processing {}", kind));
        let entry = config.process.get(kind);
        let written = match process_entry(client, kind, entry, base, config.csv_newline).await {
            Ok(out) => {
                info!(
                    "Processed {} data: {} -> {}",
                    kind,
                    out.input.display(),
                    out.output.display()
                );
                Some(vec![out.input, out.output])
            }
            Err(e) => {
                error!("Error processing {} data: {}", kind, e);
                None
            }
        };
        summary.record(kind, written);
        pb.inc(1);
    }

    pb.finish_with_message("processing complete");
    summary
}
