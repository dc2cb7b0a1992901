use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create `folder` and any missing parents. Existing folders are left untouched.
pub fn ensure_folder(folder: &Path) -> io::Result<()> {
    if !folder.exists() {
        fs::create_dir_all(folder)?;
        debug!("Created directory: {}", folder.display());
    }
    Ok(())
}

fn write_file(folder: &Path, filename: &str, data: &[u8], label: &str) -> io::Result<PathBuf> {
    ensure_folder(folder)?;
    let file_path = folder.join(filename);
    fs::write(&file_path, data)?;
    info!("{} data saved to {}", label, file_path.display());
    Ok(file_path)
}

pub fn write_text_file(folder: &Path, filename: &str, data: &str) -> io::Result<PathBuf> {
    write_file(folder, filename, data.as_bytes(), "Text")
}

pub fn write_csv_file(folder: &Path, filename: &str, data: &str) -> io::Result<PathBuf> {
    write_file(folder, filename, data.as_bytes(), "CSV")
}

pub fn write_excel_file(folder: &Path, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
    write_file(folder, filename, data, "Excel")
}

/// Serialize `data` with four-space indentation
pub fn write_json_file(
    folder: &Path,
    filename: &str,
    data: &serde_json::Value,
) -> io::Result<PathBuf> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut serializer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    write_file(folder, filename, &buf, "JSON")
}

/// Write already-serialized JSON verbatim
pub fn write_json_bytes(folder: &Path, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
    write_file(folder, filename, data, "JSON")
}
