use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataKind {
    /// Plain text
    Text,
    /// Comma separated values
    Csv,
    /// Excel workbook (binary)
    Excel,
    /// JSON document
    Json,
}

impl DataKind {
    /// Fixed order in which a full run visits the kinds
    pub const RUN_ORDER: [DataKind; 4] = [
        DataKind::Text,
        DataKind::Excel,
        DataKind::Csv,
        DataKind::Json,
    ];

    /// Requested kinds in run order; an empty request selects every kind
    pub fn select(requested: &[DataKind]) -> Vec<DataKind> {
        Self::RUN_ORDER
            .into_iter()
            .filter(|kind| requested.is_empty() || requested.contains(kind))
            .collect()
    }

    pub fn default_folder(&self) -> &'static str {
        match self {
            DataKind::Text => "data-txt",
            DataKind::Csv => "data-csv",
            DataKind::Excel => "data-excel",
            DataKind::Json => "data-json",
        }
    }

    pub fn default_filename(&self) -> &'static str {
        match self {
            DataKind::Text => "data.txt",
            DataKind::Csv => "data.csv",
            DataKind::Excel => "data.xls",
            DataKind::Json => "data.json",
        }
    }

    /// Label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            DataKind::Text => "Text",
            DataKind::Csv => "CSV",
            DataKind::Excel => "Excel",
            DataKind::Json => "JSON",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A URL together with the kind of payload expected behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub url: String,
    pub kind: DataKind,
}

impl FetchTarget {
    pub fn new(url: impl Into<String>, kind: DataKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Destination of a persisted payload. Later writes to the same path overwrite earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    pub folder: PathBuf,
    pub filename: String,
}

impl WriteTarget {
    pub fn new(folder: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            filename: filename.into(),
        }
    }

    /// Resolve the folder under `base`, leaving absolute folders as they are
    pub fn under(&self, base: &Path) -> Self {
        Self {
            folder: base.join(&self.folder),
            filename: self.filename.clone(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_order_matches_fixed_sequence() {
        assert_eq!(
            DataKind::RUN_ORDER,
            [
                DataKind::Text,
                DataKind::Excel,
                DataKind::Csv,
                DataKind::Json
            ]
        );
    }

    #[test]
    fn select_keeps_run_order() {
        assert_eq!(DataKind::select(&[]), DataKind::RUN_ORDER.to_vec());
        assert_eq!(
            DataKind::select(&[DataKind::Json, DataKind::Text]),
            vec![DataKind::Text, DataKind::Json]
        );
    }

    #[test]
    fn write_target_joins_folder_and_filename() {
        let target = WriteTarget::new("data-csv", "data.csv").under(Path::new("/tmp/run"));
        assert_eq!(target.path(), PathBuf::from("/tmp/run/data-csv/data.csv"));
    }
}
