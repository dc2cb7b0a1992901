use crate::kinds::{DataKind, FetchTarget, WriteTarget};
use crate::process::Newline;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display name printed at the start of a run
    pub byline: String,
    pub csv_newline: Newline,
    pub fetch: KindTable<FetchEntry>,
    pub process: KindTable<ProcessEntry>,
    pub folders: FolderConfig,
}

/// Entries that have a built-in default for each kind
pub trait ForKind: Sized {
    /// Same entry with every field optional, as read from the config file
    type Partial: DeserializeOwned;

    fn for_kind(kind: DataKind) -> Self;

    /// Fill the fields missing from `partial` with the defaults for `kind`
    fn merge(kind: DataKind, partial: Option<Self::Partial>) -> Self;
}

/// One entry per data kind. Kinds and keys missing from the file keep their defaults.
#[derive(Debug, Clone)]
pub struct KindTable<T> {
    pub text: T,
    pub csv: T,
    pub excel: T,
    pub json: T,
}

#[derive(Deserialize)]
struct PartialKindTable<P> {
    text: Option<P>,
    csv: Option<P>,
    excel: Option<P>,
    json: Option<P>,
}

impl<'de, T: ForKind> Deserialize<'de> for KindTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = PartialKindTable::<T::Partial>::deserialize(deserializer)?;
        Ok(Self {
            text: T::merge(DataKind::Text, raw.text),
            csv: T::merge(DataKind::Csv, raw.csv),
            excel: T::merge(DataKind::Excel, raw.excel),
            json: T::merge(DataKind::Json, raw.json),
        })
    }
}

impl<T: ForKind> Default for KindTable<T> {
    fn default() -> Self {
        Self {
            text: T::for_kind(DataKind::Text),
            csv: T::for_kind(DataKind::Csv),
            excel: T::for_kind(DataKind::Excel),
            json: T::for_kind(DataKind::Json),
        }
    }
}

impl<T> KindTable<T> {
    pub fn get(&self, kind: DataKind) -> &T {
        match kind {
            DataKind::Text => &self.text,
            DataKind::Csv => &self.csv,
            DataKind::Excel => &self.excel,
            DataKind::Json => &self.json,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchEntry {
    pub url: String,
    pub folder: String,
    pub filename: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialFetchEntry {
    url: Option<String>,
    folder: Option<String>,
    filename: Option<String>,
}

impl FetchEntry {
    pub fn target(&self, kind: DataKind) -> FetchTarget {
        FetchTarget::new(&self.url, kind)
    }

    pub fn write_target(&self) -> WriteTarget {
        WriteTarget::new(&self.folder, &self.filename)
    }
}

/// Source and destinations of the process step.
///
/// The built-in `url` for each kind is the same one the fetch step uses; point it
/// elsewhere in the config to process a different payload.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    pub url: String,
    pub folder: String,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialProcessEntry {
    url: Option<String>,
    folder: Option<String>,
    input: Option<String>,
    output: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub names: Vec<String>,
    pub prefixed_names: Vec<String>,
    pub prefix: String,
    pub regions: Vec<String>,
    pub delay_secs: u64,
}

impl FolderConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

const TEXT_URL: &str =
    "https://storage.googleapis.com/kagglesdsdata/datasets/463494/941394/Shakespeare_01.txt";
const EXCEL_URL: &str = "https://github.com/mikeygman11/Baseball-Statistics/raw/master/2019mlb.xlsx";
const CSV_URL: &str = "https://query.data.world/s/352fjx2iiw5427wzmelxeky6fql6uh?dws=00000";
const JSON_URL: &str =
    "https://storage.googleapis.com/kagglesdsdata/datasets/496274/945103/StadiumsFull.json";

fn default_url(kind: DataKind) -> &'static str {
    match kind {
        DataKind::Text => TEXT_URL,
        DataKind::Csv => CSV_URL,
        DataKind::Excel => EXCEL_URL,
        DataKind::Json => JSON_URL,
    }
}

impl ForKind for FetchEntry {
    type Partial = PartialFetchEntry;

    fn for_kind(kind: DataKind) -> Self {
        Self {
            url: default_url(kind).to_owned(),
            folder: kind.default_folder().to_owned(),
            filename: kind.default_filename().to_owned(),
        }
    }

    fn merge(kind: DataKind, partial: Option<PartialFetchEntry>) -> Self {
        let defaults = Self::for_kind(kind);
        let partial = partial.unwrap_or_default();
        Self {
            url: partial.url.unwrap_or(defaults.url),
            folder: partial.folder.unwrap_or(defaults.folder),
            filename: partial.filename.unwrap_or(defaults.filename),
        }
    }
}

impl ForKind for ProcessEntry {
    type Partial = PartialProcessEntry;

    fn for_kind(kind: DataKind) -> Self {
        let (input, output) = match kind {
            DataKind::Text => ("input.txt", "output.txt"),
            DataKind::Csv => ("input.csv", "output.csv"),
            DataKind::Excel => ("input.xlsx", "output.xlsx"),
            DataKind::Json => ("input.json", "output.json"),
        };
        Self {
            url: default_url(kind).to_owned(),
            folder: kind.default_folder().to_owned(),
            input: input.to_owned(),
            output: output.to_owned(),
        }
    }

    fn merge(kind: DataKind, partial: Option<PartialProcessEntry>) -> Self {
        let defaults = Self::for_kind(kind);
        let partial = partial.unwrap_or_default();
        Self {
            url: partial.url.unwrap_or(defaults.url),
            folder: partial.folder.unwrap_or(defaults.folder),
            input: partial.input.unwrap_or(defaults.input),
            output: partial.output.unwrap_or(defaults.output),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            start_year: 2020,
            end_year: 2023,
            names: strings(&["data-csv", "data-excel", "data-json"]),
            prefixed_names: strings(&["old", "current", "new"]),
            prefix: "data-".into(),
            regions: strings(&[
                "North America",
                "South America",
                "Europe",
                "Asia",
                "Africa",
                "Oceania",
                "Middle East",
            ]),
            delay_secs: 5,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            byline: "Data Fetch".into(),
            csv_newline: Newline::default(),
            fetch: KindTable::default(),
            process: KindTable::default(),
            folders: FolderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load config from `path`, falling back to defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_toml(path, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_run() {
        let config = AppConfig::default();
        assert_eq!(config.fetch.text.folder, "data-txt");
        assert_eq!(config.fetch.excel.filename, "data.xls");
        assert_eq!(config.folders.start_year, 2020);
        assert_eq!(config.folders.end_year, 2023);
        assert_eq!(config.folders.prefix, "data-");
        assert_eq!(config.folders.regions.len(), 7);
        assert_eq!(config.folders.delay(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            Path::new("test.toml"),
            r#"
byline = "Test Byline"
csv_newline = "crlf"

[folders]
delay_secs = 0
prefix = "archive-"
"#,
        )
        .unwrap();

        assert_eq!(config.byline, "Test Byline");
        assert_eq!(config.csv_newline, Newline::CrLf);
        assert_eq!(config.folders.delay_secs, 0);
        assert_eq!(config.folders.prefix, "archive-");
        assert_eq!(config.folders.start_year, 2020);
        assert_eq!(config.fetch.csv.folder, "data-csv");
    }

    #[test]
    fn fetch_table_overrides_one_kind() {
        let config = AppConfig::from_toml(
            Path::new("test.toml"),
            r#"
[fetch.text]
url = "http://localhost/a.txt"
folder = "texts"
filename = "a.txt"
"#,
        )
        .unwrap();

        let entry = config.fetch.get(DataKind::Text);
        assert_eq!(entry.target(DataKind::Text).url, "http://localhost/a.txt");
        assert_eq!(entry.write_target().path(), PathBuf::from("texts/a.txt"));
        assert_eq!(config.fetch.csv.filename, "data.csv");
        assert_eq!(config.process.excel.output, "output.xlsx");
    }

    #[test]
    fn single_key_override_keeps_entry_defaults() {
        let config = AppConfig::from_toml(
            Path::new("test.toml"),
            r#"
[fetch.text]
url = "http://localhost/a.txt"

[process.excel]
output = "stats.xlsx"
"#,
        )
        .unwrap();

        assert_eq!(config.fetch.text.url, "http://localhost/a.txt");
        assert_eq!(config.fetch.text.folder, "data-txt");
        assert_eq!(config.fetch.text.filename, "data.txt");
        assert_eq!(config.process.excel.output, "stats.xlsx");
        assert_eq!(config.process.excel.input, "input.xlsx");
        assert_eq!(config.process.excel.url, EXCEL_URL);
    }

    #[test]
    fn process_urls_default_to_fetch_urls() {
        let config = AppConfig::default();
        for kind in DataKind::RUN_ORDER {
            assert_eq!(config.process.get(kind).url, config.fetch.get(kind).url);
        }
    }

    #[test]
    fn wrong_value_type_is_an_error() {
        let err = AppConfig::from_toml(Path::new("bad.toml"), "[fetch.text]\nurl = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = AppConfig::from_toml(Path::new("bad.toml"), "byline = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn no_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.byline, AppConfig::default().byline);
    }
}
