//! Once-initialized incident table handle.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use triage_core::{Result, TriageError};

/// File name looked up in the working directory when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "incidents.csv";

/// User-facing notice for a data file that does not exist.
pub fn missing_data_message(path: &Path) -> String {
    format!(
        "'{}' not found. Add it to use the analysis features.",
        path.display()
    )
}

/// An in-memory incident table. Columns are whatever the file's header row holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl IncidentTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Result of a load: either a table or the expected "no file" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dataset {
    Present(IncidentTable),
    Absent,
}

impl Dataset {
    pub fn table(&self) -> Option<&IncidentTable> {
        match self {
            Dataset::Present(table) => Some(table),
            Dataset::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Dataset::Absent)
    }
}

/// Read-only handle to the incident table, loaded on first use.
///
/// Share it behind an `Arc`; later calls return the cached value without touching the file.
#[derive(Debug)]
pub struct DatasetLoader {
    path: PathBuf,
    cell: OnceCell<Dataset>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// A loader preloaded with a dataset, never reading from disk.
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            path: PathBuf::new(),
            cell: OnceCell::with_value(dataset),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Load the table, reading the file only on the first successful call.
    ///
    /// A missing file is `Dataset::Absent`. Read or parse failures are not cached.
    pub fn load(&self) -> Result<&Dataset> {
        self.cell.get_or_try_init(|| read_dataset(&self.path))
    }
}

fn read_dataset(path: &Path) -> Result<Dataset> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Incident data file not found; continuing without data");
            return Ok(Dataset::Absent);
        }
        Err(e) => {
            return Err(TriageError::Dataset(format!(
                "failed to open {}: {}",
                path.display(),
                e
            )))
        }
    };

    // Short rows are padded like blank trailing fields, longer rows are rejected.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| TriageError::Dataset(format!("{}: {}", path.display(), e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        warn!(path = %path.display(), "Incident data file has no header row; treating as absent");
        return Ok(Dataset::Absent);
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record =
            result.map_err(|e| TriageError::Dataset(format!("{}: {}", path.display(), e)))?;
        if record.len() > headers.len() {
            return Err(TriageError::Dataset(format!(
                "{}: line {}: found {} fields, but the header has {}",
                path.display(),
                record.position().map_or(0, |pos| pos.line()),
                record.len(),
                headers.len()
            )));
        }
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    debug!(columns = ?headers, "Parsed incident table header");
    info!(
        path = %path.display(),
        rows = rows.len(),
        columns = headers.len(),
        "Loaded incident data"
    );

    Ok(Dataset::Present(IncidentTable::new(headers, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("incidents.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_is_absent_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DatasetLoader::new(dir.path().join("nope.csv"));
        assert_eq!(loader.load().unwrap(), &Dataset::Absent);
    }

    #[test]
    fn loads_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "id,service,summary\nINC-1,db,\"Primary failover, 12m\"\nINC-2,api,Latency spike\n",
        );
        let loader = DatasetLoader::new(&path);
        let table = loader.load().unwrap().table().unwrap().clone();
        assert_eq!(table.headers(), &["id", "service", "summary"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][2], "Primary failover, 12m");
    }

    #[test]
    fn second_load_uses_cached_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "id,service\n1,db\n");
        let loader = DatasetLoader::new(&path);
        let first = loader.load().unwrap().clone();
        fs::remove_file(&path).unwrap();

        assert!(loader.is_loaded());
        assert_eq!(loader.load().unwrap(), &first);
        assert!(!first.is_absent());
    }

    #[test]
    fn short_row_is_padded_with_blank_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "id,service,resolution\nINC-1,db,failover\nINC-2,api\n");
        let loader = DatasetLoader::new(&path);
        let table = loader.load().unwrap().table().unwrap().clone();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1], vec!["INC-2", "api", ""]);
    }

    #[test]
    fn overlong_row_is_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "id,service\n1,db,extra\n");
        let loader = DatasetLoader::new(&path);
        assert!(matches!(loader.load(), Err(TriageError::Dataset(_))));
        assert!(!loader.is_loaded());
    }

    #[test]
    fn empty_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "");
        let loader = DatasetLoader::new(&path);
        assert!(loader.load().unwrap().is_absent());
    }

    #[test]
    fn preloaded_loader_skips_disk() {
        let table = IncidentTable::new(vec!["a".into()], vec![vec!["1".into()]]);
        let loader = DatasetLoader::with_dataset(Dataset::Present(table.clone()));
        assert!(loader.is_loaded());
        assert_eq!(loader.load().unwrap().table(), Some(&table));
    }
}
