// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads listing CSVs into Tables and writes Tables back out.
//
// Missing values:
//   A cell is missing when it is empty or one of the usual NA
//   spellings ("NA", "N/A", "NaN", "null", ...). Missing cells
//   become `None` so later stages never mistake them for a
//   category called "NA".
//
// Ragged rows:
//   Short rows are padded with missing cells (and will be
//   dropped by consolidation). Rows with MORE fields than the
//   header are an error — there is no column to put them in.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::table::Table;
use crate::domain::traits::TableSource;

/// Cell values treated as "missing".
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(raw: &str) -> bool {
    raw.is_empty() || NA_TOKENS.contains(&raw)
}

/// Loads every `*.csv` file in a directory.
/// Implements the TableSource trait from Layer 3.
pub struct CsvLoader {
    dir:     PathBuf,
    /// A file to skip even if it lives in `dir` (the output file)
    exclude: Option<PathBuf>,
}

impl CsvLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), exclude: None }
    }

    /// Skip `path` when scanning the directory.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude = Some(path.into());
        self
    }

    /// All CSV files in the directory, sorted by path.
    /// A missing directory yields an empty list.
    pub fn csv_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            tracing::warn!("Input directory '{}' does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir.display()))?
        {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if !is_csv || !path.is_file() {
                continue;
            }
            if let Some(excluded) = &self.exclude {
                if same_file(&path, excluded) {
                    tracing::debug!("Skipping output file '{}'", path.display());
                    continue;
                }
            }
            files.push(path);
        }

        files.sort();
        Ok(files)
    }
}

impl TableSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for path in self.csv_files()? {
            let table = read_table(&path)?;
            tracing::debug!(
                "Loaded '{}': {} rows, {} columns",
                path.display(),
                table.len(),
                table.headers.len()
            );
            tables.push(table);
        }
        Ok(tables)
    }
}

/// Read one CSV file with a header row.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Cannot read header of '{}'", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    let mut table = Table::new(source, headers);

    for result in reader.records() {
        let record = result.with_context(|| format!("Malformed CSV in '{}'", path.display()))?;
        if record.len() > table.headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            bail!(
                "'{}' line {}: {} fields but only {} columns",
                path.display(),
                line,
                record.len(),
                table.headers.len()
            );
        }
        let row = record
            .iter()
            .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Write a table as CSV (missing cells become empty fields).
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}
