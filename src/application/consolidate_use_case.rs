// ============================================================
// Layer 2 — ConsolidateUseCase
// ============================================================
// Orchestrates the cleaning pipeline in order:
//
//   Step 1: Find the raw CSV files     (Layer 4 - data)
//   Step 2: Load them as tables        (Layer 4 - data)
//   Step 3: Merge, dedupe, drop NA     (Layer 4 - data)
//   Step 4: Write the cleaned CSV      (Layer 4 - data)
//
// Nothing is written when no input file is found.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    consolidator::{consolidate, ConsolidationReport},
    loader::{write_table, CsvLoader},
};
use crate::domain::traits::TableSource;
use crate::error::EstimatorError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidateConfig {
    pub input_dir:   PathBuf,
    pub output_path: PathBuf,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self {
            input_dir:   PathBuf::from("datasets"),
            output_path: PathBuf::from("casas_limpias.csv"),
        }
    }
}

pub struct ConsolidateUseCase {
    config: ConsolidateConfig,
}

impl ConsolidateUseCase {
    pub fn new(config: ConsolidateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ConsolidationReport> {
        let cfg = &self.config;

        // ── Step 1 + 2: Load every input table ───────────────────────────────
        tracing::info!("Loading CSV files from '{}'", cfg.input_dir.display());
        let loader = CsvLoader::new(&cfg.input_dir).excluding(&cfg.output_path);
        let tables = loader.load_all()?;
        if tables.is_empty() {
            return Err(EstimatorError::NoInputFiles {
                dir: cfg.input_dir.display().to_string(),
            }
            .into());
        }
        tracing::info!("Loaded {} files", tables.len());

        // ── Step 3: Merge and clean ──────────────────────────────────────────
        let (clean, report) = consolidate(&tables);
        if report.duplicates_removed > 0 {
            tracing::info!("Removed {} duplicate rows", report.duplicates_removed);
        }
        if report.incomplete_removed > 0 {
            tracing::info!("Removed {} rows with missing values", report.incomplete_removed);
        }

        // ── Step 4: Write the result ─────────────────────────────────────────
        write_table(&clean, &cfg.output_path)?;
        tracing::info!(
            "Wrote {} rows to '{}'",
            report.rows_written,
            cfg.output_path.display()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_no_input_files_writes_nothing() {
        let tmp    = tempdir().unwrap();
        let output = tmp.path().join("clean.csv");
        let cfg    = ConsolidateConfig {
            input_dir:   tmp.path().join("missing"),
            output_path: output.clone(),
        };

        let err = ConsolidateUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EstimatorError>(),
            Some(EstimatorError::NoInputFiles { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("datasets");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.csv"), "price,heating\n100,gas\n100,gas\n150,NA\n").unwrap();
        fs::write(input.join("b.csv"), "price,heating\n200,electric\n").unwrap();

        // Output inside the input directory must not be read back in
        let output = input.join("clean.csv");
        let cfg = ConsolidateConfig { input_dir: input.clone(), output_path: output.clone() };

        let first = ConsolidateUseCase::new(cfg.clone()).execute().unwrap();
        let bytes = fs::read(&output).unwrap();
        let second = ConsolidateUseCase::new(cfg).execute().unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&output).unwrap(), bytes);
        assert_eq!(first.files, 2);
        assert_eq!(first.raw_rows, 4);
        assert_eq!(first.duplicates_removed, 1);
        assert_eq!(first.incomplete_removed, 1);
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "price,heating\n100,gas\n200,electric\n"
        );
    }
}
