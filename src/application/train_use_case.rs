// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the cleaned CSV           (Layer 4 - data)
//   Step 2: Infer the schema               (Layer 4 - data)
//   Step 3: Fit the encoding scheme        (Layer 4 - data)
//   Step 4: Encode + reconcile every row   (Layer 4 - data)
//   Step 5: Fit and apply the scaler       (Layer 4 - data)
//   Step 6: Split train/validation/test    (Layer 4 - data)
//   Step 7: Save preprocessing artifacts   (Layer 6 - infra)
//   Step 8: Run training loop              (Layer 5 - ml)
//
// Step 4 goes through the same encode → reconcile path that a
// form submission uses, so training and inference cannot
// disagree on column order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    dataset::HousingSample,
    encoder::EncodingScheme,
    loader::read_table,
    preprocessor::Preprocessor,
    scaler::StandardScaler,
    schema::Schema,
    splitter::{split_train_test, split_validation_tail},
};
use crate::error::EstimatorError;
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::{
    model::PriceRegressorConfig,
    trainer::{run_training, TrainingSplits},
};

/// Name of the column the network learns to predict.
pub const TARGET_COLUMN: &str = "price";

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved next to the weights so a run can be inspected or repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset_path:        PathBuf,
    pub artifact_dir:        PathBuf,
    pub epochs:              usize,
    pub batch_size:          usize,
    pub lr:                  f64,
    pub test_fraction:       f64,
    pub validation_fraction: f64,
    pub seed:                u64,
    pub hidden1:             usize,
    pub hidden2:             usize,
    pub hidden3:             usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset_path:        PathBuf::from("casas_limpias.csv"),
            artifact_dir:        PathBuf::from("artifacts"),
            epochs:              100,
            batch_size:          32,
            lr:                  1e-3,
            test_fraction:       0.2,
            validation_fraction: 0.2,
            seed:                42,
            hidden1:             64,
            hidden2:             32,
            hidden3:             16,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self, input_dim: usize) -> PriceRegressorConfig {
        PriceRegressorConfig::new(input_dim)
            .with_hidden1(self.hidden1)
            .with_hidden2(self.hidden2)
            .with_hidden3(self.hidden3)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainReport {
    pub feature_count: usize,
    pub rows_skipped:  usize,
    pub n_train:       usize,
    pub n_validation:  usize,
    pub n_test:        usize,
    pub best_epoch:    Option<usize>,
    pub test_mae:      f64,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load the cleaned dataset ──────────────────────────────────
        tracing::info!("Loading dataset '{}'", cfg.dataset_path.display());
        let table = read_table(&cfg.dataset_path)?;
        if table.is_empty() {
            return Err(EstimatorError::EmptyDataset {
                path: cfg.dataset_path.display().to_string(),
            }
            .into());
        }

        // ── Step 2: Schema — fails fast without a price column ────────────────
        let schema = Schema::infer(&table, TARGET_COLUMN)?;
        tracing::info!(
            "Schema: {} numeric, {} categorical columns",
            schema.numeric().count(),
            schema.categorical().count()
        );

        let rows_skipped = table.incomplete_count();
        if rows_skipped > 0 {
            tracing::warn!("Skipping {} rows with missing values", rows_skipped);
        }

        // ── Step 3: Vocabularies and feature order ────────────────────────────
        let scheme        = EncodingScheme::fit(&table, &schema);
        let feature_names = scheme.feature_names();
        tracing::info!("{} features after one-hot encoding", feature_names.len());

        // ── Step 4: Encode + reconcile every complete row ─────────────────────
        let mut features = Vec::with_capacity(table.len());
        let mut prices   = Vec::with_capacity(table.len());
        for row in table.complete_rows() {
            let (request, price) = scheme.request_from_row(&table.headers, &row)?;
            features.push(scheme.encode(&request)?.reconcile(&feature_names));
            prices.push(price);
        }
        if features.is_empty() {
            return Err(EstimatorError::EmptyDataset {
                path: cfg.dataset_path.display().to_string(),
            }
            .into());
        }

        // ── Step 5: Scale — fitted on every row before splitting ──────────────
        let scaler       = StandardScaler::fit(feature_names, &features)?;
        let preprocessor = Preprocessor::new(scheme, scaler)?;
        let samples: Vec<HousingSample> = features
            .iter()
            .zip(&prices)
            .map(|(row, &price)| Ok(HousingSample::new(&preprocessor.scale(row)?, price)))
            .collect::<Result<_, EstimatorError>>()?;

        // ── Step 6: Splits ────────────────────────────────────────────────────
        let (train, test)       = split_train_test(samples, cfg.test_fraction, cfg.seed);
        let (train, validation) = split_validation_tail(train, cfg.validation_fraction);
        if train.is_empty() {
            return Err(EstimatorError::EmptyDataset {
                path: cfg.dataset_path.display().to_string(),
            }
            .into());
        }
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            train.len(),
            validation.len(),
            test.len()
        );
        let (n_train, n_validation, n_test) = (train.len(), validation.len(), test.len());

        // ── Step 7: Persist everything inference needs besides weights ───────
        let store     = ArtifactStore::new(&cfg.artifact_dir);
        let model_cfg = cfg.model_config(preprocessor.feature_names().len());
        store.ensure_dir()?;
        store.save_train_config(cfg)?;
        store.save_model_config(&model_cfg)?;
        store.save_scaler(preprocessor.scaler())?;
        store.save_encoding(preprocessor.scheme())?;

        // ── Step 8: Train ─────────────────────────────────────────────────────
        let outcome = run_training(
            cfg,
            &model_cfg,
            TrainingSplits { train, validation, test },
            &store,
        )
        .context("Training failed")?;

        tracing::info!("Test mean absolute error: {:.2}", outcome.test_mae);

        Ok(TrainReport {
            feature_count: model_cfg.input_dim,
            rows_skipped,
            n_train,
            n_validation,
            n_test,
            best_epoch: outcome.best_epoch,
            test_mae:   outcome.test_mae,
        })
    }
}
